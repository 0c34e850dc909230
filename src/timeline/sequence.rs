use crate::{
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{FramewiseError, FramewiseResult},
};

/// Active window `[offset, offset + duration)` on the parent's frame axis.
///
/// A frame outside the window resolves to `None`: whatever the sequence wraps is absent from that
/// frame entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SequenceDef", into = "SequenceDef")]
pub struct Sequence {
    offset: u64,
    duration: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct SequenceDef {
    #[serde(default)]
    offset_frames: u64,
    duration_frames: u64,
}

impl TryFrom<SequenceDef> for Sequence {
    type Error = FramewiseError;

    fn try_from(def: SequenceDef) -> FramewiseResult<Self> {
        Self::new(def.offset_frames, def.duration_frames)
    }
}

impl From<Sequence> for SequenceDef {
    fn from(s: Sequence) -> Self {
        Self {
            offset_frames: s.offset,
            duration_frames: s.duration,
        }
    }
}

impl Sequence {
    /// Build a window; `duration` must be positive.
    pub fn new(offset: u64, duration: u64) -> FramewiseResult<Self> {
        if duration == 0 {
            return Err(FramewiseError::configuration(
                "sequence duration must be > 0",
            ));
        }
        if offset.checked_add(duration).is_none() {
            return Err(FramewiseError::configuration(
                "sequence offset + duration overflows",
            ));
        }
        Ok(Self { offset, duration })
    }

    /// Offset on the parent axis.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Window length.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// The window as a range on the parent axis.
    pub fn window(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(self.offset),
            end: FrameIndex(self.offset + self.duration),
        }
    }

    /// Local frame for `parent`, or `None` when `parent` is outside the window.
    pub fn local_frame(&self, parent: FrameIndex) -> Option<FrameIndex> {
        let local = parent.0.checked_sub(self.offset)?;
        (local < self.duration).then_some(FrameIndex(local))
    }
}

/// Resolve `global` through a chain of nested sequences, outermost first.
///
/// Each level subtracts its own offset from the previous level's local frame; the first level whose
/// window misses short-circuits to `None`.
pub fn resolve_nested(global: FrameIndex, chain: &[Sequence]) -> Option<FrameIndex> {
    chain
        .iter()
        .try_fold(global, |parent, seq| seq.local_frame(parent))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequence.rs"]
mod tests;
