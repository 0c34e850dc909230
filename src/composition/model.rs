use std::collections::BTreeSet;

use crate::{
    assets::store::AssetRef,
    audio::track::{ActiveAudio, AudioTrack, active_audio_at},
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange},
    foundation::error::{FramewiseError, FramewiseResult},
    scene::model::RenderUnit,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A named, fixed-duration root animation.
///
/// A composition is a pure data model that can be:
/// - built programmatically (see [`crate::CompositionBuilder`])
/// - serialized/deserialized via Serde (JSON)
///
/// Once handed to a [`crate::Registry`] it is only ever read.
pub struct Composition {
    /// Unique identifier within a registry.
    pub id: String,
    /// Root of the scene graph.
    pub root: RenderUnit,
    /// Total frame count; frames `[0, duration_in_frames)` are renderable.
    pub duration_in_frames: u64,
    /// Timeline frame rate.
    pub fps: Fps,
    /// Output dimensions.
    pub canvas: Canvas,
    /// Audio layers in declaration order.
    #[serde(default)]
    pub audio: Vec<AudioTrack>,
}

impl Composition {
    /// Validate ids, timing, dimensions and the whole scene graph.
    pub fn validate(&self) -> FramewiseResult<()> {
        if self.id.trim().is_empty() {
            return Err(FramewiseError::configuration(
                "composition id must be non-empty",
            ));
        }
        if self.duration_in_frames == 0 {
            return Err(FramewiseError::configuration(format!(
                "composition '{}' duration_in_frames must be > 0",
                self.id
            )));
        }
        self.fps.validate()?;
        self.canvas.validate()?;
        self.root.validate()
    }

    /// The renderable frame window.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.duration_in_frames),
        }
    }

    /// Reject frames at or past the end of the composition.
    pub fn check_frame(&self, frame: FrameIndex) -> FramewiseResult<()> {
        if frame.0 >= self.duration_in_frames {
            return Err(FramewiseError::lookup(format!(
                "frame {} is outside composition '{}' (duration {} frames)",
                frame.0, self.id, self.duration_in_frames
            )));
        }
        Ok(())
    }

    /// Audio layers audible at `frame`, in declaration order.
    #[tracing::instrument(skip(self), fields(comp = %self.id))]
    pub fn active_audio_at(&self, frame: FrameIndex) -> FramewiseResult<Vec<ActiveAudio>> {
        self.check_frame(frame)?;
        Ok(active_audio_at(&self.audio, frame))
    }

    /// Every asset referenced by the scene graph or the audio layers.
    pub fn asset_refs(&self) -> BTreeSet<AssetRef> {
        let mut out = BTreeSet::new();
        self.root.collect_asset_refs(&mut out);
        out.extend(self.audio.iter().map(|t| t.src().clone()));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
