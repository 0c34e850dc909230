use crate::{
    assets::store::AssetRef,
    foundation::core::{Fps, FrameIndex, FrameRange},
    foundation::error::{FramewiseError, FramewiseResult},
    timeline::sequence::Sequence,
};

/// A time-boxed audio layer on the composition timeline.
///
/// While `start_frame <= g < start_frame + duration_frames` the source plays from
/// `trim_start_frames + (g - start_frame)` (in frame-equivalent units) at `volume`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "AudioTrackDef", into = "AudioTrackDef")]
pub struct AudioTrack {
    src: AssetRef,
    window: Sequence,
    trim_start_frames: u64,
    volume: f64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct AudioTrackDef {
    src: AssetRef,
    #[serde(default)]
    start_frame: u64,
    duration_frames: u64,
    #[serde(default)]
    trim_start_frames: u64,
    #[serde(default = "default_volume")]
    volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl TryFrom<AudioTrackDef> for AudioTrack {
    type Error = FramewiseError;

    fn try_from(def: AudioTrackDef) -> FramewiseResult<Self> {
        Self::new(def.src, def.start_frame, def.duration_frames)?
            .with_trim_start(def.trim_start_frames)?
            .with_volume(def.volume)
    }
}

impl From<AudioTrack> for AudioTrackDef {
    fn from(t: AudioTrack) -> Self {
        Self {
            src: t.src,
            start_frame: t.window.offset(),
            duration_frames: t.window.duration(),
            trim_start_frames: t.trim_start_frames,
            volume: t.volume,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An audio layer resolved for one frame.
pub struct ActiveAudio {
    /// Source asset.
    pub src: AssetRef,
    /// Playback position inside the source, in frames.
    pub sample_offset: FrameIndex,
    /// Gain in `[0, 1]`.
    pub volume: f64,
}

impl ActiveAudio {
    /// Playback position converted to a PCM sample index at `sample_rate`.
    pub fn sample_index(&self, fps: Fps, sample_rate: u32) -> u64 {
        crate::audio::mix::frame_to_sample(self.sample_offset.0, fps, sample_rate)
    }
}

impl AudioTrack {
    /// Full-volume, untrimmed track occupying `[start_frame, start_frame + duration_frames)`.
    pub fn new(src: AssetRef, start_frame: u64, duration_frames: u64) -> FramewiseResult<Self> {
        if duration_frames == 0 {
            return Err(FramewiseError::configuration(format!(
                "audio track '{src}' duration_frames must be > 0"
            )));
        }
        let window = Sequence::new(start_frame, duration_frames)?;
        Ok(Self {
            src,
            window,
            trim_start_frames: 0,
            volume: 1.0,
        })
    }

    /// Skip `frames` of the source before playback starts.
    ///
    /// The last source frame played, `frames + duration - 1`, must fit in `u64`.
    pub fn with_trim_start(mut self, frames: u64) -> FramewiseResult<Self> {
        if frames.checked_add(self.window.duration()).is_none() {
            return Err(FramewiseError::configuration(format!(
                "audio track '{}' trim_start_frames {frames} overflows the source position",
                self.src
            )));
        }
        self.trim_start_frames = frames;
        Ok(self)
    }

    /// Set the gain; must be in `[0, 1]`.
    pub fn with_volume(mut self, volume: f64) -> FramewiseResult<Self> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(FramewiseError::configuration(format!(
                "audio track '{}' volume must be in [0, 1] (got {volume})",
                self.src
            )));
        }
        self.volume = volume;
        Ok(self)
    }

    /// Source asset.
    pub fn src(&self) -> &AssetRef {
        &self.src
    }

    /// Frames skipped at the start of the source.
    pub fn trim_start_frames(&self) -> u64 {
        self.trim_start_frames
    }

    /// Gain.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Active window on the composition timeline.
    pub fn window(&self) -> FrameRange {
        self.window.window()
    }

    /// Resolve this track at `frame`; `None` outside the active window.
    pub fn resolve(&self, frame: FrameIndex) -> Option<ActiveAudio> {
        let local = self.window.local_frame(frame)?;
        Some(ActiveAudio {
            src: self.src.clone(),
            sample_offset: FrameIndex(self.trim_start_frames + local.0),
            volume: self.volume,
        })
    }
}

/// Tracks audible at `frame`, in declaration order.
pub fn active_audio_at(tracks: &[AudioTrack], frame: FrameIndex) -> Vec<ActiveAudio> {
    tracks.iter().filter_map(|t| t.resolve(frame)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
