use std::sync::Arc;

use crate::{
    assets::store::{AssetCache, AssetLocator},
    composition::model::Composition,
    foundation::core::{Fps, FrameRange},
    foundation::error::{FramewiseError, FramewiseResult},
};

/// Sample rate of the mixed output.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

#[derive(Clone, Debug)]
/// One audio track clipped to a render range, with its decoded source attached.
pub struct AudioSegment {
    /// First output sample (relative to the range start).
    pub timeline_start_sample: u64,
    /// One past the last output sample.
    pub timeline_end_sample: u64,
    /// Position inside the source where playback begins.
    pub source_start_sec: f64,
    /// Gain.
    pub volume: f32,
    /// Source sample rate in Hz.
    pub source_sample_rate: u32,
    /// Source channel count.
    pub source_channels: u16,
    /// Source PCM.
    pub source_interleaved_f32: Arc<Vec<f32>>,
}

#[derive(Clone, Debug)]
/// Everything needed to mix the audio of a frame range.
pub struct AudioManifest {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count (always stereo).
    pub channels: u16,
    /// Output length in sample frames.
    pub total_samples: u64,
    /// Segments in track declaration order.
    pub segments: Vec<AudioSegment>,
}

/// Collect the audio segments audible during `range`.
///
/// Tracks with zero volume are skipped without touching the locator.
#[tracing::instrument(skip(comp, assets), fields(comp = %comp.id))]
pub fn build_audio_manifest<L: AssetLocator>(
    comp: &Composition,
    range: FrameRange,
    assets: &AssetCache<L>,
) -> FramewiseResult<AudioManifest> {
    if range.is_empty() {
        return Err(FramewiseError::configuration(
            "audio manifest range must be non-empty",
        ));
    }
    if range.end.0 > comp.duration_in_frames {
        return Err(FramewiseError::lookup(format!(
            "audio range end {} exceeds composition '{}' duration {}",
            range.end.0, comp.id, comp.duration_in_frames
        )));
    }

    let sample_rate = MIX_SAMPLE_RATE;
    let mut segments = Vec::<AudioSegment>::new();
    for track in &comp.audio {
        let Some(intersection) = track.window().intersect(range) else {
            continue;
        };
        if track.volume() <= 0.0 {
            continue;
        }
        let pcm = assets.audio(track.src())?;
        let source_frame =
            track.trim_start_frames() + (intersection.start.0 - track.window().start.0);
        segments.push(AudioSegment {
            timeline_start_sample: frame_to_sample(
                intersection.start.0 - range.start.0,
                comp.fps,
                sample_rate,
            ),
            timeline_end_sample: frame_to_sample(
                intersection.end.0 - range.start.0,
                comp.fps,
                sample_rate,
            ),
            source_start_sec: comp.fps.frames_to_secs(source_frame as f64),
            volume: track.volume() as f32,
            source_sample_rate: pcm.sample_rate,
            source_channels: pcm.channels,
            source_interleaved_f32: pcm.interleaved_f32,
        });
    }
    tracing::debug!(segments = segments.len(), "audio manifest built");

    Ok(AudioManifest {
        sample_rate,
        channels: 2,
        total_samples: frame_to_sample(range.len_frames(), comp.fps, sample_rate),
        segments,
    })
}

/// Mix every segment into interleaved stereo; overlapping segments add, output is limited to
/// `[-1, 1]`.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        if seg.source_channels == 0 || seg.source_sample_rate == 0 {
            continue;
        }
        let src = seg.source_interleaved_f32.as_ref();
        let src_frames = src.len() / usize::from(seg.source_channels);
        if src_frames == 0 {
            continue;
        }

        let end = seg.timeline_end_sample.min(manifest.total_samples);
        for dst_sample in seg.timeline_start_sample..end {
            let rel_sample = dst_sample - seg.timeline_start_sample;
            let rel_sec = (rel_sample as f64) / f64::from(manifest.sample_rate);
            let src_pos = (seg.source_start_sec + rel_sec) * f64::from(seg.source_sample_rate);
            if !src_pos.is_finite() || src_pos < 0.0 {
                break;
            }
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
            let frac = (src_pos - src_frame0 as f64) as f32;

            let dst_idx = dst_sample as usize * usize::from(manifest.channels);
            let (l, r) = if seg.source_channels == 1 {
                let v0 = src[src_frame0];
                let v1 = src[src_frame1];
                let v = v0 + ((v1 - v0) * frac);
                (v, v)
            } else {
                let i0 = src_frame0 * usize::from(seg.source_channels);
                let i1 = src_frame1 * usize::from(seg.source_channels);
                (
                    src[i0] + ((src[i1] - src[i0]) * frac),
                    src[i0 + 1] + ((src[i1 + 1] - src[i0 + 1]) * frac),
                )
            };

            out[dst_idx] += l * seg.volume;
            if manifest.channels > 1 {
                out[dst_idx + 1] += r * seg.volume;
            }
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Convert a frame count to a sample count at `sample_rate`, rounding to nearest.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
