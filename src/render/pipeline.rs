use rayon::prelude::*;

use crate::{
    composition::model::Composition,
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{FramewiseError, FramewiseResult},
    scene::eval::{Evaluator, FrameOutput},
};

/// Evaluate a single frame of `comp`.
pub fn render_frame(comp: &Composition, frame: FrameIndex) -> FramewiseResult<FrameOutput> {
    Evaluator::eval_frame(comp, frame)
}

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Enable parallel rendering when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Render a range of frames (inclusive start, exclusive end).
///
/// Output is in frame order regardless of threading; frames are independent so the parallel path
/// produces exactly the sequential result.
#[tracing::instrument(skip(comp, threading), fields(comp = %comp.id))]
pub fn render_frames(
    comp: &Composition,
    range: FrameRange,
    threading: &RenderThreading,
) -> FramewiseResult<Vec<FrameOutput>> {
    if range.is_empty() {
        return Err(FramewiseError::configuration(
            "render range must be non-empty",
        ));
    }
    if range.end.0 > comp.duration_in_frames {
        return Err(FramewiseError::lookup(format!(
            "render range end {} exceeds composition '{}' duration {}",
            range.end.0, comp.id, comp.duration_in_frames
        )));
    }
    check_threads(threading.threads)?;

    if !threading.parallel {
        return Ok((range.start.0..range.end.0)
            .map(|f| Evaluator::eval_frame_unchecked(comp, FrameIndex(f)))
            .collect());
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);

    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        let indices: Vec<u64> = (chunk_start..chunk_end).collect();
        let mut frames: Vec<FrameOutput> = pool.install(|| {
            indices
                .par_iter()
                .map(|&f| Evaluator::eval_frame_unchecked(comp, FrameIndex(f)))
                .collect()
        });
        tracing::debug!(start = chunk_start, end = chunk_end, "rendered chunk");
        out.append(&mut frames);
        chunk_start = chunk_end;
    }

    Ok(out)
}

fn check_threads(threads: Option<usize>) -> FramewiseResult<()> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FramewiseError::configuration(
            "render threading 'threads' must be >= 1 when set",
        ));
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> FramewiseResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| {
            FramewiseError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
        })
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
