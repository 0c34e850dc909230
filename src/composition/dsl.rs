use crate::{
    audio::track::AudioTrack,
    composition::model::Composition,
    foundation::core::{Canvas, Fps},
    foundation::error::{FramewiseError, FramewiseResult},
    scene::model::{Composite, RenderUnit},
};

/// Builder for [`Composition`](crate::Composition).
pub struct CompositionBuilder {
    id: String,
    fps: Fps,
    canvas: Canvas,
    duration_in_frames: u64,
    layers: Vec<RenderUnit>,
    audio: Vec<AudioTrack>,
}

impl CompositionBuilder {
    /// Create a builder for a new composition.
    pub fn new(id: impl Into<String>, fps: Fps, canvas: Canvas, duration_in_frames: u64) -> Self {
        Self {
            id: id.into(),
            fps,
            canvas,
            duration_in_frames,
            layers: Vec::new(),
            audio: Vec::new(),
        }
    }

    /// Append a top-level layer; layers paint in the order they are added.
    pub fn layer(mut self, unit: impl Into<RenderUnit>) -> Self {
        self.layers.push(unit.into());
        self
    }

    /// Append a windowed top-level layer.
    pub fn sequence(
        self,
        offset: u64,
        duration: u64,
        unit: impl Into<RenderUnit>,
    ) -> FramewiseResult<Self> {
        Ok(self.layer(RenderUnit::sequence(offset, duration, unit)?))
    }

    /// Append an audio layer.
    pub fn audio(mut self, track: AudioTrack) -> Self {
        self.audio.push(track);
        self
    }

    /// Build and validate final [`Composition`](crate::Composition).
    ///
    /// A single layer becomes the root as-is; several layers are wrapped in a composite.
    pub fn build(mut self) -> FramewiseResult<Composition> {
        let root = match self.layers.len() {
            0 => {
                return Err(FramewiseError::configuration(format!(
                    "composition '{}' has no layers",
                    self.id
                )));
            }
            1 => self.layers.remove(0),
            _ => Composite::new(self.layers).into(),
        };
        let comp = Composition {
            id: self.id,
            root,
            duration_in_frames: self.duration_in_frames,
            fps: self.fps,
            canvas: self.canvas,
            audio: self.audio,
        };
        comp.validate()?;
        Ok(comp)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
