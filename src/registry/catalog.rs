use std::{collections::BTreeMap, path::Path, sync::Arc};

use crate::{
    audio::track::ActiveAudio,
    composition::model::Composition,
    foundation::core::FrameIndex,
    foundation::error::{FramewiseError, FramewiseResult},
    scene::eval::{Evaluator, FrameOutput},
};

/// Named set of compositions; the entry point for rendering by id.
///
/// Compositions are immutable once registered and shared behind [`Arc`], so a registry can be read
/// from many render workers at once.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    comps: BTreeMap<String, Arc<Composition>>,
}

#[derive(serde::Deserialize)]
struct RegistryDoc {
    compositions: Vec<Composition>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add `comp`; ids must be unique.
    pub fn register(&mut self, comp: Composition) -> FramewiseResult<()> {
        comp.validate()?;
        if self.comps.contains_key(&comp.id) {
            return Err(FramewiseError::configuration(format!(
                "composition '{}' is already registered",
                comp.id
            )));
        }
        tracing::debug!(
            comp = %comp.id,
            duration = comp.duration_in_frames,
            "registered composition"
        );
        self.comps.insert(comp.id.clone(), Arc::new(comp));
        Ok(())
    }

    /// Look up a composition by id.
    pub fn get(&self, id: &str) -> FramewiseResult<Arc<Composition>> {
        self.comps
            .get(id)
            .cloned()
            .ok_or_else(|| FramewiseError::lookup(format!("unknown composition '{id}'")))
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.comps.keys().map(String::as_str)
    }

    /// Number of compositions.
    pub fn len(&self) -> usize {
        self.comps.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.comps.is_empty()
    }

    /// Evaluate frame `frame` of composition `id`.
    pub fn render_frame(&self, id: &str, frame: FrameIndex) -> FramewiseResult<FrameOutput> {
        let comp = self.get(id)?;
        Evaluator::eval_frame(&comp, frame)
    }

    /// Audio layers of composition `id` audible at `frame`.
    pub fn active_audio_at(
        &self,
        id: &str,
        frame: FrameIndex,
    ) -> FramewiseResult<Vec<ActiveAudio>> {
        self.get(id)?.active_audio_at(frame)
    }

    /// Parse a `{ "compositions": [...] }` document and register every entry.
    pub fn from_json_str(s: &str) -> FramewiseResult<Self> {
        let doc: RegistryDoc = serde_json::from_str(s)
            .map_err(|e| FramewiseError::serde(format!("invalid registry json: {e}")))?;
        let mut reg = Self::new();
        for comp in doc.compositions {
            reg.register(comp)?;
        }
        Ok(reg)
    }

    /// Read and parse a registry document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramewiseResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            FramewiseError::configuration(format!(
                "failed to read registry '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/catalog.rs"]
mod tests;
