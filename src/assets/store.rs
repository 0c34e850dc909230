use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use crate::{
    composition::model::Composition,
    foundation::error::{FramewiseError, FramewiseResult},
};

/// Opaque handle to an external asset (image, audio file, ...).
///
/// The core never interprets the string; it is handed verbatim to an [`AssetLocator`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetRef(String);

impl AssetRef {
    /// Wrap a non-empty reference.
    pub fn new(reference: impl Into<String>) -> FramewiseResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(FramewiseError::configuration(
                "asset reference must be non-empty",
            ));
        }
        Ok(Self(reference))
    }

    /// The raw reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetRef {
    type Error = FramewiseError;

    fn try_from(s: String) -> FramewiseResult<Self> {
        Self::new(s)
    }
}

impl From<AssetRef> for String {
    fn from(r: AssetRef) -> Self {
        r.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
/// Decoded PCM audio.
pub struct AudioPcm {
    /// Source sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count (1 or 2 are mixed).
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Arc<Vec<f32>>,
}

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// An asset after the locator has fetched and decoded it.
pub enum LoadedAsset {
    /// Raster image.
    Image(PreparedImage),
    /// Audio clip.
    Audio(AudioPcm),
}

/// Boundary to the external collaborator that resolves and decodes asset references.
pub trait AssetLocator: Send + Sync {
    /// Fetch and decode `asset`. Failures should be reported as [`FramewiseError::Asset`].
    fn fetch(&self, asset: &AssetRef) -> FramewiseResult<LoadedAsset>;
}

/// Memoizing front for an [`AssetLocator`]: every reference is fetched at most once.
///
/// The cache is shared by reference across render workers. The index lock is only held to find
/// an entry's slot; the fetch itself runs under that slot's own guard, so a slow decode only
/// blocks callers asking for the same reference.
pub struct AssetCache<L> {
    locator: L,
    entries: Mutex<HashMap<AssetRef, Arc<Slot>>>,
}

#[derive(Default)]
struct Slot {
    fetching: Mutex<()>,
    loaded: OnceLock<Arc<LoadedAsset>>,
}

impl<L: AssetLocator> AssetCache<L> {
    /// Wrap `locator` with an empty cache.
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // Entries are only ever inserted whole, so a guard recovered from a panicking holder still
    // sees a consistent map.
    fn index(&self) -> MutexGuard<'_, HashMap<AssetRef, Arc<Slot>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch `asset`, consulting the cache first.
    pub fn get(&self, asset: &AssetRef) -> FramewiseResult<Arc<LoadedAsset>> {
        let slot = Arc::clone(self.index().entry(asset.clone()).or_default());
        if let Some(hit) = slot.loaded.get() {
            return Ok(Arc::clone(hit));
        }

        // A fetch that panicked left `loaded` unset, so the next caller simply retries.
        let _fetching = slot.fetching.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = slot.loaded.get() {
            return Ok(Arc::clone(hit));
        }
        tracing::debug!(asset = %asset, "asset cache miss");
        let loaded = Arc::new(self.locator.fetch(asset)?);
        Ok(Arc::clone(slot.loaded.get_or_init(|| loaded)))
    }

    /// Fetch `asset` and require it to be audio.
    pub fn audio(&self, asset: &AssetRef) -> FramewiseResult<AudioPcm> {
        match self.get(asset)?.as_ref() {
            LoadedAsset::Audio(pcm) => Ok(pcm.clone()),
            LoadedAsset::Image(_) => Err(FramewiseError::asset(format!(
                "asset '{asset}' is an image, expected audio"
            ))),
        }
    }

    /// Fetch every asset `comp` references; returns how many distinct references were resolved.
    pub fn prefetch(&self, comp: &Composition) -> FramewiseResult<usize> {
        let refs: BTreeSet<AssetRef> = comp.asset_refs();
        for r in &refs {
            self.get(r)?;
        }
        Ok(refs.len())
    }

    /// Number of successfully fetched assets. Failed or in-flight fetches are not counted.
    pub fn len(&self) -> usize {
        self.index()
            .values()
            .filter(|slot| slot.loaded.get().is_some())
            .count()
    }

    /// `true` when nothing has been fetched yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
