use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc,
    },
    time::Duration,
};

use super::*;
use crate::{
    audio::track::AudioTrack,
    composition::dsl::CompositionBuilder,
    foundation::core::{Canvas, Fps},
    scene::model::{Composite, Leaf, RenderUnit, Visual},
};

#[derive(Default)]
struct CountingLocator {
    fetches: AtomicUsize,
}

impl AssetLocator for CountingLocator {
    fn fetch(&self, asset: &AssetRef) -> FramewiseResult<LoadedAsset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if asset.as_str().ends_with(".png") {
            return Ok(LoadedAsset::Image(PreparedImage {
                width: 1,
                height: 1,
                rgba8_premul: Arc::new(vec![0, 0, 0, 255]),
            }));
        }
        if asset.as_str().starts_with("missing") {
            return Err(FramewiseError::asset(format!("no such asset '{asset}'")));
        }
        Ok(LoadedAsset::Audio(AudioPcm {
            sample_rate: 48_000,
            channels: 2,
            interleaved_f32: Arc::new(vec![0.0; 8]),
        }))
    }
}

fn r(s: &str) -> AssetRef {
    AssetRef::new(s).unwrap()
}

#[test]
fn asset_ref_rejects_blank() {
    assert!(AssetRef::new("").is_err());
    assert!(AssetRef::new("   ").is_err());
    assert_eq!(r("img/peon.png").to_string(), "img/peon.png");
    let parsed: AssetRef = serde_json::from_str("\"sounds/a.mp3\"").unwrap();
    assert_eq!(parsed.as_str(), "sounds/a.mp3");
    assert!(serde_json::from_str::<AssetRef>("\"\"").is_err());
}

#[test]
fn fetches_each_reference_once() {
    let cache = AssetCache::new(CountingLocator::default());
    assert!(cache.is_empty());
    let a = cache.get(&r("sounds/a.mp3")).unwrap();
    let b = cache.get(&r("sounds/a.mp3")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    cache.get(&r("img/peon.png")).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.locator.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_fetch_is_not_cached() {
    let cache = AssetCache::new(CountingLocator::default());
    let err = cache.get(&r("missing.mp3")).unwrap_err();
    assert!(matches!(err, FramewiseError::Asset(_)));
    assert!(cache.get(&r("missing.mp3")).is_err());
    assert!(cache.is_empty());
    assert_eq!(cache.locator.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn audio_rejects_images() {
    let cache = AssetCache::new(CountingLocator::default());
    assert!(cache.audio(&r("img/peon.png")).is_err());
    assert_eq!(cache.audio(&r("a.mp3")).unwrap().channels, 2);
}

#[test]
fn prefetch_resolves_scene_and_audio_refs() {
    let image = |src: &str| -> RenderUnit {
        Leaf::new(Visual::Image {
            src: r(src),
            width: 64.0,
            height: 64.0,
        })
        .into()
    };
    let comp = CompositionBuilder::new(
        "assets",
        Fps::whole(30).unwrap(),
        Canvas::new(64, 64).unwrap(),
        30,
    )
    .layer(Composite::new(vec![image("img/peon.png"), image("img/peon.png")]))
    .sequence(10, 10, Leaf::new(Visual::Image {
        src: r("img/grunt.png"),
        width: 64.0,
        height: 64.0,
    }))
    .unwrap()
    .audio(AudioTrack::new(r("sounds/a.mp3"), 0, 30).unwrap())
    .build()
    .unwrap();

    let cache = AssetCache::new(CountingLocator::default());
    assert_eq!(cache.prefetch(&comp).unwrap(), 3);
    assert_eq!(cache.prefetch(&comp).unwrap(), 3);
    assert_eq!(cache.locator.fetches.load(Ordering::SeqCst), 3);
}

struct GatedLocator {
    started: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    gave_up: AtomicBool,
}

impl AssetLocator for GatedLocator {
    fn fetch(&self, asset: &AssetRef) -> FramewiseResult<LoadedAsset> {
        if asset.as_str() == "slow.wav" {
            self.started.lock().unwrap().send(()).unwrap();
            let released = self
                .release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5));
            self.gave_up.store(released.is_err(), Ordering::SeqCst);
        }
        Ok(LoadedAsset::Audio(AudioPcm {
            sample_rate: 48_000,
            channels: 1,
            interleaved_f32: Arc::new(vec![0.0; 4]),
        }))
    }
}

#[test]
fn cached_hit_does_not_wait_on_unrelated_fetch() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let cache = AssetCache::new(GatedLocator {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
        gave_up: AtomicBool::new(false),
    });
    cache.get(&r("fast.wav")).unwrap();

    std::thread::scope(|scope| {
        let slow = scope.spawn(|| cache.get(&r("slow.wav")).map(|_| ()));
        started_rx.recv().unwrap();
        // The slow fetch is parked until released; a hit on another entry must still return.
        cache.get(&r("fast.wav")).unwrap();
        assert_eq!(cache.len(), 1);
        release_tx.send(()).unwrap();
        slow.join().unwrap().unwrap();
    });

    assert!(!cache.locator.gave_up.load(Ordering::SeqCst));
    assert_eq!(cache.len(), 2);
}

#[test]
fn poisoned_index_keeps_serving_entries() {
    let cache = AssetCache::new(CountingLocator::default());
    cache.get(&r("a.mp3")).unwrap();

    let poisoned = std::thread::scope(|scope| {
        scope
            .spawn(|| {
                let _guard = cache.entries.lock().unwrap();
                panic!("holder died");
            })
            .join()
    });
    assert!(poisoned.is_err());
    assert!(cache.entries.is_poisoned());

    assert_eq!(cache.len(), 1);
    cache.get(&r("a.mp3")).unwrap();
    cache.get(&r("b.mp3")).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.locator.fetches.load(Ordering::SeqCst), 2);
}
