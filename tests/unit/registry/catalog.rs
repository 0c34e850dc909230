use super::*;
use crate::{
    composition::dsl::CompositionBuilder,
    foundation::core::{Canvas, Fps, Rgba8Premul},
    scene::model::{Leaf, Visual},
};

fn comp(id: &str, duration: u64) -> Composition {
    CompositionBuilder::new(
        id,
        Fps::whole(30).unwrap(),
        Canvas::new(1080, 1080).unwrap(),
        duration,
    )
    .layer(
        Leaf::new(Visual::Solid {
            color: Rgba8Premul::from_straight_rgba(0, 0, 0, 255),
            width: 1080.0,
            height: 1080.0,
        })
        .named("bg"),
    )
    .build()
    .unwrap()
}

#[test]
fn register_rejects_duplicate_ids() {
    let mut reg = Registry::new();
    reg.register(comp("KirovPreview", 840)).unwrap();
    reg.register(comp("TrainerPromo", 1400)).unwrap();
    let err = reg.register(comp("KirovPreview", 10)).unwrap_err();
    assert!(matches!(err, FramewiseError::Configuration(_)));
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.get("KirovPreview").unwrap().duration_in_frames, 840);
    assert_eq!(
        reg.ids().collect::<Vec<_>>(),
        vec!["KirovPreview", "TrainerPromo"]
    );
}

#[test]
fn register_rejects_invalid_compositions() {
    let mut reg = Registry::new();
    let mut bad = comp("Bad", 10);
    bad.duration_in_frames = 0;
    assert!(reg.register(bad).is_err());
    assert!(reg.is_empty());
}

#[test]
fn render_frame_checks_bounds_and_ids() {
    let mut reg = Registry::new();
    reg.register(comp("KirovPreview", 840)).unwrap();
    let out = reg.render_frame("KirovPreview", FrameIndex(839)).unwrap();
    assert_eq!(out.frame, FrameIndex(839));
    assert!(matches!(
        reg.render_frame("KirovPreview", FrameIndex(840)),
        Err(FramewiseError::Lookup(_))
    ));
    assert!(matches!(
        reg.render_frame("Missing", FrameIndex(0)),
        Err(FramewiseError::Lookup(_))
    ));
    assert!(reg.active_audio_at("KirovPreview", FrameIndex(0)).unwrap().is_empty());
}

#[test]
fn loads_document() {
    let doc = r#"{
        "compositions": [{
            "id": "Tiny",
            "duration_in_frames": 10,
            "fps": { "num": 30, "den": 1 },
            "canvas": { "width": 64, "height": 64 },
            "root": { "leaf": { "visual": { "solid": {
                "color": { "r": 0, "g": 0, "b": 0, "a": 255 },
                "width": 64.0, "height": 64.0
            } } } }
        }]
    }"#;
    let reg = Registry::from_json_str(doc).unwrap();
    assert_eq!(reg.len(), 1);
    assert!(reg.render_frame("Tiny", FrameIndex(9)).is_ok());

    assert!(matches!(
        Registry::from_json_str("{ \"compositions\": 3 }"),
        Err(FramewiseError::Serde(_))
    ));
    let dup = format!(
        "{{ \"compositions\": [{0}, {0}] }}",
        serde_json::to_string(&comp("Twice", 5)).unwrap()
    );
    assert!(matches!(
        Registry::from_json_str(&dup),
        Err(FramewiseError::Configuration(_))
    ));
}
