use super::*;
use crate::{
    foundation::core::{FrameIndex, Rgba8Premul},
    scene::model::{Leaf, Visual},
};

fn solid() -> Leaf {
    Leaf::new(Visual::Solid {
        color: Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
        width: 10.0,
        height: 10.0,
    })
}

fn builder(duration: u64) -> CompositionBuilder {
    CompositionBuilder::new(
        "dsl",
        Fps::whole(30).unwrap(),
        Canvas::new(320, 240).unwrap(),
        duration,
    )
}

#[test]
fn single_layer_becomes_root() {
    let comp = builder(30).layer(solid().named("only")).build().unwrap();
    assert!(matches!(comp.root, RenderUnit::Leaf(ref l) if l.name.as_deref() == Some("only")));
}

#[test]
fn several_layers_are_wrapped_in_order() {
    let comp = builder(300)
        .layer(solid().named("bg"))
        .sequence(0, 106, solid().named("title"))
        .unwrap()
        .sequence(105, 116, solid().named("scene1"))
        .unwrap()
        .build()
        .unwrap();
    let RenderUnit::Composite(root) = &comp.root else {
        panic!("expected composite root");
    };
    assert_eq!(root.children.len(), 3);
    assert!(matches!(root.children[1], RenderUnit::Sequence(ref s) if s.window.offset() == 0));
    assert!(
        matches!(root.children[2], RenderUnit::Sequence(ref s) if s.window.window().end == FrameIndex(221))
    );
}

#[test]
fn build_validates() {
    assert!(builder(30).build().is_err());
    assert!(builder(0).layer(solid()).build().is_err());
    assert!(builder(30).sequence(0, 0, solid()).is_err());
    assert!(CompositionBuilder::new(
        "",
        Fps::whole(30).unwrap(),
        Canvas::new(1, 1).unwrap(),
        1
    )
    .layer(solid())
    .build()
    .is_err());
}
