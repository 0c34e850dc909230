use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn frame_range_intersection() {
    let a = FrameRange::new(FrameIndex(0), FrameIndex(50)).unwrap();
    let b = FrameRange::new(FrameIndex(20), FrameIndex(70)).unwrap();
    let i = a.intersect(b).unwrap();
    assert_eq!(i.start, FrameIndex(20));
    assert_eq!(i.end, FrameIndex(50));

    let c = FrameRange::new(FrameIndex(50), FrameIndex(60)).unwrap();
    assert!(a.intersect(c).is_none());
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::whole(30).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert!((fps.frames_to_secs(15.0) - 0.5).abs() < 1e-12);
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 1080).is_err());
    assert!(Canvas::new(1080, 0).is_err());
    assert!(Canvas::new(1080, 1080).is_ok());
}

#[test]
fn premultiply_halves_channels_at_half_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 100, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 50);
    assert_eq!(c.b, 0);
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let t = Transform2D::default();
    assert_eq!(t.to_affine(), Affine::IDENTITY);

    let t = Transform2D {
        translate: Vec2::new(10.0, -2.5),
        ..Transform2D::default()
    };
    assert_eq!(t.to_affine(), Affine::translate(Vec2::new(10.0, -2.5)));
}

#[test]
fn transform_scales_around_anchor() {
    let t = Transform2D {
        scale: 2.0,
        anchor: Vec2::new(10.0, 10.0),
        ..Transform2D::default()
    };
    let p = t.to_affine() * kurbo::Point::new(10.0, 10.0);
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
}
