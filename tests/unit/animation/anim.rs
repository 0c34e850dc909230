use super::*;

fn ctx(local: u64) -> SampleCtx {
    SampleCtx {
        frame: FrameIndex(local + 100),
        fps: Fps::whole(30).unwrap(),
        local: FrameIndex(local),
    }
}

#[test]
fn frame_reads_local_axis() {
    assert_eq!(Anim::Frame.sample(ctx(7)), 7.0);
}

#[test]
fn global_frame_ignores_sequence_offsets() {
    assert_eq!(Anim::GlobalFrame.sample(ctx(7)), 107.0);
    let parsed: Anim = serde_json::from_str("\"global_frame\"").unwrap();
    assert_eq!(parsed, Anim::GlobalFrame);
    assert!(parsed.validate().is_ok());
}

#[test]
fn frame_ramp_clamps_both_ends() {
    let exit = Anim::frame_ramp(90.0, 105.0, 1.0, 0.0).unwrap();
    assert_eq!(exit.sample(ctx(0)), 1.0);
    assert_eq!(exit.sample(ctx(90)), 1.0);
    assert!((exit.sample(ctx(97)) - (1.0 - 7.0 / 15.0)).abs() < 1e-12);
    assert_eq!(exit.sample(ctx(105)), 0.0);
    assert_eq!(exit.sample(ctx(400)), 0.0);
}

#[test]
fn spring_driven_translation() {
    let cfg = SpringConfig::new(20.0, 1.0, 0).unwrap();
    let y = Anim::interpolate(
        Anim::spring(cfg),
        InterpolationMapping::new(vec![0.0, 1.0], vec![8.0, 0.0]).unwrap(),
    );
    assert_eq!(y.sample(ctx(0)), 8.0);
    assert!(y.sample(ctx(10)) < 8.0);
    assert!(y.sample(ctx(300)).abs() < 1e-3);
}

#[test]
fn min_of_enter_and_exit_fades() {
    let enter = Anim::frame_ramp(0.0, 10.0, 0.0, 1.0).unwrap();
    let exit = Anim::frame_ramp(720.0, 740.0, 1.0, 0.0).unwrap();
    let op = Anim::Min(vec![enter, exit]);
    assert_eq!(op.sample(ctx(5)), 0.5);
    assert_eq!(op.sample(ctx(300)), 1.0);
    assert_eq!(op.sample(ctx(730)), 0.5);
}

#[test]
fn pulse_stays_in_band() {
    let p = Anim::pulse(0.3, 0.8, 1.0).unwrap();
    for f in 0..200 {
        let v = p.sample(ctx(f));
        assert!((0.8 - 1e-12..=1.0 + 1e-12).contains(&v));
    }
}

#[test]
fn product_multiplies_operands() {
    let a = Anim::Product(vec![Anim::constant(0.5), Anim::constant(4.0), Anim::Frame]);
    assert_eq!(a.sample(ctx(3)), 6.0);
}

#[test]
fn validate_rejects_bad_trees() {
    assert!(Anim::Min(vec![]).validate().is_err());
    assert!(Anim::constant(f64::INFINITY).validate().is_err());
    assert!(
        Anim::Product(vec![Anim::Sine {
            rate: f64::NAN,
            phase: 0.0
        }])
        .validate()
        .is_err()
    );
    assert!(Anim::Max(vec![Anim::one(), Anim::zero()]).validate().is_ok());
}

#[test]
fn deserializes_nested_expression() {
    let json = r#"{ "interpolate": {
        "input": { "spring": { "damping": 10, "mass": 1.1, "delay_frames": 20 } },
        "mapping": { "input": [0, 1], "output": [0.8, 1] }
    } }"#;
    let a: Anim = serde_json::from_str(json).unwrap();
    a.validate().unwrap();
    assert_eq!(a.sample(ctx(0)), 0.8);
    assert_eq!(a.sample(ctx(20)), 0.8);
    assert!(a.sample(ctx(40)) > 0.8);
}
