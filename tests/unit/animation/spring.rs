use super::*;

fn fps30() -> Fps {
    Fps::whole(30).unwrap()
}

fn curve(cfg: &SpringConfig, frames: u64) -> Vec<f64> {
    (0..frames).map(|f| cfg.value(FrameIndex(f), fps30())).collect()
}

#[test]
fn zero_until_delay_elapses() {
    let cfg = SpringConfig::new(14.0, 1.0, 8).unwrap();
    for f in 0..=8 {
        assert_eq!(cfg.value(FrameIndex(f), fps30()), 0.0, "frame {f}");
    }
    assert!(cfg.value(FrameIndex(9), fps30()) > 0.0);
}

#[test]
fn low_damping_overshoots_then_converges() {
    let cfg = SpringConfig::new(8.0, 1.3, 0).unwrap();
    let values = curve(&cfg, 300);
    assert!(values.iter().any(|&v| v > 1.0));
    assert!((values[299] - 1.0).abs() < 1e-3);
}

#[test]
fn overshoot_clamping_caps_at_one() {
    let cfg = SpringConfig::new(8.0, 1.3, 0)
        .unwrap()
        .with_overshoot_clamping(true);
    assert!(curve(&cfg, 300).iter().all(|&v| v <= 1.0));
}

#[test]
fn critical_damping_is_monotonic() {
    // damping 20 with k=100, m=1 gives zeta = 1.
    let cfg = SpringConfig::new(20.0, 1.0, 0).unwrap();
    let values = curve(&cfg, 120);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values.iter().all(|&v| v <= 1.0));
}

#[test]
fn overdamped_is_monotonic_and_below_target() {
    let cfg = SpringConfig::new(200.0, 1.0, 0).unwrap();
    let values = curve(&cfg, 600);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values.iter().all(|&v| (0.0..1.0).contains(&v)));
    assert!(values[599] > 0.9);
}

#[test]
fn higher_damping_means_less_overshoot() {
    let peak = |d: f64| {
        curve(&SpringConfig::new(d, 1.0, 0).unwrap(), 200)
            .into_iter()
            .fold(f64::MIN, f64::max)
    };
    assert!(peak(8.0) > peak(14.0));
}

#[test]
fn higher_mass_settles_slower() {
    let light = SpringConfig::new(10.0, 1.0, 0).unwrap();
    let heavy = SpringConfig::new(10.0, 3.0, 0).unwrap();
    let a = light.settle_frames(fps30(), DEFAULT_SETTLE_THRESHOLD).unwrap();
    let b = heavy.settle_frames(fps30(), DEFAULT_SETTLE_THRESHOLD).unwrap();
    assert!(b > a);
}

#[test]
fn stays_settled_after_settle_frame() {
    for cfg in [
        SpringConfig::new(10.0, 1.1, 20).unwrap(),
        SpringConfig::new(20.0, 1.0, 0).unwrap(),
        SpringConfig::new(60.0, 1.0, 0).unwrap(),
    ] {
        let n = cfg.settle_frames(fps30(), DEFAULT_SETTLE_THRESHOLD).unwrap();
        let start = n + cfg.delay_frames();
        for f in start..start + 600 {
            let v = cfg.value(FrameIndex(f), fps30());
            assert!((v - 1.0).abs() < DEFAULT_SETTLE_THRESHOLD, "{cfg:?} frame {f}");
        }
    }
}

#[test]
fn time_is_measured_in_seconds() {
    let cfg = SpringConfig::default();
    let a = cfg.value(FrameIndex(30), Fps::whole(30).unwrap());
    let b = cfg.value(FrameIndex(60), Fps::whole(60).unwrap());
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let cfg = SpringConfig::new(12.0, 1.0, 3).unwrap();
    for f in [0u64, 4, 17, 99, 1000] {
        let a = spring(&cfg, FrameIndex(f), fps30());
        let b = spring(&cfg, FrameIndex(f), fps30());
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn rejects_non_positive_parameters() {
    assert!(SpringConfig::new(0.0, 1.0, 0).is_err());
    assert!(SpringConfig::new(-1.0, 1.0, 0).is_err());
    assert!(SpringConfig::new(10.0, 0.0, 0).is_err());
    assert!(SpringConfig::new(10.0, f64::NAN, 0).is_err());
    assert!(SpringConfig::default().with_stiffness(0.0).is_err());
    assert!(
        SpringConfig::default()
            .settle_frames(fps30(), 0.0)
            .is_err()
    );
}

#[test]
fn deserialization_applies_defaults_and_validation() {
    let cfg: SpringConfig = serde_json::from_str(r#"{ "damping": 14, "delay_frames": 5 }"#).unwrap();
    assert_eq!(cfg.damping(), 14.0);
    assert_eq!(cfg.mass(), 1.0);
    assert_eq!(cfg.stiffness(), 100.0);
    assert_eq!(cfg.delay_frames(), 5);

    assert!(serde_json::from_str::<SpringConfig>(r#"{ "mass": 0 }"#).is_err());
}

#[test]
fn heavy_damping_still_creeps_towards_one() {
    let cfg = SpringConfig::new(1e12, 1.0, 0).unwrap();
    let v = cfg.value(FrameIndex(30), fps30());
    assert!(v > 0.0 && v < 1e-6, "got {v}");
    assert!(cfg.value(FrameIndex(60), fps30()) > v);
    assert!((cfg.value(FrameIndex(u64::MAX / 2), fps30()) - 1.0).abs() < 1e-9);
}
