use crate::{
    foundation::core::{FrameIndex, Fps},
    foundation::error::{FramewiseError, FramewiseResult},
};

/// Default settle threshold used by [`SpringConfig::settle_frames`] callers.
pub const DEFAULT_SETTLE_THRESHOLD: f64 = 0.005;

const MAX_SETTLE_FRAMES: u64 = 10_000_000;

/// Damped harmonic oscillator released from rest at 0 and pulled toward 1.
///
/// `damping`, `mass` and `stiffness` must be finite and `> 0`; this is checked by every
/// constructor and by deserialization, so sampling never fails.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SpringConfigDef", into = "SpringConfigDef")]
pub struct SpringConfig {
    damping: f64,
    mass: f64,
    stiffness: f64,
    overshoot_clamping: bool,
    delay_frames: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct SpringConfigDef {
    #[serde(default = "default_damping")]
    damping: f64,
    #[serde(default = "default_mass")]
    mass: f64,
    #[serde(default = "default_stiffness")]
    stiffness: f64,
    #[serde(default)]
    overshoot_clamping: bool,
    #[serde(default)]
    delay_frames: u64,
}

fn default_damping() -> f64 {
    10.0
}

fn default_mass() -> f64 {
    1.0
}

fn default_stiffness() -> f64 {
    100.0
}

impl TryFrom<SpringConfigDef> for SpringConfig {
    type Error = FramewiseError;

    fn try_from(def: SpringConfigDef) -> FramewiseResult<Self> {
        Ok(Self::new(def.damping, def.mass, def.delay_frames)?
            .with_stiffness(def.stiffness)?
            .with_overshoot_clamping(def.overshoot_clamping))
    }
}

impl From<SpringConfig> for SpringConfigDef {
    fn from(c: SpringConfig) -> Self {
        Self {
            damping: c.damping,
            mass: c.mass,
            stiffness: c.stiffness,
            overshoot_clamping: c.overshoot_clamping,
            delay_frames: c.delay_frames,
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            mass: default_mass(),
            stiffness: default_stiffness(),
            overshoot_clamping: false,
            delay_frames: 0,
        }
    }
}

fn check_positive(name: &str, v: f64) -> FramewiseResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(FramewiseError::configuration(format!(
            "spring {name} must be finite and > 0 (got {v})"
        )));
    }
    Ok(())
}

impl SpringConfig {
    /// Build a spring with the default stiffness (100).
    pub fn new(damping: f64, mass: f64, delay_frames: u64) -> FramewiseResult<Self> {
        check_positive("damping", damping)?;
        check_positive("mass", mass)?;
        Ok(Self {
            damping,
            mass,
            delay_frames,
            ..Self::default()
        })
    }

    /// Override the spring constant.
    pub fn with_stiffness(mut self, stiffness: f64) -> FramewiseResult<Self> {
        check_positive("stiffness", stiffness)?;
        self.stiffness = stiffness;
        Ok(self)
    }

    /// When enabled the value never exceeds 1.
    pub fn with_overshoot_clamping(mut self, on: bool) -> Self {
        self.overshoot_clamping = on;
        self
    }

    /// Damping coefficient.
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Spring constant.
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Frames to wait before the spring is released.
    pub fn delay_frames(&self) -> u64 {
        self.delay_frames
    }

    /// Re-check invariants.
    pub fn validate(&self) -> FramewiseResult<()> {
        check_positive("damping", self.damping)?;
        check_positive("mass", self.mass)?;
        check_positive("stiffness", self.stiffness)
    }

    /// Spring progress at `frame` on the caller's local axis.
    ///
    /// Returns `0` until `delay_frames` have elapsed. Oscillator time is measured in seconds so a
    /// spring settles in the same wall time at any frame rate.
    pub fn value(&self, frame: FrameIndex, fps: Fps) -> f64 {
        let elapsed = match frame.0.checked_sub(self.delay_frames) {
            None | Some(0) => return 0.0,
            Some(e) => e,
        };
        let t = fps.frames_to_secs(elapsed as f64);
        let v = 1.0 + self.oscillator().displacement(t);
        if self.overshoot_clamping {
            v.min(1.0)
        } else {
            v
        }
    }

    /// Frames after release from which the value stays within `threshold` of 1 for good.
    pub fn settle_frames(&self, fps: Fps, threshold: f64) -> FramewiseResult<u64> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(FramewiseError::configuration(
                "spring settle threshold must be finite and > 0",
            ));
        }
        let osc = self.oscillator();
        for n in 0..MAX_SETTLE_FRAMES {
            if osc.envelope(fps.frames_to_secs(n as f64)) < threshold {
                return Ok(n);
            }
        }
        Err(FramewiseError::configuration(format!(
            "spring does not settle within {MAX_SETTLE_FRAMES} frames"
        )))
    }

    fn oscillator(&self) -> Oscillator {
        let omega0 = (self.stiffness / self.mass).sqrt();
        let zeta = self.damping / (2.0 * (self.stiffness * self.mass).sqrt());
        if (zeta - 1.0).abs() < 1e-9 {
            Oscillator::Critical { omega0 }
        } else if zeta < 1.0 {
            let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
            Oscillator::Under {
                decay: zeta * omega0,
                omega_d,
                sin_coeff: zeta * omega0 / omega_d,
            }
        } else {
            let s = (zeta * zeta - 1.0).sqrt();
            // `zeta - s` cancels for heavy damping; use the conjugate form for the slow root.
            let r_slow = -omega0 / (zeta + s);
            let r_fast = -omega0 * (zeta + s);
            let c_slow = r_fast / (r_slow - r_fast);
            Oscillator::Over {
                r_slow,
                r_fast,
                c_slow,
                c_fast: -1.0 - c_slow,
            }
        }
    }
}

/// Closed-form displacement `x(t)` from equilibrium for `x(0) = -1`, `x'(0) = 0`.
enum Oscillator {
    Under {
        decay: f64,
        omega_d: f64,
        sin_coeff: f64,
    },
    Critical {
        omega0: f64,
    },
    Over {
        r_slow: f64,
        r_fast: f64,
        c_slow: f64,
        c_fast: f64,
    },
}

impl Oscillator {
    fn displacement(&self, t: f64) -> f64 {
        match *self {
            Self::Under {
                decay,
                omega_d,
                sin_coeff,
            } => -(-decay * t).exp() * ((omega_d * t).cos() + sin_coeff * (omega_d * t).sin()),
            Self::Critical { omega0 } => -(-omega0 * t).exp() * (1.0 + omega0 * t),
            Self::Over {
                r_slow,
                r_fast,
                c_slow,
                c_fast,
            } => c_slow * (r_slow * t).exp() + c_fast * (r_fast * t).exp(),
        }
    }

    /// Upper bound on `|x(s)|` for every `s >= t`.
    fn envelope(&self, t: f64) -> f64 {
        match *self {
            Self::Under {
                decay, sin_coeff, ..
            } => (-decay * t).exp() * (1.0 + sin_coeff * sin_coeff).sqrt(),
            Self::Critical { .. } => self.displacement(t).abs(),
            Self::Over {
                r_slow,
                r_fast,
                c_slow,
                c_fast,
            } => c_slow.abs() * (r_slow * t).exp() + c_fast.abs() * (r_fast * t).exp(),
        }
    }
}

/// Spring progress for `config` at `frame`; shorthand for [`SpringConfig::value`].
pub fn spring(config: &SpringConfig, frame: FrameIndex, fps: Fps) -> f64 {
    config.value(frame, fps)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
