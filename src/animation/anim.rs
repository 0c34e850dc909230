use crate::{
    animation::interpolate::InterpolationMapping,
    animation::spring::SpringConfig,
    foundation::core::{FrameIndex, Fps},
    foundation::error::{FramewiseError, FramewiseResult},
};

#[derive(Clone, Copy, Debug)]
/// Sampling context provided to animation evaluators.
///
/// It carries both the composition frame and the frame on the unit's own axis (after every
/// enclosing sequence offset has been removed) so expressions can choose the right space.
pub struct SampleCtx {
    /// Absolute frame index on the composition timeline.
    pub frame: FrameIndex, // global frame
    /// Frame index local to the innermost enclosing sequence.
    pub local: FrameIndex,
    /// Composition frame rate.
    pub fps: Fps,
}

/// Declarative scalar animation: a closed expression tree evaluated purely at a frame.
///
/// Leaves read the unit-local frame from [`SampleCtx::local`], except [`Anim::GlobalFrame`] which
/// reads [`SampleCtx::frame`]; there is no state carried from one frame to the next.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anim {
    /// Fixed value.
    Constant(f64),
    /// The local frame number itself.
    Frame,
    /// The composition frame, ignoring sequence offsets.
    GlobalFrame,
    /// Spring progress from 0 toward 1.
    Spring(SpringConfig),
    /// Feed `input` through a piecewise-linear mapping.
    Interpolate {
        /// Driving expression.
        input: Box<Anim>,
        /// Domain/range mapping.
        mapping: InterpolationMapping,
    },
    /// `sin(local * rate + phase)`.
    Sine {
        /// Radians per frame.
        rate: f64,
        /// Phase offset in radians.
        #[serde(default)]
        phase: f64,
    },
    /// Smallest of the operands.
    Min(Vec<Anim>),
    /// Largest of the operands.
    Max(Vec<Anim>),
    /// Product of the operands.
    Product(Vec<Anim>),
}

impl Anim {
    /// Constant `value`.
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// Constant `1.0`.
    pub fn one() -> Self {
        Self::Constant(1.0)
    }

    /// Constant `0.0`.
    pub fn zero() -> Self {
        Self::Constant(0.0)
    }

    /// Spring progress.
    pub fn spring(config: SpringConfig) -> Self {
        Self::Spring(config)
    }

    /// Map `input` through `mapping`.
    pub fn interpolate(input: Anim, mapping: InterpolationMapping) -> Self {
        Self::Interpolate {
            input: Box::new(input),
            mapping,
        }
    }

    /// Clamped linear ramp over local frames `[start, end]` from `from` to `to`.
    pub fn frame_ramp(start: f64, end: f64, from: f64, to: f64) -> FramewiseResult<Self> {
        let mapping = InterpolationMapping::clamped(vec![start, end], vec![from, to])?;
        Ok(Self::interpolate(Self::Frame, mapping))
    }

    /// Sine wave remapped from `[-1, 1]` onto `[lo, hi]`; a pulse/glow helper.
    pub fn pulse(rate: f64, lo: f64, hi: f64) -> FramewiseResult<Self> {
        let mapping = InterpolationMapping::new(vec![-1.0, 1.0], vec![lo, hi])?;
        Ok(Self::interpolate(Self::Sine { rate, phase: 0.0 }, mapping))
    }

    /// Validate static invariants for this expression tree.
    pub fn validate(&self) -> FramewiseResult<()> {
        match self {
            Self::Constant(v) => {
                if !v.is_finite() {
                    return Err(FramewiseError::configuration(
                        "constant animation value must be finite",
                    ));
                }
                Ok(())
            }
            Self::Frame | Self::GlobalFrame => Ok(()),
            Self::Spring(cfg) => cfg.validate(),
            Self::Interpolate { input, mapping: _ } => input.validate(),
            Self::Sine { rate, phase } => {
                if !rate.is_finite() || !phase.is_finite() {
                    return Err(FramewiseError::configuration(
                        "sine rate and phase must be finite",
                    ));
                }
                Ok(())
            }
            Self::Min(xs) | Self::Max(xs) | Self::Product(xs) => {
                if xs.is_empty() {
                    return Err(FramewiseError::configuration(
                        "min/max/product animations need at least one operand",
                    ));
                }
                xs.iter().try_for_each(Anim::validate)
            }
        }
    }

    /// Sample the expression at `ctx`.
    pub fn sample(&self, ctx: SampleCtx) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Frame => ctx.local.0 as f64,
            Self::GlobalFrame => ctx.frame.0 as f64,
            Self::Spring(cfg) => cfg.value(ctx.local, ctx.fps),
            Self::Interpolate { input, mapping } => mapping.map(input.sample(ctx)),
            Self::Sine { rate, phase } => (ctx.local.0 as f64 * rate + phase).sin(),
            Self::Min(xs) => xs.iter().map(|a| a.sample(ctx)).fold(f64::INFINITY, f64::min),
            Self::Max(xs) => xs
                .iter()
                .map(|a| a.sample(ctx))
                .fold(f64::NEG_INFINITY, f64::max),
            Self::Product(xs) => xs.iter().map(|a| a.sample(ctx)).product(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
