use crate::{
    animation::ease::Ease,
    foundation::error::{FramewiseError, FramewiseResult},
};

/// Policy for inputs that fall outside the mapping's input domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Continue the linear trend of the edge segment.
    #[default]
    Extend,
    /// Hold the edge output value.
    Clamp,
}

/// Piecewise-linear map from an input domain onto an output range.
///
/// The input domain is strictly increasing and has at least two points; the output range has the
/// same length. Both are checked when the mapping is built (or deserialized), so [`map`] itself
/// cannot fail.
///
/// [`map`]: InterpolationMapping::map
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "InterpolationMappingDef", into = "InterpolationMappingDef")]
pub struct InterpolationMapping {
    input: Vec<f64>,
    output: Vec<f64>,
    extrapolate_left: Extrapolate,
    extrapolate_right: Extrapolate,
    ease: Ease,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct InterpolationMappingDef {
    input: Vec<f64>,
    output: Vec<f64>,
    #[serde(default)]
    extrapolate_left: Extrapolate,
    #[serde(default)]
    extrapolate_right: Extrapolate,
    #[serde(default)]
    ease: Ease,
}

impl TryFrom<InterpolationMappingDef> for InterpolationMapping {
    type Error = FramewiseError;

    fn try_from(def: InterpolationMappingDef) -> FramewiseResult<Self> {
        Self::new(def.input, def.output)?
            .with_extrapolation(def.extrapolate_left, def.extrapolate_right)
            .with_ease(def.ease)
    }
}

impl From<InterpolationMapping> for InterpolationMappingDef {
    fn from(m: InterpolationMapping) -> Self {
        Self {
            input: m.input,
            output: m.output,
            extrapolate_left: m.extrapolate_left,
            extrapolate_right: m.extrapolate_right,
            ease: m.ease,
        }
    }
}

impl InterpolationMapping {
    /// Build a linear mapping that extends on both sides.
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> FramewiseResult<Self> {
        if input.len() < 2 {
            return Err(FramewiseError::configuration(
                "interpolation input domain needs at least 2 points",
            ));
        }
        if input.len() != output.len() {
            return Err(FramewiseError::configuration(format!(
                "interpolation input has {} points but output has {}",
                input.len(),
                output.len()
            )));
        }
        if !input.iter().chain(output.iter()).all(|v| v.is_finite()) {
            return Err(FramewiseError::configuration(
                "interpolation points must be finite",
            ));
        }
        if !input.windows(2).all(|w| w[0] < w[1]) {
            return Err(FramewiseError::configuration(
                "interpolation input domain must be strictly increasing",
            ));
        }
        Ok(Self {
            input,
            output,
            extrapolate_left: Extrapolate::Extend,
            extrapolate_right: Extrapolate::Extend,
            ease: Ease::Linear,
        })
    }

    /// Build a mapping that clamps on both sides.
    pub fn clamped(input: Vec<f64>, output: Vec<f64>) -> FramewiseResult<Self> {
        Ok(Self::new(input, output)?.with_extrapolation(Extrapolate::Clamp, Extrapolate::Clamp))
    }

    /// Replace the extrapolation policy at each end.
    pub fn with_extrapolation(mut self, left: Extrapolate, right: Extrapolate) -> Self {
        self.extrapolate_left = left;
        self.extrapolate_right = right;
        self
    }

    /// Apply `ease` to the in-segment progress.
    pub fn with_ease(mut self, ease: Ease) -> FramewiseResult<Self> {
        ease.validate()?;
        self.ease = ease;
        Ok(self)
    }

    /// Input domain points.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Output range points.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Evaluate the mapping at `x`.
    pub fn map(&self, x: f64) -> f64 {
        let n = self.input.len();
        let first = self.input[0];
        let last = self.input[n - 1];

        if x < first {
            return match self.extrapolate_left {
                Extrapolate::Clamp => self.output[0],
                Extrapolate::Extend => self.segment_linear(0, x),
            };
        }
        if x > last {
            return match self.extrapolate_right {
                Extrapolate::Clamp => self.output[n - 1],
                Extrapolate::Extend => self.segment_linear(n - 2, x),
            };
        }
        if let Some(k) = self.input.iter().position(|&p| p == x) {
            return self.output[k];
        }

        // First index whose point lies past `x`; the bracketing segment starts one before it.
        let upper = self.input.partition_point(|&p| p <= x);
        let i = upper.saturating_sub(1).min(n - 2);
        let t = self.progress(i, x);
        let a = self.output[i];
        let b = self.output[i + 1];
        a + (b - a) * self.ease.apply(t)
    }

    fn progress(&self, i: usize, x: f64) -> f64 {
        let x0 = self.input[i];
        let x1 = self.input[i + 1];
        (x - x0) / (x1 - x0)
    }

    fn segment_linear(&self, i: usize, x: f64) -> f64 {
        let t = self.progress(i, x);
        let a = self.output[i];
        let b = self.output[i + 1];
        a + (b - a) * t
    }
}

/// One-shot interpolation; fails when the domain/range pair is invalid.
pub fn interpolate(
    x: f64,
    input: &[f64],
    output: &[f64],
    extrapolate_left: Extrapolate,
    extrapolate_right: Extrapolate,
) -> FramewiseResult<f64> {
    let mapping = InterpolationMapping::new(input.to_vec(), output.to_vec())?
        .with_extrapolation(extrapolate_left, extrapolate_right);
    Ok(mapping.map(x))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interpolate.rs"]
mod tests;
