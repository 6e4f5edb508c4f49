//! Procedural spiral-galaxy point cloud.
//!
//! [`generate`] maps a [`GalaxyParameters`] set to a fresh pair of
//! index-aligned position and color buffers. Every point is placed on one of
//! `branches` spiral arms at a uniformly drawn radius, then jittered per axis
//! by a power-law offset that clusters near zero.

use crate::color::Rgb;
use clap::ValueEnum;
use std::f32::consts::TAU;
use thiserror::Error;

pub const DEFAULT_COUNT: usize = 100_000;
pub const DEFAULT_SIZE: f32 = 0.001;
pub const DEFAULT_RADIUS: f32 = 5.0;
pub const DEFAULT_BRANCHES: u32 = 3;
pub const DEFAULT_SPIN: f32 = 0.2;
pub const DEFAULT_RANDOMNESS: f32 = 0.2;
pub const DEFAULT_RANDOMNESS_POWER: f32 = 3.0;
pub const DEFAULT_INSIDE_COLOR: Rgb = Rgb::new(1.0, 96.0 / 255.0, 48.0 / 255.0);
pub const DEFAULT_OUTSIDE_COLOR: Rgb = Rgb::new(27.0 / 255.0, 57.0 / 255.0, 132.0 / 255.0);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalaxyError {
    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl GalaxyError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidParameter { field, .. } => field,
        }
    }
}

/// How the per-axis jitter is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum JitterMode {
    /// `pow(u, power) * sign`; the `randomness` field does not take part.
    #[default]
    Reference,
    /// Reference offset multiplied by `randomness * r`.
    Scaled,
}

impl JitterMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Scaled => "scaled",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Reference => Self::Scaled,
            Self::Scaled => Self::Reference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalaxyParameters {
    pub count: usize,
    /// Point size for the rendering surface; the generator ignores it.
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            size: DEFAULT_SIZE,
            radius: DEFAULT_RADIUS,
            branches: DEFAULT_BRANCHES,
            spin: DEFAULT_SPIN,
            randomness: DEFAULT_RANDOMNESS,
            randomness_power: DEFAULT_RANDOMNESS_POWER,
            inside_color: DEFAULT_INSIDE_COLOR,
            outside_color: DEFAULT_OUTSIDE_COLOR,
        }
    }
}

impl GalaxyParameters {
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.count < 1 {
            return Err(GalaxyError::invalid("count", "must be at least 1"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GalaxyError::invalid(
                "radius",
                format!("must be a finite value > 0 (got {})", self.radius),
            ));
        }
        if self.branches < 1 {
            return Err(GalaxyError::invalid("branches", "must be at least 1"));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(GalaxyError::invalid(
                "size",
                format!("must be a finite value > 0 (got {})", self.size),
            ));
        }
        if !self.spin.is_finite() {
            return Err(GalaxyError::invalid("spin", "must be finite"));
        }
        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(GalaxyError::invalid(
                "randomness",
                format!("must be a finite value >= 0 (got {})", self.randomness),
            ));
        }
        if !self.randomness_power.is_finite() || self.randomness_power < 1.0 {
            return Err(GalaxyError::invalid(
                "randomness_power",
                format!("must be a finite value >= 1 (got {})", self.randomness_power),
            ));
        }
        Ok(())
    }

    /// Largest magnitude a single axis offset can reach.
    pub fn max_jitter(&self, mode: JitterMode) -> f32 {
        match mode {
            JitterMode::Reference => 1.0,
            JitterMode::Scaled => self.randomness * self.radius,
        }
    }

    /// Color of a point sampled at radial distance `r`.
    pub fn color_at(&self, r: f32) -> Rgb {
        self.inside_color.lerp(self.outside_color, r / self.radius)
    }

    /// Jitter-free position of point `index` sampled at radial distance `r`.
    pub fn spiral_position(&self, index: usize, r: f32) -> [f32; 3] {
        let angle = branch_angle(index, self.branches) + r * self.spin;
        [angle.cos() * r, 0.0, angle.sin() * r]
    }
}

/// Arm angle for point `index`; arms are assigned round-robin by index.
pub fn branch_angle(index: usize, branches: u32) -> f32 {
    let branches = branches.max(1) as usize;
    (index % branches) as f32 / branches as f32 * TAU
}

/// Index-aligned output of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyBuffers {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl GalaxyBuffers {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&[f32; 3], &[f32; 3])> + '_ {
        self.positions.iter().zip(self.colors.iter())
    }
}

pub fn generate(
    params: &GalaxyParameters,
    rng: &mut fastrand::Rng,
) -> Result<GalaxyBuffers, GalaxyError> {
    generate_with(params, JitterMode::Reference, rng)
}

pub fn generate_with(
    params: &GalaxyParameters,
    mode: JitterMode,
    rng: &mut fastrand::Rng,
) -> Result<GalaxyBuffers, GalaxyError> {
    params.validate()?;

    let mut positions = Vec::with_capacity(params.count);
    let mut colors = Vec::with_capacity(params.count);

    for i in 0..params.count {
        let r = rng.f32() * params.radius;
        let [cx, _, cz] = params.spiral_position(i, r);

        let scale = match mode {
            JitterMode::Reference => 1.0,
            JitterMode::Scaled => params.randomness * r,
        };
        let ox = jitter(rng, params.randomness_power) * scale;
        let oy = jitter(rng, params.randomness_power) * scale;
        let oz = jitter(rng, params.randomness_power) * scale;

        positions.push([cx + ox, oy, cz + oz]);
        colors.push(params.color_at(r).to_array());
    }

    Ok(GalaxyBuffers { positions, colors })
}

#[inline]
fn jitter(rng: &mut fastrand::Rng, power: f32) -> f32 {
    let magnitude = rng.f32().powf(power);
    if rng.f32() < 0.5 { magnitude } else { -magnitude }
}
