use crate::galaxy::{generate_with, GalaxyBuffers, GalaxyError, GalaxyParameters, JitterMode};
use crate::raster::{PointCloud, PointsMaterial};
use std::time::Instant;
use tracing::debug;

/// Owns the one live galaxy: its parameters and its rendering handle, which in
/// turn owns the current buffer pair.
#[derive(Debug)]
pub struct GalaxyVisual {
    params: GalaxyParameters,
    jitter: JitterMode,
    cloud: PointCloud,
    generation: u64,
    last_generate_ms: f32,
}

impl GalaxyVisual {
    pub fn new(
        params: GalaxyParameters,
        jitter: JitterMode,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, GalaxyError> {
        let start = Instant::now();
        let buffers = generate_with(&params, jitter, rng)?;
        Ok(Self {
            params,
            jitter,
            cloud: PointCloud::new(buffers, material_for(&params)),
            generation: 1,
            last_generate_ms: start.elapsed().as_secs_f32() * 1000.0,
        })
    }

    /// Generate from `params` and swap in the result. On error the previous
    /// galaxy stays in place untouched.
    pub fn regenerate(
        &mut self,
        params: GalaxyParameters,
        rng: &mut fastrand::Rng,
    ) -> Result<(), GalaxyError> {
        let start = Instant::now();
        let buffers = generate_with(&params, self.jitter, rng)?;
        // Assigning drops the old handle and its buffers.
        self.cloud = PointCloud::new(buffers, material_for(&params));
        self.params = params;
        self.generation += 1;
        self.last_generate_ms = start.elapsed().as_secs_f32() * 1000.0;
        debug!(
            generation = self.generation,
            count = params.count,
            branches = params.branches,
            randomness_power = params.randomness_power,
            ms = self.last_generate_ms,
            "galaxy regenerated"
        );
        Ok(())
    }

    pub fn set_jitter(
        &mut self,
        jitter: JitterMode,
        rng: &mut fastrand::Rng,
    ) -> Result<(), GalaxyError> {
        let previous = self.jitter;
        self.jitter = jitter;
        let params = self.params;
        if let Err(err) = self.regenerate(params, rng) {
            self.jitter = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn params(&self) -> &GalaxyParameters {
        &self.params
    }

    pub fn jitter(&self) -> JitterMode {
        self.jitter
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn buffers(&self) -> &GalaxyBuffers {
        self.cloud.buffers()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_generate_ms(&self) -> f32 {
        self.last_generate_ms
    }
}

fn material_for(params: &GalaxyParameters) -> PointsMaterial {
    PointsMaterial {
        size: params.size,
        size_attenuation: true,
    }
}
