//! CPU point-cloud rasterizer.
//!
//! Stands in for a GPU points draw call: every point is projected through the
//! camera and splatted as a screen-aligned square with additive blending and
//! no depth test, then the accumulated light is resolved into RGBA8 pixels.

use crate::camera::ViewProjection;
use crate::galaxy::GalaxyBuffers;
use glam::Vec3;

const MAX_SPRITE_PX: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub size: f32,
    pub size_attenuation: bool,
}

/// Rendering handle for one generated buffer pair. Dropping it releases both
/// buffers.
#[derive(Debug)]
pub struct PointCloud {
    buffers: GalaxyBuffers,
    material: PointsMaterial,
    origin: Vec3,
}

impl PointCloud {
    pub fn new(buffers: GalaxyBuffers, material: PointsMaterial) -> Self {
        Self {
            buffers,
            material,
            origin: Vec3::ZERO,
        }
    }

    pub fn buffers(&self) -> &GalaxyBuffers {
        &self.buffers
    }

    pub fn material(&self) -> PointsMaterial {
        self.material
    }

    /// World-space origin of the cloud; the camera looks here every tick.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn draw(&self, vp: &ViewProjection, target: &mut Raster, exposure: f32) {
        let w = target.width as f32;
        let h = target.height as f32;
        if target.width == 0 || target.height == 0 {
            return;
        }
        // Vertical half-extent in pixels; attenuated sprites scale by it.
        let scale = h * 0.5;

        for (p, c) in self.buffers.points() {
            let Some(hit) = vp.project(self.origin + Vec3::from_array(*p)) else {
                continue;
            };
            if hit.ndc_x.abs() > 1.0 || hit.ndc_y.abs() > 1.0 {
                continue;
            }
            let px = (hit.ndc_x * 0.5 + 0.5) * w;
            let py = (0.5 - hit.ndc_y * 0.5) * h;

            let mut sprite = self.material.size;
            if self.material.size_attenuation {
                sprite *= scale / hit.depth;
            }
            let light = [c[0] * exposure, c[1] * exposure, c[2] * exposure];
            target.splat(px, py, sprite.clamp(1.0, MAX_SPRITE_PX), light);
        }
    }
}

/// Additive accumulation buffer plus its resolved RGBA8 image.
#[derive(Debug, Default)]
pub struct Raster {
    width: usize,
    height: usize,
    accum: Vec<[f32; 3]>,
    rgba: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        let mut r = Self::default();
        r.resize(width, height);
        r
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.accum = vec![[0.0; 3]; width.saturating_mul(height)];
        self.rgba = vec![0; width.saturating_mul(height).saturating_mul(4)];
    }

    pub fn clear(&mut self) {
        self.accum.fill([0.0; 3]);
    }

    fn splat(&mut self, cx: f32, cy: f32, size: f32, light: [f32; 3]) {
        let half = size * 0.5;
        let x0 = (cx - half).floor().max(0.0) as usize;
        let y0 = (cy - half).floor().max(0.0) as usize;
        let x1 = ((cx + half).ceil() as usize).min(self.width);
        let y1 = ((cy + half).ceil() as usize).min(self.height);
        let x1 = x1.max((x0 + 1).min(self.width));
        let y1 = y1.max((y0 + 1).min(self.height));

        for y in y0..y1 {
            let row = y * self.width;
            for x in x0..x1 {
                let px = &mut self.accum[row + x];
                px[0] += light[0];
                px[1] += light[1];
                px[2] += light[2];
            }
        }
    }

    /// Clamp accumulated light into opaque RGBA8.
    pub fn resolve(&mut self) -> &[u8] {
        for (src, dst) in self.accum.iter().zip(self.rgba.chunks_exact_mut(4)) {
            dst[0] = (src[0].clamp(0.0, 1.0) * 255.0).round() as u8;
            dst[1] = (src[1].clamp(0.0, 1.0) * 255.0).round() as u8;
            dst[2] = (src[2].clamp(0.0, 1.0) * 255.0).round() as u8;
            dst[3] = 255;
        }
        &self.rgba
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }
}
