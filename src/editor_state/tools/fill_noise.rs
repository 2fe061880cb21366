//! # Noisy Fill Tool
//!
//! Flood fill that paints each voxel with a randomly perturbed version of the
//! current color. The primary button varies brightness, the secondary button
//! varies hue, saturation and value.

use cgmath::Point3;
use fastrand::Rng;

use super::flood_fill::FloodFillEngine;
use super::{MouseButtons, Tool, ToolTarget};
use crate::core::Result;
use crate::editor_state::voxels::{color::Color, grid::VoxelGrid};

/// How the fill color is varied per voxel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoiseMode {
    /// Lighten or darken by a random factor
    Brightness,
    /// Shift hue by up to ±0.1·intensity and jitter saturation and value
    Chroma,
}

impl From<MouseButtons> for NoiseMode {
    fn from(button: MouseButtons) -> Self {
        match button {
            MouseButtons::Primary => NoiseMode::Brightness,
            MouseButtons::Secondary => NoiseMode::Chroma,
        }
    }
}

/// One fill operation, as requested by a click.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillRequest {
    /// The clicked voxel
    pub seed: Point3<i32>,
    /// The color to paint with, before noise
    pub color: Color,
    /// Noise strength in `[0, 1]`
    pub intensity: f32,
    /// Which noise to apply
    pub mode: NoiseMode,
}

impl FillRequest {
    /// Creates a request.
    ///
    /// # Arguments
    /// * `seed` - The clicked voxel
    /// * `color` - Base paint color
    /// * `intensity` - Noise strength, clamped to `[0, 1]`; NaN becomes 0
    /// * `mode` - Brightness or chroma noise
    pub fn new(seed: Point3<i32>, color: Color, intensity: f32, mode: NoiseMode) -> Self {
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        FillRequest {
            seed,
            color,
            intensity,
            mode,
        }
    }

    /// Builds the request for a click: seed and button from the pointer,
    /// color and intensity from the host.
    pub fn from_target(target: &ToolTarget<'_>) -> Self {
        FillRequest::new(
            target.world,
            target.color,
            target.intensity,
            target.mouse_button.into(),
        )
    }

    /// Draws one noisy variant of the request color. The result is always
    /// fully opaque.
    pub fn perturb(&self, rng: &mut Rng) -> Color {
        let i = self.intensity;
        match self.mode {
            NoiseMode::Brightness => {
                // 100 ± 100·i percent, truncated like an integer factor.
                let factor = rng.f32() * 200.0 * i + 100.0 - 100.0 * i;
                self.color.lighter(factor as u32).opaque()
            }
            NoiseMode::Chroma => {
                let (h, s, v) = self.color.to_hsv();
                let h = h + rng.f32() * 0.2 * i - 0.1 * i;
                let s = (s + rng.f32() * 2.0 * i - i).clamp(0.0, 1.0);
                let v = (v + rng.f32() * 2.0 * i - i).clamp(0.0, 1.0);
                Color::from_hsv(h, s, v, 0xff)
            }
        }
    }
}

/// The "Fill" drawing tool.
///
/// Clicking a voxel fills its connected same-colored region with noisy
/// variants of the current color, as a single undo step.
pub struct FillNoiseTool {
    rng: Rng,
}

impl Default for FillNoiseTool {
    fn default() -> Self {
        Self::new()
    }
}

impl FillNoiseTool {
    /// Name shown in the toolbar and used for activation.
    pub const NAME: &'static str = "Fill";

    /// Creates the tool with an entropy-seeded generator.
    pub fn new() -> Self {
        FillNoiseTool { rng: Rng::new() }
    }

    /// Creates the tool with a fixed seed, for reproducible noise.
    ///
    /// # Arguments
    /// * `seed` - Seed for the noise generator
    pub fn with_seed(seed: u64) -> Self {
        FillNoiseTool {
            rng: Rng::with_seed(seed),
        }
    }

    /// Fills the region under the request seed with noisy variants of its
    /// color, as one undo batch.
    ///
    /// # Arguments
    /// * `grid` - The model to paint
    /// * `request` - Seed, color, intensity and noise mode
    ///
    /// # Returns
    /// The number of voxels painted, 0 for an empty or out-of-bounds seed
    pub fn fill(&mut self, grid: &mut VoxelGrid, request: &FillRequest) -> Result<usize> {
        let rng = &mut self.rng;
        FloodFillEngine::fill(grid, request.seed, |_, _, _| request.perturb(rng))
    }
}

impl Tool for FillNoiseTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Flood fill with colour"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn on_mouse_click(&mut self, target: &mut ToolTarget<'_>) -> Result<()> {
        let request = FillRequest::from_target(target);
        self.fill(&mut *target.voxels, &request)?;
        Ok(())
    }
}
