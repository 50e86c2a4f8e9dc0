//! Retained raster-surface painter
//!
//! Owns one RGBA8 surface sized to the viewport times the device scale
//! factor, cleared and repainted on every tick. A frame-time gate bounds
//! repaints to the configured rate so slower devices are never forced above
//! their capability.

use crate::backend::{BackendMode, RenderBackend};
use crate::instance::ParticleInstance;
use instant::Instant;
use sakura_core::{lerp_f32, OverlayError, Result, Viewport};

/// Default repaint cap: 60 Hz
const DEFAULT_FRAME_INTERVAL_MS: f32 = 1000.0 / 60.0;

/// Petal ellipses are flatter than they are wide
const PETAL_ASPECT: f32 = 0.65;

/// Retained pixel surface. `None` when the viewport has zero area — the
/// backend then paints nothing, silently.
struct Surface {
    width_px: usize,
    height_px: usize,
    scale: f32,
    pixels: Vec<u8>,
}

impl Surface {
    fn new(viewport: Viewport, scale_factor: f32) -> Option<Self> {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let width_px = (viewport.width * scale).round() as usize;
        let height_px = (viewport.height * scale).round() as usize;
        if width_px == 0 || height_px == 0 {
            return None;
        }
        Some(Self {
            width_px,
            height_px,
            scale,
            pixels: vec![0; width_px * height_px * 4],
        })
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Source-over blend of a straight-alpha color into one pixel
    fn blend_pixel(&mut self, x: i64, y: i64, color: [f32; 4], coverage: f32) {
        if x < 0 || y < 0 || x >= self.width_px as i64 || y >= self.height_px as i64 {
            return;
        }
        let src_a = (color[3] * coverage).clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width_px + x as usize) * 4;
        for c in 0..3 {
            let dst = self.pixels[idx + c] as f32 / 255.0;
            let out = color[c] * src_a + dst * (1.0 - src_a);
            self.pixels[idx + c] = (out * 255.0).round() as u8;
        }
        let dst_a = self.pixels[idx + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Filled ellipse with radial alpha falloff, rotated by `rotation_deg`.
    fn fill_ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        rotation_deg: f32,
        color: [f32; 4],
    ) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let extent = rx.max(ry).ceil();
        let x0 = (cx - extent).floor() as i64;
        let x1 = (cx + extent).ceil() as i64;
        let y0 = (cy - extent).floor() as i64;
        let y1 = (cy + extent).ceil() as i64;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                // Rotate into the ellipse's local frame
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                let r2 = (lx / rx).powi(2) + (ly / ry).powi(2);
                if r2 < 1.0 {
                    // Radial gradient: opaque center fading to the rim
                    self.blend_pixel(px, py, color, lerp_f32(1.0, 0.0, r2));
                }
            }
        }
    }

    fn draw_instance(&mut self, inst: &ParticleInstance) {
        let s = self.scale;
        let x = inst.pos_size[0] * s;
        let y = inst.pos_size[1] * s;
        let size = inst.pos_size[2] * s;
        let opacity = inst.pos_size[3];
        let rotation = inst.rotation_variant[0];
        let color = [
            inst.color[0],
            inst.color[1],
            inst.color[2],
            inst.color[3] * opacity,
        ];

        match inst.variant_index() {
            // Petal: one filled ellipse with a radial gradient
            0 => {
                let rx = size * 0.5;
                self.fill_ellipse(x, y, rx, rx * PETAL_ASPECT, rotation, color);
            }
            // Butterfly: mirrored wing ellipses around a small body
            1 => {
                let wing_rx = size * 0.35;
                let wing_ry = size * 0.5;
                let spread = size * 0.3;
                let (sin, cos) = rotation.to_radians().sin_cos();
                let (ox, oy) = (spread * cos, spread * sin);
                self.fill_ellipse(x - ox, y - oy, wing_rx, wing_ry, rotation - 25.0, color);
                self.fill_ellipse(x + ox, y + oy, wing_rx, wing_ry, rotation + 25.0, color);
                let body = [0.25, 0.2, 0.2, color[3]];
                self.fill_ellipse(x, y, size * 0.08, size * 0.4, rotation, body);
            }
            // Star: soft dot with a cross flare
            _ => {
                let r = size;
                self.fill_ellipse(x, y, r, r, 0.0, color);
                let flare = [color[0], color[1], color[2], color[3] * 0.5];
                self.fill_ellipse(x, y, r * 2.5, r * 0.35, 0.0, flare);
                self.fill_ellipse(x, y, r * 0.35, r * 2.5, 0.0, flare);
            }
        }
    }
}

/// The retained-surface render strategy.
pub struct RasterBackend {
    surface: Option<Surface>,
    mounted: bool,
    frame_interval_ms: f32,
    last_paint: Option<Instant>,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self {
            surface: None,
            mounted: false,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            last_paint: None,
        }
    }

    /// Override the frame gate. Zero disables the cap (used by tests that
    /// paint back to back).
    pub fn with_frame_interval_ms(mut self, interval: f32) -> Self {
        self.frame_interval_ms = interval.max(0.0);
        self
    }

    /// Pixel dimensions of the retained surface, if one exists
    pub fn surface_size(&self) -> Option<(usize, usize)> {
        self.surface.as_ref().map(|s| (s.width_px, s.height_px))
    }

    /// Number of pixels with nonzero alpha; test observability hook
    pub fn visible_pixel_count(&self) -> usize {
        self.surface
            .as_ref()
            .map(|s| s.pixels.chunks_exact(4).filter(|px| px[3] > 0).count())
            .unwrap_or(0)
    }

    fn gate_allows_paint(&self) -> bool {
        match self.last_paint {
            None => true,
            Some(last) => {
                last.elapsed().as_secs_f32() * 1000.0 >= self.frame_interval_ms
            }
        }
    }
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for RasterBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::PerFrame
    }

    fn mount(&mut self, viewport: Viewport, scale_factor: f32) -> Result<()> {
        if self.mounted {
            return Err(OverlayError::LifecycleError(
                "raster backend already mounted".to_string(),
            ));
        }
        self.surface = Surface::new(viewport, scale_factor);
        self.mounted = true;
        self.last_paint = None;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport, scale_factor: f32) {
        if !self.mounted {
            return;
        }
        // Only the surface is rebuilt; particle state is untouched
        self.surface = Surface::new(viewport, scale_factor);
    }

    fn paint(&mut self, instances: &[ParticleInstance]) {
        if !self.mounted || !self.gate_allows_paint() {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear();
        for inst in instances {
            surface.draw_instance(inst);
        }
        self.last_paint = Some(Instant::now());
    }

    fn clear(&mut self) {
        // Bypasses the frame gate: disabling must clear synchronously
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }

    fn dispose(&mut self) {
        self.surface = None;
        self.mounted = false;
        self.last_paint = None;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}
