//! Overlay configuration (parsed from TOML) and runtime patches
//!
//! Caller-supplied values are never trusted raw: everything numeric is
//! clamped to the documented ranges before use, and NaN collapses to a
//! safe default instead of propagating.

use serde::{Deserialize, Serialize};

/// Petal density bounds (target live petal count)
pub const MIN_DENSITY: f32 = 10.0;
pub const MAX_DENSITY: f32 = 150.0;

/// Simulation time-scale bounds
pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;

/// Butterfly count bounds
pub const MIN_BUTTERFLIES: f32 = 1.0;
pub const MAX_BUTTERFLIES: f32 = 10.0;

/// Star density bounds
pub const MIN_STARLIGHT: f32 = 10.0;
pub const MAX_STARLIGHT: f32 = 100.0;

/// Pool capacity: 1.3x the sum of all per-variant maxima, so transient
/// pressure never forces allocation during steady-state animation.
pub const POOL_CAPACITY: usize =
    ((MAX_DENSITY + MAX_BUTTERFLIES + MAX_STARLIGHT) * 1.3) as usize;

/// Configuration supplied by the host application.
///
/// Replaced wholesale (or patched via [`ConfigPatch`]) whenever the caller
/// changes an option; the engine reconciles live state without a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Target live petal count, clamped to [MIN_DENSITY, MAX_DENSITY]
    pub density: f32,
    /// Simulation time-scale multiplier, clamped to [MIN_SPEED, MAX_SPEED]
    pub speed: f32,
    pub butterflies_enabled: bool,
    pub butterflies_count: f32,
    pub starlight_enabled: bool,
    pub starlight_density: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            density: 50.0,
            speed: 1.0,
            butterflies_enabled: false,
            butterflies_count: 3.0,
            starlight_enabled: false,
            starlight_density: 40.0,
        }
    }
}

impl OverlayConfig {
    /// Parse an OverlayConfig from a TOML component table.
    /// Missing or mistyped entries fall back to defaults, never error.
    pub fn from_toml(table: &toml::value::Table) -> Self {
        let mut config = Self::default();

        if let Some(v) = table.get("enabled") {
            config.enabled = v.as_bool().unwrap_or(true);
        }
        if let Some(v) = table.get("density") {
            config.density = toml_f32(v, config.density);
        }
        if let Some(v) = table.get("speed") {
            config.speed = toml_f32(v, config.speed);
        }
        if let Some(v) = table.get("butterflies_enabled") {
            config.butterflies_enabled = v.as_bool().unwrap_or(false);
        }
        if let Some(v) = table.get("butterflies_count") {
            config.butterflies_count = toml_f32(v, config.butterflies_count);
        }
        if let Some(v) = table.get("starlight_enabled") {
            config.starlight_enabled = v.as_bool().unwrap_or(false);
        }
        if let Some(v) = table.get("starlight_density") {
            config.starlight_density = toml_f32(v, config.starlight_density);
        }

        config.clamped()
    }

    /// Returns a copy with every numeric field clamped to its documented
    /// range. NaN speed collapses to 1.0; NaN counts collapse to the minimum.
    pub fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            density: clamp_or(self.density, MIN_DENSITY, MAX_DENSITY, MIN_DENSITY),
            speed: clamp_or(self.speed, MIN_SPEED, MAX_SPEED, 1.0),
            butterflies_enabled: self.butterflies_enabled,
            butterflies_count: clamp_or(
                self.butterflies_count,
                MIN_BUTTERFLIES,
                MAX_BUTTERFLIES,
                MIN_BUTTERFLIES,
            ),
            starlight_enabled: self.starlight_enabled,
            starlight_density: clamp_or(
                self.starlight_density,
                MIN_STARLIGHT,
                MAX_STARLIGHT,
                MIN_STARLIGHT,
            ),
        }
    }
}

/// Partial config update: only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    pub density: Option<f32>,
    pub speed: Option<f32>,
    pub butterflies_enabled: Option<bool>,
    pub butterflies_count: Option<f32>,
    pub starlight_enabled: Option<bool>,
    pub starlight_density: Option<f32>,
}

impl ConfigPatch {
    pub fn apply(&self, config: &mut OverlayConfig) {
        if let Some(v) = self.enabled {
            config.enabled = v;
        }
        if let Some(v) = self.density {
            config.density = v;
        }
        if let Some(v) = self.speed {
            config.speed = v;
        }
        if let Some(v) = self.butterflies_enabled {
            config.butterflies_enabled = v;
        }
        if let Some(v) = self.butterflies_count {
            config.butterflies_count = v;
        }
        if let Some(v) = self.starlight_enabled {
            config.starlight_enabled = v;
        }
        if let Some(v) = self.starlight_density {
            config.starlight_density = v;
        }
        *config = config.clamped();
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}
