//! Adaptive quality controller
//!
//! Derives the effective particle budget from host capability signals.
//! Signals are read through an injected probe so the controller can be
//! unit-tested with mocked capabilities instead of ambient global state.

use crate::config::{
    OverlayConfig, MAX_BUTTERFLIES, MAX_DENSITY, MAX_STARLIGHT, MIN_BUTTERFLIES, MIN_DENSITY,
    MIN_STARLIGHT,
};

/// Multiplier applied when the pointing device is coarse (touch/low-power)
pub const COARSE_POINTER_MULTIPLIER: f32 = 0.6;

/// Multiplier for the <=2 GB device-memory class
pub const LOW_MEMORY_MULTIPLIER: f32 = 0.4;

/// Multiplier for the <=4 GB device-memory class
pub const MID_MEMORY_MULTIPLIER: f32 = 0.6;

/// Read-only host capability signals.
///
/// Absence of a signal must degrade to the least-restrictive assumption:
/// `device_memory_gb` returning `None` means multiplier 1.0.
pub trait HostCapabilities {
    /// Accessibility preference requesting minimal animation
    fn reduced_motion(&self) -> bool;

    /// Coarse primary pointer, typically a touch device
    fn coarse_pointer(&self) -> bool;

    /// Advisory device memory hint in gigabytes, if the host exposes one
    fn device_memory_gb(&self) -> Option<f32>;
}

/// Probe for hosts that expose no constraining signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl HostCapabilities for Unconstrained {
    fn reduced_motion(&self) -> bool {
        false
    }
    fn coarse_pointer(&self) -> bool {
        false
    }
    fn device_memory_gb(&self) -> Option<f32> {
        None
    }
}

/// Device-capability-adjusted budget multiplier in [0, 1].
///
/// Recomputed on mount and on every relevant signal change; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBudget {
    pub multiplier: f32,
}

impl QualityBudget {
    /// Full budget, used before any probe has been consulted.
    pub const FULL: Self = Self { multiplier: 1.0 };

    /// Compute the budget from a capabilities probe.
    ///
    /// Signals combine by taking the minimum of all applicable multipliers,
    /// so any single constrained signal dominates. Reduced motion is the
    /// absolute override: the budget collapses to zero.
    pub fn from_probe(probe: &dyn HostCapabilities) -> Self {
        if probe.reduced_motion() {
            return Self { multiplier: 0.0 };
        }

        let mut multiplier: f32 = 1.0;

        if probe.coarse_pointer() {
            multiplier = multiplier.min(COARSE_POINTER_MULTIPLIER);
        }

        if let Some(gb) = probe.device_memory_gb() {
            let memory_multiplier = if gb <= 2.0 {
                LOW_MEMORY_MULTIPLIER
            } else if gb <= 4.0 {
                MID_MEMORY_MULTIPLIER
            } else {
                1.0
            };
            multiplier = multiplier.min(memory_multiplier);
        }

        Self { multiplier }
    }

    /// Effective count for one variant: round(clamp(requested) x multiplier).
    pub fn effective_count(&self, requested: f32, min: f32, max: f32) -> usize {
        let clamped = if requested.is_finite() {
            requested.clamp(min, max)
        } else {
            min
        };
        (clamped * self.multiplier).round() as usize
    }

    /// Effective per-variant targets for a config. Disabled variants are
    /// zero regardless of their count fields.
    pub fn effective_targets(&self, config: &OverlayConfig) -> VariantTargets {
        if !config.enabled {
            return VariantTargets::default();
        }
        VariantTargets {
            petals: self.effective_count(config.density, MIN_DENSITY, MAX_DENSITY),
            butterflies: if config.butterflies_enabled {
                self.effective_count(config.butterflies_count, MIN_BUTTERFLIES, MAX_BUTTERFLIES)
            } else {
                0
            },
            stars: if config.starlight_enabled {
                self.effective_count(config.starlight_density, MIN_STARLIGHT, MAX_STARLIGHT)
            } else {
                0
            },
        }
    }
}

/// Target live count per variant after quality budgeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantTargets {
    pub petals: usize,
    pub butterflies: usize,
    pub stars: usize,
}

impl VariantTargets {
    pub fn total(&self) -> usize {
        self.petals + self.butterflies + self.stars
    }
}
