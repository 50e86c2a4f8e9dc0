//! Sakura Engine - pooled ambient-particle simulation
//!
//! Provides the simulation half of the decorative overlay:
//! - Fixed-capacity particle pool (no allocation during steady-state animation)
//! - Petal / butterfly / star variants with designed spawn ranges
//! - Device-capability-aware quality budgeting
//! - Per-tick integration with sinusoidal wind and off-screen retirement

pub mod config;
pub mod particle;
pub mod quality;
pub mod rand;
pub mod simulation;

pub use config::{ConfigPatch, OverlayConfig};
pub use particle::{Particle, ParticlePool, Variant};
pub use quality::{HostCapabilities, QualityBudget, Unconstrained, VariantTargets};
pub use rand::ParticleRng;
pub use simulation::Simulation;
