//! The render backend contract shared by both strategies

use crate::instance::ParticleInstance;
use sakura_core::{Result, Viewport};

/// How the lifecycle manager drives a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Backend repaints from the live particle set every tick
    PerFrame,
    /// Backend receives the full particle set once at activation and the
    /// host animates it; no per-tick painting
    FireOnce,
}

/// A strategy that turns live particle state into visible output.
///
/// `dispose` must fully undo all visual effects (no leaked nodes, no leaked
/// raster content) and must be safe to call repeatedly. Failure to acquire
/// an output surface renders nothing rather than erroring: a decorative
/// layer never crashes its host.
pub trait RenderBackend {
    fn mode(&self) -> BackendMode;

    /// Attach to a layer of the given logical size. `scale_factor` is the
    /// device-pixel-ratio analog applied to any retained surface.
    fn mount(&mut self, viewport: Viewport, scale_factor: f32) -> Result<()>;

    /// Logical bounds changed. Affects only the output surface, never
    /// particle state.
    fn resize(&mut self, viewport: Viewport, scale_factor: f32);

    /// Present the current particle set
    fn paint(&mut self, instances: &[ParticleInstance]);

    /// Synchronously remove all visible output, leaving the backend mounted
    fn clear(&mut self);

    /// Tear down all output and detach. Idempotent.
    fn dispose(&mut self);

    fn is_mounted(&self) -> bool;
}
