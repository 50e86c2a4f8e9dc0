//! Discrete-node render strategy
//!
//! Creates one lightweight host element per particle and lets the host's
//! declarative animation facilities interpolate it. The full particle set is
//! attached once at activation; there is no per-frame repaint, trading
//! continuous physics for lower CPU cost.

use crate::backend::{BackendMode, RenderBackend};
use crate::instance::ParticleInstance;
use sakura_core::{OverlayError, Result, Vec2, Viewport};
use sakura_engine::ParticleRng;

/// Host-assigned handle for one attached node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Animation parameters baked into a node at creation time. The host
/// interpolates position and opacity over `duration_ms`; the engine never
/// touches the node again until removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeAnimation {
    pub duration_ms: f32,
    pub delay_ms: f32,
    /// Fixed random sway amplitude in logical pixels, baked at spawn.
    /// Deliberately not the simulation's position-dependent wind; see
    /// DESIGN.md.
    pub sway_px: f32,
    /// Total rotation over the animation, in full turns
    pub rotation_turns: f32,
    /// End-position offset the host interpolates toward
    pub drift: Vec2,
}

/// One visual element handed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSpec {
    pub variant_index: u32,
    pub position: Vec2,
    pub size: f32,
    pub color: [f32; 4],
    pub opacity: f32,
    pub animation: NodeAnimation,
}

/// The host environment's node tree. Attach failure is reported as `None`
/// and the backend silently renders nothing for that particle.
pub trait NodeHost {
    fn attach(&mut self, spec: &NodeSpec) -> Option<NodeId>;
    fn remove(&mut self, id: NodeId);
}

/// The fire-once node strategy.
pub struct NodeBackend<H: NodeHost> {
    host: H,
    attached: Vec<NodeId>,
    rng: ParticleRng,
    viewport: Viewport,
    mounted: bool,
    populated: bool,
}

impl<H: NodeHost> NodeBackend<H> {
    pub fn new(host: H, seed: u32) -> Self {
        Self {
            host,
            attached: Vec::new(),
            rng: ParticleRng::new(seed),
            viewport: Viewport::default(),
            mounted: false,
            populated: false,
        }
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn detach_all(&mut self) {
        for id in self.attached.drain(..) {
            self.host.remove(id);
        }
        self.populated = false;
    }

    fn bake_animation(&mut self, variant_index: u32) -> NodeAnimation {
        let height = self.viewport.height;
        match variant_index {
            // Petal: fall the full layer height with a random sway
            0 => NodeAnimation {
                duration_ms: self.rng.range(8_000.0, 16_000.0),
                delay_ms: self.rng.range(0.0, 6_000.0),
                sway_px: self.rng.range(15.0, 60.0),
                rotation_turns: self.rng.range(0.5, 2.0) * self.rng.sign(),
                drift: Vec2::new(self.rng.range(-40.0, 40.0), height + 80.0),
            },
            // Butterfly: meander laterally, no net fall
            1 => NodeAnimation {
                duration_ms: self.rng.range(10_000.0, 20_000.0),
                delay_ms: self.rng.range(0.0, 2_000.0),
                sway_px: self.rng.range(30.0, 90.0),
                rotation_turns: self.rng.range(-0.1, 0.1),
                drift: Vec2::new(
                    self.rng.range(-120.0, 120.0),
                    self.rng.range(-60.0, 60.0),
                ),
            },
            // Star: twinkle in place
            _ => NodeAnimation {
                duration_ms: self.rng.range(1_500.0, 4_000.0),
                delay_ms: self.rng.range(0.0, 3_000.0),
                sway_px: 0.0,
                rotation_turns: 0.0,
                drift: Vec2::ZERO,
            },
        }
    }
}

impl<H: NodeHost> RenderBackend for NodeBackend<H> {
    fn mode(&self) -> BackendMode {
        BackendMode::FireOnce
    }

    fn mount(&mut self, viewport: Viewport, _scale_factor: f32) -> Result<()> {
        if self.mounted {
            return Err(OverlayError::LifecycleError(
                "node backend already mounted".to_string(),
            ));
        }
        self.viewport = viewport;
        self.mounted = true;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport, _scale_factor: f32) {
        self.viewport = viewport;
    }

    /// First paint attaches one node per instance with baked animation
    /// parameters; later paints are no-ops (the host is animating).
    fn paint(&mut self, instances: &[ParticleInstance]) {
        if !self.mounted || self.populated {
            return;
        }
        for inst in instances {
            let animation = self.bake_animation(inst.variant_index());
            let spec = NodeSpec {
                variant_index: inst.variant_index(),
                position: Vec2::new(inst.pos_size[0], inst.pos_size[1]),
                size: inst.pos_size[2],
                color: inst.color,
                opacity: inst.pos_size[3],
                animation,
            };
            if let Some(id) = self.host.attach(&spec) {
                self.attached.push(id);
            }
        }
        self.populated = true;
    }

    fn clear(&mut self) {
        self.detach_all();
    }

    fn dispose(&mut self) {
        self.detach_all();
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}
