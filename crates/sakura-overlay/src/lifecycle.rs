//! Lifecycle state machine and the caller-facing engine
//!
//! States: unmounted -> active <-> paused -> disposed. Pausing halts the
//! tick loop but retains pool and particle state; disposal releases
//! everything, removes all rendered output, and is idempotent.

use sakura_core::{OverlayError, Result, Viewport};
use sakura_engine::config::POOL_CAPACITY;
use sakura_engine::{
    ConfigPatch, HostCapabilities, OverlayConfig, ParticlePool, QualityBudget, Simulation,
    Variant, VariantTargets,
};
use sakura_render::{BackendMode, ParticleInstance, RenderBackend};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unmounted,
    Active,
    Paused,
    Disposed,
}

/// The decorative overlay engine.
///
/// Owns the particle pool, the simulation, a capabilities probe, and one
/// render backend. All methods are synchronous and fire-and-forget with
/// respect to the render loop; the host drives [`OverlayEngine::tick`] from
/// its animation-frame scheduler.
pub struct OverlayEngine {
    state: EngineState,
    config: OverlayConfig,
    probe: Box<dyn HostCapabilities>,
    backend: Box<dyn RenderBackend>,
    budget: QualityBudget,
    targets: VariantTargets,
    pool: ParticlePool,
    simulation: Simulation,
    viewport: Viewport,
    scale_factor: f32,
    document_visible: bool,
    element_visible: bool,
    /// Pre-allocated buffer for packing live particles each tick
    instance_buffer: Vec<ParticleInstance>,
}

impl OverlayEngine {
    pub fn new(
        config: OverlayConfig,
        probe: Box<dyn HostCapabilities>,
        backend: Box<dyn RenderBackend>,
    ) -> Self {
        Self {
            state: EngineState::Unmounted,
            config: config.clamped(),
            probe,
            backend,
            budget: QualityBudget::FULL,
            targets: VariantTargets::default(),
            pool: ParticlePool::new(POOL_CAPACITY),
            simulation: Simulation::new(0xDEAD_BEEF),
            viewport: Viewport::default(),
            scale_factor: 1.0,
            document_visible: true,
            element_visible: true,
            instance_buffer: Vec::with_capacity(POOL_CAPACITY),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Effective per-variant targets after quality budgeting
    pub fn targets(&self) -> VariantTargets {
        self.targets
    }

    pub fn live_count(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn live_count_of(&self, variant: Variant) -> usize {
        self.pool.count(variant)
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Attach the engine to a layer of the given logical size.
    pub fn mount(&mut self, viewport: Viewport, scale_factor: f32) -> Result<()> {
        if self.state != EngineState::Unmounted {
            return Err(OverlayError::LifecycleError(format!(
                "mount called in {:?} state",
                self.state
            )));
        }
        self.backend.mount(viewport, scale_factor)?;
        self.viewport = viewport;
        self.scale_factor = scale_factor;
        self.refresh_quality();
        self.state = EngineState::Paused;
        self.sync_state();
        if self.targets.total() > 0 {
            println!(
                "[overlay] mounted: {} petals, {} butterflies, {} stars effective",
                self.targets.petals, self.targets.butterflies, self.targets.stars
            );
        }
        Ok(())
    }

    /// Recompute the quality budget from the capabilities probe. Called on
    /// mount; hosts call it again whenever a capability signal changes.
    pub fn refresh_quality(&mut self) {
        self.budget = QualityBudget::from_probe(self.probe.as_ref());
        self.targets = self.budget.effective_targets(&self.config);
    }

    /// Advance the engine by `dt_ms`. No-op unless active.
    pub fn tick(&mut self, dt_ms: f32) {
        if self.state != EngineState::Active {
            return;
        }
        if self.backend.mode() == BackendMode::FireOnce {
            // The host compositor is animating; nothing to do per frame
            return;
        }
        self.simulation.step(
            &mut self.pool,
            self.targets,
            self.viewport,
            dt_ms,
            self.config.speed,
        );
        self.pack_instances();
        self.backend.paint(&self.instance_buffer);
    }

    /// Apply a partial configuration update. Does not transition lifecycle
    /// state, except that disabling synchronously clears all rendered
    /// output. No-op after disposal.
    pub fn update_config(&mut self, patch: ConfigPatch) {
        if self.state == EngineState::Disposed {
            return;
        }
        let was_enabled = self.config.enabled;
        patch.apply(&mut self.config);
        self.refresh_quality();

        if was_enabled && !self.config.enabled {
            // Not just stop spawning: remove what is on screen, now
            self.pool.release_all();
            self.backend.clear();
        }
        self.sync_state();
        self.repopulate_fire_once();
    }

    /// Host document became visible or hidden.
    pub fn set_document_visible(&mut self, visible: bool) {
        self.document_visible = visible;
        self.sync_state();
    }

    /// The decorative layer entered or left the visible viewport.
    pub fn set_element_visible(&mut self, visible: bool) {
        self.element_visible = visible;
        self.sync_state();
    }

    /// Logical bounds changed. Only the retirement bounds and the output
    /// surface are updated; the live particle set is untouched, so this is
    /// safe to call between ticks.
    pub fn resize(&mut self, viewport: Viewport, scale_factor: f32) {
        if self.state == EngineState::Disposed || self.state == EngineState::Unmounted {
            return;
        }
        self.viewport = viewport;
        self.scale_factor = scale_factor;
        self.backend.resize(viewport, scale_factor);
    }

    /// Tear the engine down. Releases all particles, removes all rendered
    /// output, and detaches the backend. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }
        self.pool.release_all();
        self.backend.dispose();
        self.state = EngineState::Disposed;
    }

    fn pack_instances(&mut self) {
        self.instance_buffer.clear();
        for p in self.pool.alive_slice() {
            self.instance_buffer.push(ParticleInstance::from_particle(p));
        }
    }

    /// Reconcile lifecycle state with the enable flag and visibility signals.
    fn sync_state(&mut self) {
        match self.state {
            EngineState::Unmounted | EngineState::Disposed => return,
            EngineState::Active | EngineState::Paused => {}
        }
        let should_run = self.config.enabled && self.document_visible && self.element_visible;
        let next = if should_run {
            EngineState::Active
        } else {
            EngineState::Paused
        };
        if next == EngineState::Active && self.state != EngineState::Active {
            self.state = EngineState::Active;
            self.repopulate_fire_once();
        } else {
            self.state = next;
        }
    }

    /// Fire-once backends receive the full particle set in a single paint
    /// instead of ramping through the simulation loop.
    fn repopulate_fire_once(&mut self) {
        if self.backend.mode() != BackendMode::FireOnce || self.state != EngineState::Active {
            return;
        }
        self.pool.release_all();
        self.backend.clear();
        self.spawn_to_targets();
        self.pack_instances();
        self.backend.paint(&self.instance_buffer);
    }

    fn spawn_to_targets(&mut self) {
        self.simulation
            .spawn_immediately(&mut self.pool, self.targets, self.viewport);
    }
}

impl Drop for OverlayEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sakura_engine::Unconstrained;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 16.0;

    /// Per-frame test backend recording paint/clear traffic
    struct RecordingBackend {
        mounted: bool,
        last_painted: Rc<Cell<usize>>,
        clear_calls: Rc<Cell<usize>>,
        dispose_calls: Rc<Cell<usize>>,
    }

    impl RecordingBackend {
        fn new() -> (Self, Rc<Cell<usize>>, Rc<Cell<usize>>, Rc<Cell<usize>>) {
            let painted = Rc::new(Cell::new(0));
            let cleared = Rc::new(Cell::new(0));
            let disposed = Rc::new(Cell::new(0));
            (
                Self {
                    mounted: false,
                    last_painted: painted.clone(),
                    clear_calls: cleared.clone(),
                    dispose_calls: disposed.clone(),
                },
                painted,
                cleared,
                disposed,
            )
        }
    }

    impl RenderBackend for RecordingBackend {
        fn mode(&self) -> BackendMode {
            BackendMode::PerFrame
        }
        fn mount(&mut self, _viewport: Viewport, _scale: f32) -> Result<()> {
            self.mounted = true;
            Ok(())
        }
        fn resize(&mut self, _viewport: Viewport, _scale: f32) {}
        fn paint(&mut self, instances: &[ParticleInstance]) {
            self.last_painted.set(instances.len());
        }
        fn clear(&mut self) {
            self.clear_calls.set(self.clear_calls.get() + 1);
            self.last_painted.set(0);
        }
        fn dispose(&mut self) {
            self.dispose_calls.set(self.dispose_calls.get() + 1);
            self.last_painted.set(0);
            self.mounted = false;
        }
        fn is_mounted(&self) -> bool {
            self.mounted
        }
    }

    struct ReducedMotion;
    impl HostCapabilities for ReducedMotion {
        fn reduced_motion(&self) -> bool {
            true
        }
        fn coarse_pointer(&self) -> bool {
            false
        }
        fn device_memory_gb(&self) -> Option<f32> {
            None
        }
    }

    fn engine_with(config: OverlayConfig) -> (OverlayEngine, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let (backend, painted, cleared, _) = RecordingBackend::new();
        let engine = OverlayEngine::new(config, Box::new(Unconstrained), Box::new(backend));
        (engine, painted, cleared)
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn run_ticks(engine: &mut OverlayEngine, n: usize) {
        for _ in 0..n {
            engine.tick(DT);
        }
    }

    #[test]
    fn mount_with_density_12_yields_12_petals() {
        let config = OverlayConfig {
            enabled: true,
            density: 12.0,
            speed: 1.0,
            butterflies_enabled: false,
            ..Default::default()
        };
        let (mut engine, painted, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        assert_eq!(engine.state(), EngineState::Active);

        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count_of(Variant::Petal), 12);
        assert_eq!(engine.live_count_of(Variant::Butterfly), 0);
        assert_eq!(engine.live_count_of(Variant::Star), 0);
        assert_eq!(painted.get(), 12);
    }

    #[test]
    fn reduced_motion_renders_nothing() {
        let config = OverlayConfig {
            density: 20.0,
            ..Default::default()
        };
        let (backend, painted, _, _) = RecordingBackend::new();
        let mut engine =
            OverlayEngine::new(config, Box::new(ReducedMotion), Box::new(backend));
        engine.mount(viewport(), 1.0).unwrap();
        // Lifecycle still runs, but the budget is zero
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.targets().total(), 0);

        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(painted.get(), 0);
    }

    #[test]
    fn disabled_butterflies_never_spawn() {
        let config = OverlayConfig {
            density: 10.0,
            butterflies_enabled: false,
            butterflies_count: 10.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 500);
        assert_eq!(engine.live_count_of(Variant::Butterfly), 0);
    }

    #[test]
    fn enabled_butterflies_reach_exact_count() {
        let config = OverlayConfig {
            density: 10.0,
            butterflies_enabled: true,
            butterflies_count: 4.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count_of(Variant::Butterfly), 4);
    }

    #[test]
    fn starlight_density_independent_of_petals() {
        let config = OverlayConfig {
            density: 10.0,
            starlight_enabled: true,
            starlight_density: 15.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count_of(Variant::Petal), 10);
        assert_eq!(engine.live_count_of(Variant::Star), 15);
    }

    #[test]
    fn runtime_disable_removes_stars_and_butterflies() {
        let config = OverlayConfig {
            density: 10.0,
            butterflies_enabled: true,
            butterflies_count: 5.0,
            starlight_enabled: true,
            starlight_density: 15.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count_of(Variant::Butterfly), 5);
        assert_eq!(engine.live_count_of(Variant::Star), 15);

        engine.update_config(ConfigPatch {
            butterflies_enabled: Some(false),
            starlight_enabled: Some(false),
            ..Default::default()
        });
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.targets().butterflies, 0);
        assert_eq!(engine.targets().stars, 0);

        // Stars never move and butterflies never leave, so reconciliation
        // must remove them; a fade later they are gone
        run_ticks(&mut engine, 200);
        assert_eq!(engine.live_count_of(Variant::Butterfly), 0);
        assert_eq!(engine.live_count_of(Variant::Star), 0);
        assert!(engine.live_count_of(Variant::Petal) > 0);
    }

    #[test]
    fn disabling_clears_output_synchronously() {
        let config = OverlayConfig {
            density: 15.0,
            ..Default::default()
        };
        let (mut engine, painted, cleared) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        assert!(painted.get() > 0);

        engine.update_config(ConfigPatch {
            enabled: Some(false),
            ..Default::default()
        });
        // Synchronous post-conditions, before any further tick
        assert_eq!(cleared.get(), 1);
        assert_eq!(painted.get(), 0);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.state(), EngineState::Paused);

        // Ticks while disabled paint nothing
        run_ticks(&mut engine, 10);
        assert_eq!(painted.get(), 0);
    }

    #[test]
    fn re_enabling_resumes_without_remount() {
        let config = OverlayConfig {
            density: 10.0,
            ..Default::default()
        };
        let (mut engine, painted, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        engine.update_config(ConfigPatch {
            enabled: Some(false),
            ..Default::default()
        });
        engine.update_config(ConfigPatch {
            enabled: Some(true),
            ..Default::default()
        });
        assert_eq!(engine.state(), EngineState::Active);
        run_ticks(&mut engine, 300);
        assert_eq!(engine.live_count_of(Variant::Petal), 10);
        assert!(painted.get() > 0);
    }

    #[test]
    fn document_hidden_pauses_and_retains_particles() {
        let config = OverlayConfig {
            density: 10.0,
            ..Default::default()
        };
        let (mut engine, painted, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        let live = engine.live_count();
        assert!(live > 0);

        engine.set_document_visible(false);
        assert_eq!(engine.state(), EngineState::Paused);
        let painted_before = painted.get();
        run_ticks(&mut engine, 50);
        // No painting while paused, and the pool is retained
        assert_eq!(painted.get(), painted_before);
        assert_eq!(engine.live_count(), live);

        engine.set_document_visible(true);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn element_visibility_also_gates_ticking() {
        let config = OverlayConfig::default();
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        engine.set_element_visible(false);
        assert_eq!(engine.state(), EngineState::Paused);
        engine.set_element_visible(true);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn mount_while_disabled_parks_in_paused() {
        let config = OverlayConfig {
            enabled: false,
            ..Default::default()
        };
        let (mut engine, painted, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        assert_eq!(engine.state(), EngineState::Paused);
        run_ticks(&mut engine, 50);
        assert_eq!(painted.get(), 0);
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let config = OverlayConfig::default();
        let (backend, painted, _, disposed) = RecordingBackend::new();
        let mut engine =
            OverlayEngine::new(config, Box::new(Unconstrained), Box::new(backend));
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 100);

        engine.dispose();
        assert_eq!(engine.state(), EngineState::Disposed);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(painted.get(), 0);
        assert_eq!(disposed.get(), 1);

        // Second dispose and post-dispose calls are no-ops
        engine.dispose();
        assert_eq!(disposed.get(), 1);
        engine.update_config(ConfigPatch {
            density: Some(100.0),
            ..Default::default()
        });
        engine.tick(DT);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.state(), EngineState::Disposed);
    }

    #[test]
    fn double_mount_is_rejected() {
        let config = OverlayConfig::default();
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        assert!(engine.mount(viewport(), 1.0).is_err());
    }

    #[test]
    fn config_update_does_not_transition_state() {
        let config = OverlayConfig {
            density: 20.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 200);

        engine.update_config(ConfigPatch {
            density: Some(40.0),
            ..Default::default()
        });
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.targets().petals, 40);
        // Live population reconciles over subsequent ticks, no restart
        run_ticks(&mut engine, 250);
        assert_eq!(engine.live_count_of(Variant::Petal), 40);
    }

    #[test]
    fn resize_does_not_disturb_live_particles() {
        let config = OverlayConfig {
            density: 10.0,
            ..Default::default()
        };
        let (mut engine, _, _) = engine_with(config);
        engine.mount(viewport(), 1.0).unwrap();
        run_ticks(&mut engine, 300);
        let live = engine.live_count();

        engine.resize(Viewport::new(1200.0, 900.0), 2.0);
        assert_eq!(engine.live_count(), live);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn fire_once_backend_receives_full_set_at_activation() {
        use sakura_render::{NodeBackend, NodeHost, NodeId, NodeSpec};

        #[derive(Default)]
        struct CountingHost {
            next: u64,
            live: usize,
        }
        impl NodeHost for CountingHost {
            fn attach(&mut self, _spec: &NodeSpec) -> Option<NodeId> {
                self.next += 1;
                self.live += 1;
                Some(NodeId(self.next))
            }
            fn remove(&mut self, _id: NodeId) {
                self.live -= 1;
            }
        }

        let config = OverlayConfig {
            density: 12.0,
            starlight_enabled: true,
            starlight_density: 15.0,
            ..Default::default()
        };
        let backend = NodeBackend::new(CountingHost::default(), 42);
        let mut engine =
            OverlayEngine::new(config, Box::new(Unconstrained), Box::new(backend));
        engine.mount(viewport(), 1.0).unwrap();
        // Fire-once: population is complete at mount, no ramp
        assert_eq!(engine.live_count(), 27);
        engine.tick(DT);
        assert_eq!(engine.live_count(), 27);

        engine.dispose();
        assert_eq!(engine.live_count(), 0);
    }
}
