//! Particle model and fixed-capacity pool
//!
//! A particle slot is either pooled (dead, fields reset) or active (owned by
//! the live prefix of the arena). Slots are recycled by swap-remove; nothing
//! is allocated after the pool is warmed at construction.

use crate::rand::ParticleRng;
use sakura_core::{Color, Vec2, Viewport};

/// Sakura petal palette (soft pinks)
const PETAL_PALETTE: [u32; 4] = [0xFFB7C5, 0xFFC9D6, 0xF8A5C2, 0xFFD1DC];

/// Butterfly wing palette
const BUTTERFLY_PALETTE: [u32; 4] = [0xFFB6C1, 0xE6A8D7, 0xADD8E6, 0xFFE4B5];

/// Star palette (warm whites)
const STAR_PALETTE: [u32; 3] = [0xFFFFFF, 0xFFF8DC, 0xFFFACD];

/// Visual variant of a drifting element. Determines the draw routine,
/// color palette, and spawn policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Petal,
    Butterfly,
    Star,
}

impl Variant {
    pub fn palette(self) -> &'static [u32] {
        match self {
            Variant::Petal => &PETAL_PALETTE,
            Variant::Butterfly => &BUTTERFLY_PALETTE,
            Variant::Star => &STAR_PALETTE,
        }
    }

    /// Stable index used when packing instances for the render backend
    pub fn index(self) -> u32 {
        match self {
            Variant::Petal => 0,
            Variant::Butterfly => 1,
            Variant::Star => 2,
        }
    }
}

/// One drifting decorative element.
///
/// Velocities are in logical pixels per simulated millisecond; rotation in
/// degrees and degrees per millisecond.
#[derive(Clone)]
pub struct Particle {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub size: f32,
    pub opacity: f32,
    /// Spawn-time opacity, the base the star twinkle oscillates around
    pub base_opacity: f32,
    pub color: Color,
    pub variant: Variant,
    /// Per-particle sinusoidal wind phase, baked at spawn
    pub sway_phase: f32,
    /// Lateral wind strength in px/ms, baked at spawn
    pub sway_amplitude: f32,
    pub age_ms: f32,
    pub alive: bool,
    /// Set when the variant's target dropped below the live count; the
    /// particle fades out over a few ticks and is then released
    pub fading: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 0.0,
            opacity: 0.0,
            base_opacity: 0.0,
            color: Color::TRANSPARENT,
            variant: Variant::Petal,
            sway_phase: 0.0,
            sway_amplitude: 0.0,
            age_ms: 0.0,
            alive: false,
            fading: false,
        }
    }
}

/// Fixed-capacity arena with an alive prefix and swap-remove retirement.
///
/// `acquire` recycles the slot just past the alive prefix; `retire` swaps a
/// dead slot out of the prefix in O(1). Capacity is fixed at construction
/// and is larger than the maximum supported population (see
/// [`crate::config::POOL_CAPACITY`]).
pub struct ParticlePool {
    particles: Vec<Particle>,
    alive_count: usize,
    next_id: u32,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        let mut particles = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            particles.push(Particle::dead());
        }
        Self {
            particles,
            alive_count: 0,
            next_id: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of live particles of one variant
    pub fn count(&self, variant: Variant) -> usize {
        self.alive_slice()
            .iter()
            .filter(|p| p.variant == variant)
            .count()
    }

    /// Take one particle from the pool, re-randomize its transient fields
    /// for `variant` within the designed ranges, and return it.
    /// Returns `None` if the pool is exhausted.
    pub fn acquire(
        &mut self,
        variant: Variant,
        viewport: Viewport,
        rng: &mut ParticleRng,
    ) -> Option<&mut Particle> {
        if self.alive_count >= self.particles.len() {
            return None;
        }
        let idx = self.alive_count;
        self.alive_count += 1;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let p = &mut self.particles[idx];
        *p = Particle::dead();
        p.id = id;
        p.variant = variant;
        p.alive = true;
        p.color = Color::from_hex(*rng.pick(variant.palette()));
        p.sway_phase = rng.range(0.0, std::f32::consts::TAU);

        match variant {
            Variant::Petal => {
                // Petals enter along the top edge and drift down
                p.position = Vec2::new(rng.range(0.0, viewport.width), rng.range(-20.0, -5.0));
                p.velocity = Vec2::new(rng.range(-0.02, 0.02), rng.range(0.03, 0.09));
                p.rotation = rng.range(0.0, 360.0);
                p.rotation_speed = rng.range(0.02, 0.06) * rng.sign();
                p.size = rng.range(8.0, 18.0);
                p.base_opacity = rng.range(0.5, 0.9);
                p.sway_amplitude = rng.range(0.01, 0.04);
            }
            Variant::Butterfly => {
                // Butterflies wander inside the viewport
                p.position = Vec2::new(
                    rng.range(0.0, viewport.width),
                    rng.range(0.0, viewport.height * 0.8),
                );
                p.velocity = Vec2::new(
                    rng.range(0.02, 0.04) * rng.sign(),
                    rng.range(-0.015, 0.015),
                );
                p.rotation = rng.range(-20.0, 20.0);
                p.rotation_speed = rng.range(0.005, 0.015) * rng.sign();
                p.size = rng.range(14.0, 24.0);
                p.base_opacity = rng.range(0.7, 1.0);
                p.sway_amplitude = rng.range(0.02, 0.06);
            }
            Variant::Star => {
                // Stars hold a fixed position and twinkle in place
                p.position = Vec2::new(
                    rng.range(0.0, viewport.width),
                    rng.range(0.0, viewport.height),
                );
                p.velocity = Vec2::ZERO;
                p.rotation = 0.0;
                p.rotation_speed = 0.0;
                p.size = rng.range(1.5, 3.5);
                p.base_opacity = rng.range(0.4, 1.0);
                p.sway_amplitude = 0.0;
            }
        }
        p.opacity = p.base_opacity;
        Some(p)
    }

    /// Release every live particle whose position has left the viewport by
    /// more than `margin`. Returns the number retired.
    pub fn retire_offscreen(&mut self, viewport: Viewport, margin: f32) -> usize {
        let mut retired = 0;
        let mut i = 0;
        while i < self.alive_count {
            let keep = self.particles[i].alive
                && viewport.contains_with_margin(self.particles[i].position, margin);
            if keep {
                i += 1;
            } else {
                self.particles[i].alive = false;
                self.alive_count -= 1;
                retired += 1;
                if i < self.alive_count {
                    self.particles.swap(i, self.alive_count);
                }
                // Don't advance i — the swapped-in particle needs checking
            }
        }
        retired
    }

    /// Release all live particles back to the pool
    pub fn release_all(&mut self) {
        for p in &mut self.particles[..self.alive_count] {
            p.alive = false;
        }
        self.alive_count = 0;
    }

    pub fn alive_slice(&self) -> &[Particle] {
        &self.particles[..self.alive_count]
    }

    pub fn alive_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.alive_count]
    }
}
