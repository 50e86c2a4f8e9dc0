//! Per-tick simulation step
//!
//! Advances every live particle by the elapsed time, applies the sinusoidal
//! wind, retires particles that leave the viewport by the retirement margin,
//! and ramps the population toward the effective targets probabilistically.

use crate::particle::{ParticlePool, Variant};
use crate::quality::VariantTargets;
use crate::rand::ParticleRng;
use sakura_core::{lerp_f32, Viewport};

/// Retirement margin in logical pixels: a particle must leave the viewport
/// by this much before it is released, so exits never pop visibly.
pub const RETIRE_MARGIN: f32 = 60.0;

/// Spatial frequency of the wind term (radians per logical pixel of height)
pub const WIND_FREQ: f32 = 0.008;

/// Star twinkle frequency (radians per millisecond)
pub const STAR_TWINKLE_FREQ: f32 = 0.002;

/// Per-missing-slot spawn probability per millisecond. At 60 Hz the
/// population deficit decays with a time constant of roughly a third of a
/// second, so steady state is reached well within a few seconds.
pub const SPAWN_RATE_PER_MS: f32 = 0.003;

/// Margin inside which wandering butterflies turn back toward the interior
const BUTTERFLY_TURN_MARGIN: f32 = 10.0;

/// Opacity lost per millisecond by a fading particle; a fully opaque one is
/// gone in half a second
const FADE_RATE_PER_MS: f32 = 0.002;

/// The simulation step. Owns the RNG used for spawn randomization; all
/// other state lives in the pool it is handed each tick.
pub struct Simulation {
    rng: ParticleRng,
}

impl Simulation {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: ParticleRng::new(seed),
        }
    }

    /// Advance the simulation by `dt_ms` of wall time.
    ///
    /// `time_scale` is the clamped `speed` config value. A call with
    /// `dt_ms <= 0` is a strict no-op: nothing moves, nothing is retired,
    /// nothing spawns.
    pub fn step(
        &mut self,
        pool: &mut ParticlePool,
        targets: VariantTargets,
        viewport: Viewport,
        dt_ms: f32,
        time_scale: f32,
    ) {
        if !(dt_ms > 0.0) || viewport.is_empty() {
            return;
        }
        let dt = dt_ms * time_scale;

        for p in pool.alive_slice_mut() {
            p.age_ms += dt;
            p.position = p.position + p.velocity * dt;
            p.rotation += p.rotation_speed * dt;

            match p.variant {
                Variant::Petal => {
                    // Lateral wind: deterministic per particle, a function
                    // of vertical position and the baked sway phase
                    p.position.x +=
                        (p.position.y * WIND_FREQ + p.sway_phase).sin() * p.sway_amplitude * dt;
                }
                Variant::Butterfly => {
                    p.position.x +=
                        (p.position.y * WIND_FREQ + p.sway_phase).sin() * p.sway_amplitude * dt;
                    // Turn back toward the interior instead of leaving
                    if p.position.x < BUTTERFLY_TURN_MARGIN && p.velocity.x < 0.0 {
                        p.velocity.x = -p.velocity.x;
                    }
                    if p.position.x > viewport.width - BUTTERFLY_TURN_MARGIN && p.velocity.x > 0.0 {
                        p.velocity.x = -p.velocity.x;
                    }
                    if p.position.y < BUTTERFLY_TURN_MARGIN && p.velocity.y < 0.0 {
                        p.velocity.y = -p.velocity.y;
                    }
                    if p.position.y > viewport.height - BUTTERFLY_TURN_MARGIN && p.velocity.y > 0.0
                    {
                        p.velocity.y = -p.velocity.y;
                    }
                    // Sway can outrun the turn; never let a wanderer leave
                    p.position.x = p.position.x.clamp(0.0, viewport.width);
                    p.position.y = p.position.y.clamp(0.0, viewport.height);
                }
                Variant::Star => {
                    // Twinkle around the spawn opacity; position is static
                    let phase = 0.5 + 0.5 * (p.age_ms * STAR_TWINKLE_FREQ + p.sway_phase).sin();
                    let twinkle = lerp_f32(0.1, 1.0, phase);
                    p.opacity = (p.base_opacity * twinkle).clamp(0.0, 1.0);
                }
            }

            if p.fading {
                p.base_opacity -= FADE_RATE_PER_MS * dt;
                if p.base_opacity <= 0.0 {
                    p.alive = false;
                } else {
                    p.opacity = p.opacity.min(p.base_opacity);
                }
            }
        }

        pool.retire_offscreen(viewport, RETIRE_MARGIN);

        // Stars hold a fixed position and butterflies turn back at the
        // edges, so neither can retire off-screen; an over-target population
        // of those variants fades out instead.
        mark_fading(pool, Variant::Butterfly, targets.butterflies);
        mark_fading(pool, Variant::Star, targets.stars);

        // Ramp toward targets: each missing slot spawns probabilistically so
        // the population fades in over a moment rather than popping in whole.
        let spawn_p = (dt_ms * SPAWN_RATE_PER_MS).min(1.0);
        for (variant, target) in [
            (Variant::Petal, targets.petals),
            (Variant::Butterfly, targets.butterflies),
            (Variant::Star, targets.stars),
        ] {
            let live = pool.count(variant);
            for _ in live..target {
                if self.rng.next_f32() < spawn_p
                    && pool.acquire(variant, viewport, &mut self.rng).is_none()
                {
                    return;
                }
            }
        }
    }

    /// Spawn straight to the targets with no ramp. Used by fire-once render
    /// backends, which hand the host its full particle set at activation.
    pub fn spawn_immediately(
        &mut self,
        pool: &mut ParticlePool,
        targets: VariantTargets,
        viewport: Viewport,
    ) {
        if viewport.is_empty() {
            return;
        }
        for (variant, target) in [
            (Variant::Petal, targets.petals),
            (Variant::Butterfly, targets.butterflies),
            (Variant::Star, targets.stars),
        ] {
            let live = pool.count(variant);
            for _ in live..target {
                if pool.acquire(variant, viewport, &mut self.rng).is_none() {
                    return;
                }
            }
        }
    }
}

/// Reconcile one non-retiring variant against its target: mark the excess
/// as fading, and unmark fading particles the target has room for again.
fn mark_fading(pool: &mut ParticlePool, variant: Variant, target: usize) {
    let live = pool.count(variant);
    let excess = live.saturating_sub(target);
    let mut fading = pool
        .alive_slice()
        .iter()
        .filter(|p| p.variant == variant && p.fading)
        .count();
    if fading == excess {
        return;
    }
    for p in pool.alive_slice_mut() {
        if p.variant != variant {
            continue;
        }
        if fading < excess && !p.fading {
            p.fading = true;
            fading += 1;
        } else if fading > excess && p.fading {
            p.fading = false;
            fading -= 1;
        }
    }
}
