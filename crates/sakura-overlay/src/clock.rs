//! Frame clock for animation-frame deltas

use instant::Instant;

/// Maximum delta handed to the simulation, so a backgrounded tab does not
/// produce one giant catch-up step on resume.
const MAX_DELTA_MS: f32 = 250.0;

/// Tracks elapsed time between animation-frame callbacks in milliseconds.
pub struct FrameClock {
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock. Call once per animation frame; returns the clamped
    /// elapsed time in milliseconds. The first tick reports zero.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            return 0.0;
        }
        let elapsed_ms = now.duration_since(self.last_instant).as_secs_f32() * 1000.0;
        self.last_instant = now;
        elapsed_ms.min(MAX_DELTA_MS)
    }

    /// Forget accumulated time, e.g. when resuming from a paused state, so
    /// the next tick reports zero instead of the pause duration.
    pub fn reset(&mut self) {
        self.first_tick = true;
    }
}
