//! Elapsed-time debounce driven by per-tick deltas.
//!
//! Shared by the incident cooldown (3 s), the route refresh (1 s) and the
//! drop-off cooldown (5 s). Time only advances through [ElapsedDebounce::advance],
//! so tests drive it with whatever deltas they like.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElapsedDebounce {
    window_secs: f32,
    active: bool,
    elapsed_secs: f32,
}

impl ElapsedDebounce {
    pub fn new(window_secs: f32) -> Self {
        Self {
            window_secs,
            active: false,
            elapsed_secs: 0.0,
        }
    }

    pub fn window_secs(&self) -> f32 {
        self.window_secs
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    /// Start (or restart) the window from zero.
    pub fn arm(&mut self) {
        self.active = true;
        self.elapsed_secs = 0.0;
    }

    /// Accumulate `delta_secs`. Returns `true` on the tick the window closes;
    /// the debounce is inactive again afterwards.
    pub fn advance(&mut self, delta_secs: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed_secs += delta_secs.max(0.0);
        if self.elapsed_secs >= self.window_secs {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.elapsed_secs = 0.0;
    }
}
