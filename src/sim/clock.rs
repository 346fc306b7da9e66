//! Frame clock
//!
//! Turns platform timestamps into a clamped per-frame delta so a long stall
//! (backgrounded tab, debugger) can't be simulated as one giant step.

use crate::consts::DT_MAX;

/// Produces clamped frame deltas from monotonic timestamps (seconds)
#[derive(Debug, Clone)]
pub struct Clock {
    last: Option<f64>,
    dt_max: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DT_MAX)
    }
}

impl Clock {
    pub fn new(dt_max: f32) -> Self {
        Self { last: None, dt_max }
    }

    /// Elapsed time since the previous call, clamped to `[0, dt_max]`.
    /// The first call returns 0.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.dt_max)
    }
}
