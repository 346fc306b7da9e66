//! Data-driven game balance
//!
//! Parameters that are expected to be tweaked between releases live here
//! rather than in `consts`. Every field has a default, so a partial JSON
//! document only overrides what it names.

use serde::{Deserialize, Serialize};

/// Tunable gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Score increment until the next human check (inclusive range)
    pub challenge_increment_min: u32,
    pub challenge_increment_max: u32,
    /// Seconds allowed to type the code
    pub challenge_time_limit: f64,
    /// Wrong full-length attempts before the check fails
    pub max_strikes: u32,
    /// Minimum seconds between accepted code characters
    pub min_char_interval: f64,
    /// Flap rate limit
    pub max_flaps_per_sec: f64,
    /// Pixels trimmed from each side of a pillar for collisions
    pub hitbox_inset_x: f32,
    /// Left-edge to left-edge distance between consecutive obstacles
    pub base_spacing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            challenge_increment_min: 25,
            challenge_increment_max: 45,
            challenge_time_limit: 15.0,
            max_strikes: 3,
            min_char_interval: 0.12,
            max_flaps_per_sec: 12.0,
            hitbox_inset_x: 8.0,
            base_spacing: 210.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document; the result is sanitized
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Repair values that would break gameplay invariants
    pub fn sanitized(mut self) -> Self {
        let defaults = Tuning::default();

        self.challenge_increment_min = self.challenge_increment_min.max(1);
        if self.challenge_increment_max < self.challenge_increment_min {
            log::warn!(
                "challenge increment range {}..={} is inverted, swapping",
                self.challenge_increment_min,
                self.challenge_increment_max
            );
            std::mem::swap(
                &mut self.challenge_increment_min,
                &mut self.challenge_increment_max,
            );
        }

        if !(self.challenge_time_limit.is_finite() && self.challenge_time_limit > 0.0) {
            self.challenge_time_limit = defaults.challenge_time_limit;
        }
        self.max_strikes = self.max_strikes.max(1);
        if !(self.min_char_interval.is_finite() && self.min_char_interval >= 0.0) {
            self.min_char_interval = defaults.min_char_interval;
        }
        if !(self.max_flaps_per_sec.is_finite() && self.max_flaps_per_sec > 0.0) {
            self.max_flaps_per_sec = defaults.max_flaps_per_sec;
        }

        // Hitbox must keep at least 2px of width out of a 60px pillar
        let max_inset = (crate::consts::OBSTACLE_WIDTH - 2.0) / 2.0;
        self.hitbox_inset_x = if self.hitbox_inset_x.is_finite() {
            self.hitbox_inset_x.clamp(0.0, max_inset)
        } else {
            defaults.hitbox_inset_x
        };

        // Jittered spacing must always clear the spawn edge guard
        let min_spacing = crate::consts::SPAWN_EDGE_GUARD + crate::consts::SPACING_JITTER;
        self.base_spacing = if self.base_spacing.is_finite() {
            self.base_spacing.max(min_spacing)
        } else {
            defaults.base_spacing
        };

        self
    }

    /// Minimum seconds between accepted flaps
    pub fn min_flap_interval(&self) -> f64 {
        1.0 / self.max_flaps_per_sec
    }
}
