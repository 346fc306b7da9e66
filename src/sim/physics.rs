//! Player body: vertical integration and rate-limited flaps

use glam::Vec2;

use crate::Rect;
use crate::consts::*;

/// Vertical state of the player character
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Hitbox center y (precise)
    pub y: f32,
    /// Vertical velocity (pixels/s, positive = down)
    pub velocity_y: f32,
    /// Timestamp of the last accepted flap
    pub last_flap_at: Option<f64>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            y: SCREEN_HEIGHT / 2.0,
            velocity_y: 0.0,
            last_flap_at: None,
        }
    }
}

/// Integrates the player body and enforces the flap rate limit
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub player: PlayerState,
    pub gravity: f32,
    pub flap_velocity: f32,
    /// Minimum seconds between accepted flaps
    pub min_flap_interval: f64,
}

impl PhysicsBody {
    pub fn new(min_flap_interval: f64) -> Self {
        Self {
            player: PlayerState::default(),
            gravity: GRAVITY,
            flap_velocity: FLAP_VELOCITY,
            min_flap_interval,
        }
    }

    /// Back to the round-start state
    pub fn reset(&mut self) {
        self.player = PlayerState::default();
    }

    /// Semi-implicit Euler step: velocity first, then position
    pub fn integrate(&mut self, dt: f32) {
        self.player.velocity_y += self.gravity * dt;
        self.player.y += self.player.velocity_y * dt;
    }

    /// Apply the flap impulse unless the previous accepted flap was less than
    /// `min_flap_interval` ago. Returns whether the flap was accepted.
    pub fn flap(&mut self, now: f64) -> bool {
        if let Some(last) = self.player.last_flap_at {
            if now - last < self.min_flap_interval {
                return false;
            }
        }
        self.player.velocity_y = self.flap_velocity;
        self.player.last_flap_at = Some(now);
        true
    }

    /// Stop vertical motion (after a passed human check)
    pub fn halt(&mut self) {
        self.player.velocity_y = 0.0;
    }

    /// Idle animation on the start/ready screens
    pub fn bob(&mut self, now: f64) {
        let phase = (now as f32 * BOB_SPEED).sin();
        self.player.y = SCREEN_HEIGHT * BOB_CENTER_FRAC + BOB_AMPLITUDE * phase;
    }

    /// Collision box
    pub fn hitbox(&self) -> Rect {
        Rect::from_center(
            Vec2::new(PLAYER_X, self.player.y),
            Vec2::new(PLAYER_HITBOX_W, PLAYER_HITBOX_H),
        )
    }

    /// Sprite rotation in degrees (counter-clockwise positive).
    /// Rising tilts the nose up, falling tilts it down; purely cosmetic.
    pub fn tilt_degrees(&self) -> f32 {
        -self.player.velocity_y * PLAYER_TILT_FACTOR
    }
}
