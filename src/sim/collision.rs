//! Collision rules
//!
//! The player is an axis-aligned box; pillars are pairs of boxes. A run ends
//! when the player box overlaps a pillar hitbox or leaves the world.

use crate::Rect;
use crate::consts::{CULL_MARGIN, SCREEN_HEIGHT};

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Nothing hit
    Clear,
    /// Overlapped the top or bottom part of a pillar
    Obstacle,
    /// Flew too far above the screen
    Ceiling,
    /// Touched the bottom of the screen
    Floor,
}

impl Collision {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Collision::Clear)
    }
}

/// Check the player against the vertical world bounds.
///
/// The ceiling allows the player to poke `CULL_MARGIN` above the screen;
/// the bottom edge of the screen is a hard floor.
pub fn world_bounds_collision(player: &Rect) -> Collision {
    if player.top() <= -CULL_MARGIN {
        Collision::Ceiling
    } else if player.bottom() >= SCREEN_HEIGHT {
        Collision::Floor
    } else {
        Collision::Clear
    }
}

/// Check the player against one pillar's `(top, bottom)` hitboxes
pub fn pillar_collision(player: &Rect, hitboxes: &(Rect, Rect)) -> Collision {
    if player.intersects(&hitboxes.0) || player.intersects(&hitboxes.1) {
        Collision::Obstacle
    } else {
        Collision::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(y: f32) -> Rect {
        Rect::new(82.5, y, 35.0, 25.0)
    }

    #[test]
    fn test_world_bounds() {
        assert_eq!(world_bounds_collision(&player_at(300.0)), Collision::Clear);
        // Slightly above the screen is tolerated
        assert_eq!(world_bounds_collision(&player_at(-20.0)), Collision::Clear);
        assert_eq!(world_bounds_collision(&player_at(-50.0)), Collision::Ceiling);
        // Bottom edge exactly at the screen bottom is a hit
        assert_eq!(world_bounds_collision(&player_at(575.0)), Collision::Floor);
        assert_eq!(world_bounds_collision(&player_at(574.0)), Collision::Clear);
    }

    #[test]
    fn test_pillar_collision() {
        let hitboxes = (
            Rect::new(88.0, 0.0, 44.0, 200.0),
            Rect::new(88.0, 360.0, 44.0, 240.0),
        );
        assert_eq!(pillar_collision(&player_at(250.0), &hitboxes), Collision::Clear);
        assert_eq!(pillar_collision(&player_at(190.0), &hitboxes), Collision::Obstacle);
        assert_eq!(pillar_collision(&player_at(340.0), &hitboxes), Collision::Obstacle);
        // Touching the top hitbox edge is not a hit
        assert_eq!(pillar_collision(&player_at(200.0), &hitboxes), Collision::Clear);
    }
}
