//! Obstacle field
//!
//! Pillars scroll right-to-left at a constant speed. New pillars are spawned
//! by distance rather than by timer, so the on-screen spacing does not depend
//! on frame rate.

use rand::Rng;

use super::collision::{Collision, pillar_collision, world_bounds_collision};
use crate::Rect;
use crate::consts::*;

/// A pillar with a passable gap
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Left edge of the rendered pillar
    pub x: f32,
    /// Vertical center of the gap
    pub gap_center_y: i32,
    /// Height of the gap
    pub gap_size: i32,
    /// Already counted toward the score
    pub scored: bool,
}

impl Obstacle {
    /// Create an obstacle, clamping the gap into the allowed difficulty band
    pub fn new(x: f32, gap_center_y: i32, gap_size: i32) -> Self {
        let max_center = SCREEN_HEIGHT as i32 - GAP_MARGIN;
        Self {
            x,
            gap_center_y: gap_center_y.clamp(GAP_MARGIN, max_center),
            gap_size: gap_size.clamp(GAP_SIZE_MIN, GAP_SIZE_MAX),
            scored: false,
        }
    }

    /// Create an obstacle with a uniformly random gap
    pub fn random<R: Rng>(x: f32, rng: &mut R) -> Self {
        let gap_size = rng.random_range(GAP_SIZE_MIN..=GAP_SIZE_MAX);
        let gap_center_y = rng.random_range(GAP_MARGIN..=SCREEN_HEIGHT as i32 - GAP_MARGIN);
        Self::new(x, gap_center_y, gap_size)
    }

    /// Top edge of the gap
    #[inline]
    pub fn gap_top(&self) -> f32 {
        (self.gap_center_y - self.gap_size / 2) as f32
    }

    /// Bottom edge of the gap
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        (self.gap_center_y + self.gap_size / 2) as f32
    }

    /// Right edge of the rendered pillar
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + OBSTACLE_WIDTH
    }

    /// Solid `(top, bottom)` regions used for collisions.
    ///
    /// Each is narrower than the rendered pillar by `inset` on both sides.
    pub fn hitboxes(&self, inset: f32) -> (Rect, Rect) {
        let width = (OBSTACLE_WIDTH - 2.0 * inset).max(2.0);
        let left = self.x + inset;
        let top = Rect::new(left, 0.0, width, self.gap_top());
        let bottom = Rect::new(
            left,
            self.gap_bottom(),
            width,
            SCREEN_HEIGHT - self.gap_bottom(),
        );
        (top, bottom)
    }

    /// Full rendered `(top, bottom)` sections
    pub fn visual_rects(&self) -> (Rect, Rect) {
        let top = Rect::new(self.x, 0.0, OBSTACLE_WIDTH, self.gap_top().max(0.0));
        let bottom_y = self.gap_bottom().min(SCREEN_HEIGHT);
        let bottom = Rect::new(self.x, bottom_y, OBSTACLE_WIDTH, SCREEN_HEIGHT - bottom_y);
        (top, bottom)
    }
}

/// Draw the next spacing from `[base - jitter, base + jitter]`
pub fn sample_spacing<R: Rng>(base: f32, rng: &mut R) -> f32 {
    base + rng.random_range(-SPACING_JITTER..=SPACING_JITTER)
}

/// The live obstacles, oldest (leftmost) first
#[derive(Debug, Clone)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    /// Collision fairness inset
    pub hitbox_inset: f32,
    /// Base spacing that jitter is applied around
    pub base_spacing: f32,
}

impl ObstacleField {
    pub fn new(hitbox_inset: f32, base_spacing: f32) -> Self {
        Self {
            obstacles: Vec::new(),
            hitbox_inset,
            base_spacing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Most recently spawned obstacle
    pub fn last(&self) -> Option<&Obstacle> {
        self.obstacles.last()
    }

    /// Spawn one obstacle at the spawn point.
    ///
    /// Suppressed while the previous obstacle is still within the edge guard
    /// of the spawn point. Returns whether an obstacle was added.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.spawn_at(SPAWN_OFFSET_X, rng)
    }

    fn spawn_at<R: Rng>(&mut self, x: f32, rng: &mut R) -> bool {
        if let Some(last) = self.obstacles.last() {
            if x - last.x < SPAWN_EDGE_GUARD {
                return false;
            }
        }
        self.obstacles.push(Obstacle::random(x, rng));
        true
    }

    /// Spawn the next obstacle once the last one has moved `next_spacing`
    /// left of the spawn point. The new obstacle is placed exactly
    /// `next_spacing` behind the last one, and `next_spacing` is resampled.
    pub fn maybe_spawn_by_distance<R: Rng>(&mut self, next_spacing: &mut f32, rng: &mut R) -> bool {
        let spawned = match self.obstacles.last() {
            None => self.spawn(rng),
            Some(last) => {
                let travelled = SPAWN_OFFSET_X - last.x;
                if travelled >= *next_spacing {
                    let x = last.x + *next_spacing;
                    self.spawn_at(x, rng)
                } else {
                    false
                }
            }
        };
        if spawned {
            *next_spacing = sample_spacing(self.base_spacing, rng);
        }
        spawned
    }

    /// Scroll every obstacle left and cull the ones fully past the left edge
    pub fn update(&mut self, dt: f32) {
        for ob in &mut self.obstacles {
            ob.x -= SCROLL_SPEED * dt;
        }
        self.obstacles.retain(|ob| ob.trailing_edge() > -CULL_MARGIN);
    }

    /// Check the player box against every pillar and the world bounds
    pub fn check_collision(&self, player: &Rect) -> Collision {
        for ob in &self.obstacles {
            let hit = pillar_collision(player, &ob.hitboxes(self.hitbox_inset));
            if !hit.is_alive() {
                return hit;
            }
        }
        world_bounds_collision(player)
    }

    /// Mark obstacles whose trailing edge has passed `player_left`.
    ///
    /// Returns how many obstacles were scored this call; each obstacle is
    /// counted at most once over its lifetime.
    pub fn score_passed(&mut self, player_left: f32) -> u32 {
        let mut passed = 0;
        for ob in &mut self.obstacles {
            if !ob.scored && ob.trailing_edge() < player_left {
                ob.scored = true;
                passed += 1;
            }
        }
        passed
    }
}
