//! Flappy Bara - a one-button arcade flyer with a periodic human check
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, human check, phases)
//! - `render`: Drawing surface abstraction and scene composition
//! - `audio`: Sound effect / music capability
//! - `notify`: Outbound run/score messages for embedding pages
//! - `tuning`: Data-driven game balance
//! - `settings`: Persisted player preferences

pub mod assets;
pub mod audio;
pub mod game;
pub mod input;
pub mod notify;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{FrameOutcome, Game};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Shown on the start screen
    pub const GAME_VERSION: &str = "v0.2.6";

    /// Logical screen size (all gameplay geometry is in these units)
    pub const SCREEN_WIDTH: f32 = 400.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Target frame rate of the outer loop
    pub const TARGET_FPS: u32 = 60;
    /// Largest delta time a single frame may simulate (tab backgrounding etc.)
    pub const DT_MAX: f32 = 0.10;

    /// Downward acceleration (pixels/s²), ~0.5 px per frame² at 60 FPS
    pub const GRAVITY: f32 = 1800.0;
    /// Velocity set by a flap (pixels/s, negative = up)
    pub const FLAP_VELOCITY: f32 = -600.0;

    /// Player column (hitbox center x)
    pub const PLAYER_X: f32 = 100.0;
    /// Hitbox is smaller than the sprite
    pub const PLAYER_HITBOX_W: f32 = 35.0;
    pub const PLAYER_HITBOX_H: f32 = 25.0;
    pub const PLAYER_SPRITE_W: f32 = 60.0;
    pub const PLAYER_SPRITE_H: f32 = 45.0;
    /// Degrees of tilt per px/s of vertical velocity
    pub const PLAYER_TILT_FACTOR: f32 = 0.05;

    /// Idle bob on start/ready screens
    pub const BOB_CENTER_FRAC: f32 = 0.55;
    pub const BOB_AMPLITUDE: f32 = 8.0;
    /// Radians per second (0.005 per ms)
    pub const BOB_SPEED: f32 = 5.0;

    /// Rendered pillar width
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    /// World scroll speed (pixels/s)
    pub const SCROLL_SPEED: f32 = 150.0;
    /// New obstacles appear this far right of the origin (off-screen)
    pub const SPAWN_OFFSET_X: f32 = SCREEN_WIDTH + 60.0;
    /// Spacing is resampled in [base - jitter, base + jitter] after each spawn
    pub const SPACING_JITTER: f32 = 15.0;
    /// Minimum distance from the spawn point the last obstacle must have moved
    pub const SPAWN_EDGE_GUARD: f32 = 40.0;
    /// Gap size range (inclusive)
    pub const GAP_SIZE_MIN: i32 = 150;
    pub const GAP_SIZE_MAX: i32 = 180;
    /// Gap center stays within [margin, height - margin]
    pub const GAP_MARGIN: i32 = 100;
    /// Obstacles are culled this far past the left edge; also the ceiling tolerance
    pub const CULL_MARGIN: f32 = 50.0;

    /// Human check code length
    pub const CODE_LEN: usize = 4;
    /// Seconds before a game over can be dismissed
    pub const GAMEOVER_COOLDOWN: f64 = 1.0;

    /// Mute button (top-right corner)
    pub const MUTE_BUTTON_SIZE: f32 = 36.0;
    pub const MUTE_BUTTON_MARGIN: f32 = 10.0;

    /// Code entry box in the challenge overlay
    pub const CODE_BOX_W: f32 = 260.0;
    pub const CODE_BOX_H: f32 = 80.0;
}

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of the given size centered on a point
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Empty rectangles never contain or overlap anything
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Point containment, inclusive of the top/left edge and exclusive of the
    /// bottom/right edge so adjacent rectangles never both claim a point
    pub fn contains(&self, p: Vec2) -> bool {
        !self.is_empty()
            && p.x >= self.left()
            && p.x < self.right()
            && p.y >= self.top()
            && p.y < self.bottom()
    }

    /// Strict overlap test (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Shrink (negative) or grow (positive) on every side
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self {
            pos: self.pos - Vec2::new(dx, dy),
            size: self.size + Vec2::new(dx, dy) * 2.0,
        }
    }
}

/// Mute button hit region
pub fn mute_button_rect() -> Rect {
    use consts::*;
    Rect::new(
        SCREEN_WIDTH - MUTE_BUTTON_SIZE - MUTE_BUTTON_MARGIN,
        MUTE_BUTTON_MARGIN,
        MUTE_BUTTON_SIZE,
        MUTE_BUTTON_SIZE,
    )
}

/// Code entry box, centered on screen
pub fn code_box_rect() -> Rect {
    use consts::*;
    Rect::from_center(
        Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),
        Vec2::new(CODE_BOX_W, CODE_BOX_H),
    )
}
