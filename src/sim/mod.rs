//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in from the caller (`now`, `dt`)
//! - Seeded RNG only
//! - No rendering or platform dependencies; side effects are `GameEvent`s

pub mod autopilot;
pub mod challenge;
pub mod clock;
pub mod collision;
pub mod keyboard;
pub mod obstacles;
pub mod physics;
pub mod state;
pub mod tick;

pub use challenge::{
    CODE_ALPHABET, Challenge, ChallengeCode, ChallengeEngine, ChallengeStatus, FailReason,
    GlyphTransform, is_code_char,
};
pub use clock::Clock;
pub use collision::Collision;
pub use keyboard::{KeyboardMode, SoftKey, SoftKeyKind};
pub use obstacles::{Obstacle, ObstacleField};
pub use physics::{PhysicsBody, PlayerState};
pub use state::{GameEvent, GamePhase, GameSession, GameState};
pub use tick::{GameOverCause, TickInput, tick};
