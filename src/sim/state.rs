//! Game state and core simulation types
//!
//! Everything a round needs lives in one explicit session object. The frame
//! driver owns it and passes it into `tick`; nothing is held in statics.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::challenge::ChallengeEngine;
use super::obstacles::{ObstacleField, sample_spacing};
use super::physics::PhysicsBody;
use crate::audio::SoundEffect;
use crate::notify::Notification;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first confirm
    #[default]
    Start,
    /// Between rounds or after a passed check, waiting for confirm
    Ready,
    /// Active flight
    Play,
    /// Human check overlay; the world is frozen
    Challenge,
    /// Run ended
    GameOver,
}

impl GamePhase {
    /// Phases where the idle bob animation drives the player
    pub fn is_idle(self) -> bool {
        matches!(self, GamePhase::Start | GamePhase::Ready)
    }
}

/// Score-keeping and phase data for one process lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub phase: GamePhase,
    /// Obstacles passed this round
    pub score: u32,
    /// Best score seen by this process (never decreases)
    pub high_score: u32,
    /// Score at which the next human check starts
    pub next_challenge_threshold: u32,
    pub spawning_enabled: bool,
    /// Left-edge distance between the last obstacle and the next one
    pub next_spawn_spacing: f32,
}

/// Side effects requested by the simulation.
///
/// The sim never talks to collaborators directly; the frame driver drains
/// these after each tick and forwards them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Play a one-shot sound effect
    Sound(SoundEffect),
    /// Send a message to the embedding page
    Notify(Notification),
    /// A user gesture happened; background music may start
    StartMusic,
    /// Mute was toggled (new value)
    MuteChanged(bool),
    /// Show or hide the platform text input anchored to the code box
    SoftKeyboard(bool),
    /// Escape or window close
    Quit,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub session: GameSession,
    pub field: ObstacleField,
    pub body: PhysicsBody,
    pub challenge: ChallengeEngine,
    /// RUN_START already sent for this round
    pub run_started: bool,
    /// SCORE already sent for this round
    pub score_sent: bool,
    /// Game over sound already played for this round
    pub played_gameover_sound: bool,
    /// Whether the window currently has input focus
    pub has_focus: bool,
    pub muted: bool,
    /// Timestamp the current game over began
    pub gameover_at: Option<f64>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_challenge_threshold = next_challenge_increment(&tuning, &mut rng);
        let next_spawn_spacing = sample_spacing(tuning.base_spacing, &mut rng);

        Self {
            seed,
            session: GameSession {
                phase: GamePhase::Start,
                score: 0,
                high_score: 0,
                next_challenge_threshold,
                spawning_enabled: false,
                next_spawn_spacing,
            },
            field: ObstacleField::new(tuning.hitbox_inset_x, tuning.base_spacing),
            body: PhysicsBody::new(tuning.min_flap_interval()),
            challenge: ChallengeEngine::new(&tuning),
            rng,
            tuning,
            run_started: false,
            score_sent: false,
            played_gameover_sound: false,
            has_focus: true,
            muted: false,
            gameover_at: None,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.session.score
    }

    /// Play is suspended while the window is unfocused
    pub fn paused_for_focus(&self) -> bool {
        self.session.phase == GamePhase::Play && !self.has_focus
    }

    /// Begin a new round: everything except the high score, mute flag and
    /// focus is cleared, and the phase returns to `Ready`.
    pub fn reset(&mut self) {
        self.session.score = 0;
        self.field.clear();
        if self.challenge.is_active() {
            self.push_event(GameEvent::SoftKeyboard(false));
        }
        self.challenge.clear();
        self.session.spawning_enabled = false;
        self.session.next_challenge_threshold =
            next_challenge_increment(&self.tuning, &mut self.rng);
        self.session.next_spawn_spacing = sample_spacing(self.tuning.base_spacing, &mut self.rng);
        self.body.reset();
        self.run_started = false;
        self.score_sent = false;
        self.played_gameover_sound = false;
        self.gameover_at = None;
        self.session.phase = GamePhase::Ready;
        log::debug!(
            "Round reset, next check at {}",
            self.session.next_challenge_threshold
        );
    }

    /// Start flying from wherever the idle animation left the player
    pub fn enter_play(&mut self, now: f64) {
        self.body.bob(now);
        self.session.phase = GamePhase::Play;
        self.session.spawning_enabled = true;
        self.session.next_spawn_spacing = sample_spacing(self.tuning.base_spacing, &mut self.rng);
        log::info!("Round started (score {})", self.session.score);
    }

    /// Fold in a best score reported by the host page
    pub fn offer_best_score(&mut self, best: u32) {
        if best > self.session.high_score {
            log::debug!("High score synced from host: {}", best);
            self.session.high_score = best;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Score gap until the next human check
pub fn next_challenge_increment<R: Rng>(tuning: &Tuning, rng: &mut R) -> u32 {
    rng.random_range(tuning.challenge_increment_min..=tuning.challenge_increment_max)
}
