//! Human check mini-game
//!
//! Every so often the run pauses and the player must type a short random
//! code. Input is rate-limited per character regardless of source, wrong
//! full-length entries count as strikes, and the check expires after a time
//! limit.
//!
//! State machine: `inactive -> typing -> {passed | failed}`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::keyboard::{self, KeyboardMode, SoftKeyKind};
use crate::consts::CODE_LEN;
use crate::tuning::Tuning;

/// Characters codes are drawn from: digits 2-9 and A-Z without I and O
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Largest rotation applied to a code glyph (degrees, either direction)
pub const GLYPH_MAX_ROTATION: f32 = 6.0;
/// Largest horizontal jitter applied to a code glyph (pixels, either direction)
pub const GLYPH_MAX_JITTER: i32 = 1;

/// Whether `c` may appear in a code (case-sensitive, uppercase only)
pub fn is_code_char(c: char) -> bool {
    c.is_ascii() && CODE_ALPHABET.contains(&(c as u8))
}

/// A validated challenge code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCode(String);

impl ChallengeCode {
    /// Sample each character uniformly from `CODE_ALPHABET`
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Accept a code of the right length and alphabet (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.to_ascii_uppercase();
        let valid = upper.chars().count() == CODE_LEN && upper.chars().all(is_code_char);
        valid.then_some(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable 64-bit seed derived from the code text (FNV-1a)
    fn seed(&self) -> u64 {
        self.0.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, b| {
            (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }

    /// Per-glyph distortion. Deterministic for a given code so the same code
    /// always renders identically.
    pub fn glyph_transforms(&self) -> Vec<GlyphTransform> {
        let mut rng = Pcg32::seed_from_u64(self.seed());
        self.0
            .chars()
            .map(|ch| GlyphTransform {
                ch,
                rotation_deg: rng.random_range(-GLYPH_MAX_ROTATION..=GLYPH_MAX_ROTATION),
                offset_x: rng.random_range(-GLYPH_MAX_JITTER..=GLYPH_MAX_JITTER),
            })
            .collect()
    }
}

impl std::fmt::Display for ChallengeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to draw one glyph of the code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphTransform {
    pub ch: char,
    pub rotation_deg: f32,
    pub offset_x: i32,
}

/// Why a check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    Strikes,
    Timeout,
}

/// Outcome of evaluating the check for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStatus {
    /// No check running
    Inactive,
    /// Waiting for input
    Typing,
    Passed,
    Failed(FailReason),
}

/// One running check
#[derive(Debug, Clone, Default)]
pub struct Challenge {
    pub code: Option<ChallengeCode>,
    typed: String,
    /// Absolute timestamp the check expires at
    pub deadline: f64,
    pub active: bool,
    pub strikes: u32,
    pub time_limit: f64,
}

impl Challenge {
    /// Characters entered so far (never longer than `CODE_LEN`)
    pub fn typed(&self) -> &str {
        &self.typed
    }
}

/// What a pointer tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapResult {
    /// Not on the keyboard
    Missed,
    /// Landed on a key (which may have been inert or rate-limited)
    Consumed,
}

/// Runs the human check
#[derive(Debug, Clone)]
pub struct ChallengeEngine {
    pub challenge: Challenge,
    pub keyboard_mode: KeyboardMode,
    last_char_at: Option<f64>,
    pub min_char_interval: f64,
    pub max_strikes: u32,
}

impl ChallengeEngine {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            challenge: Challenge {
                time_limit: tuning.challenge_time_limit,
                ..Default::default()
            },
            keyboard_mode: KeyboardMode::Letters,
            last_char_at: None,
            min_char_interval: tuning.min_char_interval,
            max_strikes: tuning.max_strikes,
        }
    }

    pub fn is_active(&self) -> bool {
        self.challenge.active
    }

    /// Begin a fresh check with a new code
    pub fn start<R: Rng>(&mut self, now: f64, rng: &mut R) {
        let code = ChallengeCode::generate(rng);
        log::info!("Human check started ({}s)", self.challenge.time_limit);
        self.challenge.code = Some(code);
        self.challenge.typed.clear();
        self.challenge.strikes = 0;
        self.challenge.deadline = now + self.challenge.time_limit;
        self.challenge.active = true;
        self.keyboard_mode = KeyboardMode::Letters;
    }

    /// Drop any running check
    pub fn clear(&mut self) {
        self.challenge.code = None;
        self.challenge.typed.clear();
        self.challenge.deadline = 0.0;
        self.challenge.strikes = 0;
        self.challenge.active = false;
    }

    /// Try to append a character. Lowercase is normalized; anything outside
    /// the code alphabet, a full buffer, or a too-fast entry is ignored.
    pub fn push_char(&mut self, c: char, now: f64) -> bool {
        if !self.challenge.active {
            return false;
        }
        let c = c.to_ascii_uppercase();
        if !is_code_char(c) || self.challenge.typed.len() >= CODE_LEN {
            log::debug!("Rejected code character {:?}", c);
            return false;
        }
        if let Some(last) = self.last_char_at {
            if now - last < self.min_char_interval {
                log::debug!("Rejected code character {:?} (too fast)", c);
                return false;
            }
        }
        self.challenge.typed.push(c);
        self.last_char_at = Some(now);
        true
    }

    /// Erase the last typed character
    pub fn backspace(&mut self) -> bool {
        self.challenge.active && self.challenge.typed.pop().is_some()
    }

    /// Handle a tap on the on-screen keyboard
    pub fn tap(&mut self, pos: Vec2, now: f64) -> TapResult {
        let keys = keyboard::layout(self.keyboard_mode);
        let Some(key) = keyboard::hit_test(&keys, pos) else {
            return TapResult::Missed;
        };
        match key.kind {
            SoftKeyKind::Toggle => self.keyboard_mode = self.keyboard_mode.toggled(),
            SoftKeyKind::Backspace => {
                self.backspace();
            }
            SoftKeyKind::Char(c) if key.enabled => {
                self.push_char(c, now);
            }
            SoftKeyKind::Char(_) | SoftKeyKind::Spacer => {}
        }
        TapResult::Consumed
    }

    /// Advance the check by one frame.
    ///
    /// A full wrong entry becomes a strike and clears the buffer. A matching
    /// entry passes even if the deadline has also elapsed this frame; only
    /// then are strikes and the deadline checked.
    pub fn evaluate(&mut self, now: f64) -> ChallengeStatus {
        if !self.challenge.active {
            return ChallengeStatus::Inactive;
        }
        let Some(code) = self.challenge.code.as_ref() else {
            return ChallengeStatus::Inactive;
        };

        let typed = &self.challenge.typed;
        if typed.len() == CODE_LEN && typed != code.as_str() {
            self.challenge.strikes += 1;
            self.challenge.typed.clear();
            log::info!(
                "Human check strike {}/{}",
                self.challenge.strikes,
                self.max_strikes
            );
        }

        if self.challenge.typed == code.as_str() {
            self.clear();
            return ChallengeStatus::Passed;
        }

        if self.challenge.strikes >= self.max_strikes {
            self.challenge.active = false;
            return ChallengeStatus::Failed(FailReason::Strikes);
        }
        if now > self.challenge.deadline {
            self.challenge.active = false;
            return ChallengeStatus::Failed(FailReason::Timeout);
        }
        ChallengeStatus::Typing
    }

    /// Seconds left before the deadline (never negative)
    pub fn remaining(&self, now: f64) -> f64 {
        if self.challenge.active {
            (self.challenge.deadline - now).max(0.0)
        } else {
            0.0
        }
    }
}
