//! Per-frame simulation tick
//!
//! Dispatches the frame's input according to the current phase, then
//! advances whichever subsystem the phase owns. Side effects are queued on
//! the state as `GameEvent`s.

use super::autopilot;
use super::challenge::{ChallengeStatus, FailReason, TapResult};
use super::collision::Collision;
use super::state::{GameEvent, GamePhase, GameState, next_challenge_increment};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::{InputEvent, Key};
use crate::notify::Notification;
use crate::{code_box_rect, mute_button_rect};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Events in arrival order
    pub events: Vec<InputEvent>,
    /// Demo mode - the autopilot plays the game
    pub autopilot: bool,
}

impl TickInput {
    pub fn from_events(events: Vec<InputEvent>) -> Self {
        Self {
            events,
            autopilot: false,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Collision(Collision),
    Challenge(FailReason),
}

/// Advance the game by one frame.
///
/// `now` is the platform timestamp in seconds and drives every rate limit,
/// deadline and cooldown. `dt` is the clamped frame delta used for motion.
pub fn tick(state: &mut GameState, input: &TickInput, now: f64, dt: f32) {
    let autopilot_event = if input.autopilot {
        autopilot::next_input(state, now)
    } else {
        None
    };

    for event in input.events.iter().chain(autopilot_event.iter()) {
        handle_event(state, event, now);
    }

    let phase = state.session.phase;
    if phase.is_idle() {
        state.body.bob(now);
    }
    match phase {
        GamePhase::Play => {
            if !state.paused_for_focus() {
                update_play(state, now, dt);
            }
        }
        GamePhase::Challenge => update_challenge(state, now),
        GamePhase::Start | GamePhase::Ready | GamePhase::GameOver => {}
    }
}

fn handle_event(state: &mut GameState, event: &InputEvent, now: f64) {
    match event {
        InputEvent::PointerDown(pos) if mute_button_rect().contains(*pos) => {
            toggle_mute(state);
            state.push_event(GameEvent::StartMusic);
        }
        InputEvent::KeyDown(key)
            if key.is_char('m') && state.session.phase != GamePhase::Challenge =>
        {
            toggle_mute(state);
        }
        InputEvent::KeyDown(Key::Escape) | InputEvent::CloseRequested => {
            log::info!("Quit requested");
            state.push_event(GameEvent::Quit);
        }
        InputEvent::Focus(focused) => {
            if state.has_focus != *focused {
                state.has_focus = *focused;
                if state.session.phase == GamePhase::Play {
                    if *focused {
                        log::info!("Resumed (focus regained)");
                    } else {
                        log::info!("Paused (focus lost)");
                    }
                }
            }
        }
        InputEvent::KeyDown(key) => handle_key(state, *key, now),
        InputEvent::Text(text) => {
            if state.session.phase == GamePhase::Challenge {
                for c in text.chars() {
                    state.challenge.push_char(c, now);
                }
            }
        }
        InputEvent::PointerDown(pos) => handle_pointer(state, *pos, now),
    }
}

fn handle_key(state: &mut GameState, key: Key, now: f64) {
    match state.session.phase {
        GamePhase::Start | GamePhase::Ready => {
            if key.is_confirm() {
                confirm(state, now);
            }
        }
        GamePhase::Play => {
            if key.is_confirm() && !state.paused_for_focus() {
                flap(state, now);
            }
        }
        GamePhase::Challenge => match key {
            Key::Backspace => {
                state.challenge.backspace();
            }
            Key::Char(c) => {
                state.challenge.push_char(c, now);
            }
            _ => {}
        },
        GamePhase::GameOver => {
            if key.is_char('r') || key == Key::Space {
                retry(state, now);
            }
        }
    }
}

fn handle_pointer(state: &mut GameState, pos: glam::Vec2, now: f64) {
    match state.session.phase {
        GamePhase::Start | GamePhase::Ready => confirm(state, now),
        GamePhase::Play => {
            if !state.paused_for_focus() {
                flap(state, now);
            }
        }
        GamePhase::Challenge => {
            if state.challenge.tap(pos, now) == TapResult::Consumed {
                state.push_event(GameEvent::StartMusic);
            } else if code_box_rect().contains(pos) {
                state.push_event(GameEvent::SoftKeyboard(true));
            }
        }
        GamePhase::GameOver => retry(state, now),
    }
}

fn toggle_mute(state: &mut GameState) {
    state.muted = !state.muted;
    log::info!("Muted: {}", state.muted);
    state.push_event(GameEvent::MuteChanged(state.muted));
}

/// Confirm on the start/ready screens: begin (or resume) flying
fn confirm(state: &mut GameState, now: f64) {
    state.push_event(GameEvent::StartMusic);
    if state.session.phase == GamePhase::Start {
        state.reset();
    }
    if !state.run_started {
        state.run_started = true;
        state.push_event(GameEvent::Notify(Notification::RunStart));
    }
    state.enter_play(now);
}

fn flap(state: &mut GameState, now: f64) {
    state.push_event(GameEvent::StartMusic);
    if !state.body.flap(now) {
        log::debug!("Flap rejected by rate limit");
    }
}

/// Leave the game over screen once the cooldown has elapsed
fn retry(state: &mut GameState, now: f64) {
    let cooled_down = state
        .gameover_at
        .is_none_or(|at| now - at > GAMEOVER_COOLDOWN);
    if cooled_down {
        state.reset();
    }
}

/// Physics, scrolling, spawning, collision and scoring for one frame
fn update_play(state: &mut GameState, now: f64, dt: f32) {
    state.body.integrate(dt);
    state.field.update(dt);
    if state.session.spawning_enabled {
        state
            .field
            .maybe_spawn_by_distance(&mut state.session.next_spawn_spacing, &mut state.rng);
    }

    let hitbox = state.body.hitbox();
    let collision = state.field.check_collision(&hitbox);
    if !collision.is_alive() {
        game_over(state, now, GameOverCause::Collision(collision));
        return;
    }

    let passed = state.field.score_passed(hitbox.left());
    for _ in 0..passed {
        state.session.score += 1;
        let score = state.session.score;
        state.push_event(GameEvent::Notify(Notification::ScoreTick { score }));
        state.push_event(GameEvent::Sound(SoundEffect::Reward));
    }

    if state.session.phase == GamePhase::Play
        && state.session.score >= state.session.next_challenge_threshold
    {
        start_challenge(state, now);
    }
}

fn start_challenge(state: &mut GameState, now: f64) {
    state.session.spawning_enabled = false;
    state.challenge.start(now, &mut state.rng);
    state.session.phase = GamePhase::Challenge;
    state.push_event(GameEvent::SoftKeyboard(true));
}

fn update_challenge(state: &mut GameState, now: f64) {
    match state.challenge.evaluate(now) {
        ChallengeStatus::Passed => {
            log::info!("Human check passed at score {}", state.session.score);
            state.push_event(GameEvent::SoftKeyboard(false));
            state.field.clear();
            state.body.halt();
            state.session.next_spawn_spacing =
                super::obstacles::sample_spacing(state.tuning.base_spacing, &mut state.rng);
            state.session.next_challenge_threshold =
                state.session.score + next_challenge_increment(&state.tuning, &mut state.rng);
            state.session.spawning_enabled = false;
            state.session.phase = GamePhase::Ready;
        }
        ChallengeStatus::Failed(reason) => {
            state.push_event(GameEvent::SoftKeyboard(false));
            game_over(state, now, GameOverCause::Challenge(reason));
        }
        ChallengeStatus::Typing | ChallengeStatus::Inactive => {}
    }
}

fn game_over(state: &mut GameState, now: f64, cause: GameOverCause) {
    state.session.phase = GamePhase::GameOver;
    state.session.spawning_enabled = false;
    state.gameover_at = Some(now);
    state.session.high_score = state.session.high_score.max(state.session.score);
    log::info!("Game over ({:?}), score {}", cause, state.session.score);

    if !state.score_sent {
        state.score_sent = true;
        let score = state.session.score;
        state.push_event(GameEvent::Notify(Notification::Score { score }));
    }
    if !state.played_gameover_sound {
        state.played_gameover_sound = true;
        state.push_event(GameEvent::Sound(SoundEffect::GameOver));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::Obstacle;
    use crate::tuning::Tuning;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn key(k: Key) -> TickInput {
        TickInput::from_events(vec![InputEvent::KeyDown(k)])
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn playing() -> GameState {
        let mut state = GameState::new(12345, Tuning::default());
        tick(&mut state, &key(Key::Space), 0.0, DT);
        state.drain_events();
        state
    }

    fn notifications(state: &mut GameState) -> Vec<Notification> {
        state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tick_start_to_play() {
        let mut state = GameState::new(12345, Tuning::default());
        tick(&mut state, &idle(), 0.0, DT);
        assert_eq!(state.phase(), GamePhase::Start);

        tick(&mut state, &key(Key::Space), 0.1, DT);
        assert_eq!(state.phase(), GamePhase::Play);
        assert!(state.session.spawning_enabled);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::StartMusic));
        assert!(events.contains(&GameEvent::Notify(Notification::RunStart)));
    }

    #[test]
    fn test_tick_play_spawns_and_falls() {
        let mut state = playing();
        let y0 = state.body.player.y;
        tick(&mut state, &idle(), 0.1, DT);
        assert_eq!(state.field.len(), 1);
        assert!(state.body.player.y > y0);
    }

    #[test]
    fn test_flap_by_key_and_tap() {
        let mut state = playing();
        tick(&mut state, &key(Key::Space), 1.0, DT);
        assert!(state.body.player.velocity_y < 0.0);

        state.body.player.velocity_y = 100.0;
        let tap = TickInput::from_events(vec![InputEvent::PointerDown(Vec2::new(200.0, 300.0))]);
        tick(&mut state, &tap, 2.0, DT);
        assert!(state.body.player.velocity_y < 0.0);
    }

    #[test]
    fn test_focus_loss_pauses_play() {
        let mut state = playing();
        tick(&mut state, &TickInput::from_events(vec![InputEvent::Focus(false)]), 0.1, DT);
        let y = state.body.player.y;
        let x = state.field.obstacles.first().map(|o| o.x);
        for i in 0..30 {
            tick(&mut state, &key(Key::Space), 0.2 + i as f64 * 0.1, DT);
        }
        assert!(state.paused_for_focus());
        assert_eq!(state.body.player.y, y);
        assert_eq!(state.field.obstacles.first().map(|o| o.x), x);
        assert_eq!(state.body.player.last_flap_at, None);

        tick(&mut state, &TickInput::from_events(vec![InputEvent::Focus(true)]), 5.0, DT);
        assert!(!state.paused_for_focus());
        assert!(state.body.player.y > y);
    }

    #[test]
    fn test_mute_button_consumes_tap() {
        let mut state = GameState::new(1, Tuning::default());
        let tap =
            TickInput::from_events(vec![InputEvent::PointerDown(mute_button_rect().center())]);
        tick(&mut state, &tap, 0.0, DT);
        assert_eq!(state.phase(), GamePhase::Start);
        assert!(state.muted);
        assert!(state.drain_events().contains(&GameEvent::MuteChanged(true)));
    }

    #[test]
    fn test_m_key_mutes_outside_challenge_only() {
        let mut state = playing();
        tick(&mut state, &key(Key::Char('m')), 0.1, DT);
        assert!(state.muted);

        state.session.next_challenge_threshold = 0;
        tick(&mut state, &idle(), 0.2, DT);
        assert_eq!(state.phase(), GamePhase::Challenge);
        tick(&mut state, &key(Key::Char('m')), 0.3, DT);
        assert!(state.muted);
        assert_eq!(state.challenge.challenge.typed(), "M");
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut state = playing();
        tick(&mut state, &key(Key::Escape), 0.1, DT);
        assert!(state.drain_events().contains(&GameEvent::Quit));
    }

    #[test]
    fn test_floor_collision_ends_run_once() {
        let mut state = playing();
        state.session.score = 7;
        state.body.player.y = SCREEN_HEIGHT - 5.0;
        tick(&mut state, &idle(), 1.0, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(!state.session.spawning_enabled);
        assert_eq!(state.session.high_score, 7);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Notify(Notification::Score { score: 7 })));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::GameOver)));

        tick(&mut state, &idle(), 1.1, DT);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_gameover_cooldown() {
        let mut state = playing();
        state.body.player.y = SCREEN_HEIGHT;
        tick(&mut state, &idle(), 10.0, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);

        tick(&mut state, &key(Key::Char('r')), 10.5, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);
        tick(&mut state, &key(Key::Space), 11.0, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);

        tick(&mut state, &key(Key::Char('R')), 11.01, DT);
        assert_eq!(state.phase(), GamePhase::Ready);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_scoring_emits_tick_and_reward() {
        let mut state = playing();
        state.session.next_challenge_threshold = 100;
        state.field.obstacles.push(Obstacle::new(20.0, 300, 160));
        tick(&mut state, &idle(), 0.1, DT);
        assert_eq!(state.score(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Notify(Notification::ScoreTick { score: 1 })));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Reward)));

        tick(&mut state, &idle(), 0.2, DT);
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn test_threshold_starts_challenge() {
        let mut state = playing();
        state.session.next_challenge_threshold = 1;
        state.field.obstacles.push(Obstacle::new(20.0, 300, 160));
        tick(&mut state, &idle(), 0.1, DT);
        assert_eq!(state.phase(), GamePhase::Challenge);
        assert!(state.challenge.is_active());
        assert!(!state.session.spawning_enabled);
        assert!(state.drain_events().contains(&GameEvent::SoftKeyboard(true)));

        // World is frozen
        let x = state.field.obstacles[0].x;
        let y = state.body.player.y;
        tick(&mut state, &idle(), 0.2, DT);
        assert_eq!(state.field.obstacles[0].x, x);
        assert_eq!(state.body.player.y, y);
    }

    #[test]
    fn test_collision_same_frame_never_starts_challenge() {
        let mut state = playing();
        state.session.next_challenge_threshold = 0;
        state.body.player.y = SCREEN_HEIGHT;
        tick(&mut state, &idle(), 1.0, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(!state.challenge.is_active());
    }

    #[test]
    fn test_challenge_pass_returns_to_ready() {
        let mut state = playing();
        state.session.score = 5;
        state.session.next_challenge_threshold = 5;
        tick(&mut state, &idle(), 1.0, DT);
        assert_eq!(state.phase(), GamePhase::Challenge);
        state.drain_events();

        let code = state.challenge.challenge.code.clone().unwrap();
        let mut now = 1.5;
        for c in code.as_str().to_lowercase().chars() {
            let input = TickInput::from_events(vec![InputEvent::Text(c.to_string())]);
            tick(&mut state, &input, now, DT);
            now += 0.2;
        }
        assert_eq!(state.phase(), GamePhase::Ready);
        assert!(state.field.is_empty());
        assert_eq!(state.body.player.velocity_y, 0.0);
        assert_eq!(state.score(), 5);
        assert!(state.session.next_challenge_threshold >= 5 + 25);
        assert!(state.drain_events().contains(&GameEvent::SoftKeyboard(false)));

        // Confirm resumes without a second RUN_START
        tick(&mut state, &key(Key::Enter), now, DT);
        assert_eq!(state.phase(), GamePhase::Play);
        assert!(notifications(&mut state).is_empty());
    }

    #[test]
    fn test_challenge_timeout_ends_run() {
        let mut state = playing();
        state.session.score = 3;
        state.session.next_challenge_threshold = 3;
        tick(&mut state, &idle(), 1.0, DT);
        assert_eq!(state.phase(), GamePhase::Challenge);
        tick(&mut state, &idle(), 15.9, DT);
        assert_eq!(state.phase(), GamePhase::Challenge);
        tick(&mut state, &idle(), 16.1, DT);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(notifications(&mut state).contains(&Notification::Score { score: 3 }));
    }

    #[test]
    fn test_code_box_tap_requests_soft_keyboard() {
        let mut state = playing();
        state.session.next_challenge_threshold = 0;
        tick(&mut state, &idle(), 1.0, DT);
        state.drain_events();
        let tap = TickInput::from_events(vec![InputEvent::PointerDown(code_box_rect().center())]);
        tick(&mut state, &tap, 1.1, DT);
        assert_eq!(state.drain_events(), vec![GameEvent::SoftKeyboard(true)]);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());

        let mut now = 0.0;
        for i in 0..600 {
            let input = if i % 20 == 0 { key(Key::Space) } else { idle() };
            tick(&mut state1, &input, now, DT);
            tick(&mut state2, &input, now, DT);
            now += DT as f64;
        }

        assert_eq!(state1.session, state2.session);
        assert_eq!(state1.field.obstacles, state2.field.obstacles);
        assert_eq!(state1.body.player, state2.body.player);
    }
}
