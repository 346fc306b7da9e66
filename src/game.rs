//! Frame driver
//!
//! Owns the session and its collaborators and runs one frame at a time:
//! clock, sim tick, event dispatch, render. The platform layer only pushes
//! input and calls `frame`.

use crate::audio::AudioSink;
use crate::input::{InputEvent, InputQueue};
use crate::notify::{ForwardThrottle, NotificationSink};
use crate::render::{DrawSurface, draw_scene};
use crate::settings::Settings;
use crate::sim::{Clock, GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Platform requests produced by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Escape or window close was handled; the platform should stop the loop
    pub quit: bool,
    /// Show (`true`) or hide (`false`) the platform text input
    pub soft_keyboard: Option<bool>,
}

/// Game instance holding all state
pub struct Game<A: AudioSink, N: NotificationSink> {
    pub state: GameState,
    pub settings: Settings,
    /// Demo mode: the autopilot supplies input
    pub autopilot: bool,
    clock: Clock,
    input: InputQueue,
    audio: A,
    notifier: N,
    throttle: ForwardThrottle,
}

impl<A: AudioSink, N: NotificationSink> Game<A, N> {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings, mut audio: A, notifier: N) -> Self {
        let mut state = GameState::new(seed, tuning);
        state.muted = settings.muted;
        audio.set_muted(settings.muted);
        log::info!("Game initialized with seed: {}", seed);
        Self {
            state,
            settings,
            autopilot: false,
            clock: Clock::default(),
            input: InputQueue::new(),
            audio,
            notifier,
            throttle: ForwardThrottle::new(),
        }
    }

    /// Queue an input event for the next frame
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Fold in a best score published by the host page
    pub fn offer_best_score(&mut self, best: u32) {
        self.state.offer_best_score(best);
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Advance by one frame without drawing
    pub fn update(&mut self, now: f64) -> FrameOutcome {
        let dt = self.clock.tick(now);
        let input = TickInput {
            events: self.input.drain(),
            autopilot: self.autopilot,
        };
        tick(&mut self.state, &input, now, dt);

        let events = self.state.drain_events();
        self.dispatch(events, now)
    }

    /// Advance by one frame and draw it
    pub fn frame<S: DrawSurface + ?Sized>(&mut self, now: f64, surface: &mut S) -> FrameOutcome {
        let outcome = self.update(now);
        draw_scene(surface, &self.state, now);
        outcome
    }

    /// Forward sim events to the collaborators
    fn dispatch(&mut self, events: Vec<GameEvent>, now: f64) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        for event in events {
            match event {
                GameEvent::Sound(effect) => self.audio.play_once(effect),
                GameEvent::Notify(notification) => {
                    if self.throttle.admit(&notification, now) {
                        self.notifier.notify(&notification);
                    } else {
                        log::debug!("Throttled {:?}", notification);
                    }
                }
                GameEvent::StartMusic => self.audio.start_music_loop(),
                GameEvent::MuteChanged(muted) => {
                    self.settings.muted = muted;
                    self.settings.save();
                    self.audio.set_muted(muted);
                }
                GameEvent::SoftKeyboard(show) => outcome.soft_keyboard = Some(show),
                GameEvent::Quit => outcome.quit = true,
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundEffect;
    use crate::consts::*;
    use crate::input::Key;
    use crate::notify::Notification;
    use crate::render::CommandBuffer;
    use crate::sim::GamePhase;

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<SoundEffect>,
        muted: bool,
        music_requests: u32,
    }

    impl AudioSink for RecordingAudio {
        fn play_once(&mut self, effect: SoundEffect) {
            self.played.push(effect);
        }
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
        fn start_music_loop(&mut self) {
            self.music_requests += 1;
        }
    }

    #[derive(Default)]
    struct RecordingSink(Vec<Notification>);

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, notification: &Notification) {
            self.0.push(*notification);
        }
    }

    const DT: f64 = 1.0 / 60.0;

    fn game() -> Game<RecordingAudio, RecordingSink> {
        Game::new(
            5,
            Tuning::default(),
            Settings::default(),
            RecordingAudio::default(),
            RecordingSink::default(),
        )
    }

    #[test]
    fn test_confirm_starts_run_and_music() {
        let mut g = game();
        g.update(0.0);
        g.push_input(InputEvent::KeyDown(Key::Space));
        g.update(DT);
        assert_eq!(g.state.phase(), GamePhase::Play);
        assert_eq!(g.notifier().0, vec![Notification::RunStart]);
        assert!(g.audio().music_requests >= 1);
    }

    #[test]
    fn test_mute_button_updates_settings_and_audio() {
        let mut g = game();
        let center = crate::mute_button_rect().center();
        g.push_input(InputEvent::PointerDown(center));
        g.update(0.0);
        assert!(g.settings.muted);
        assert!(g.audio().muted);
        assert_eq!(g.state.phase(), GamePhase::Start);
    }

    #[test]
    fn test_settings_mute_applied_at_startup() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let g = Game::new(
            1,
            Tuning::default(),
            settings,
            RecordingAudio::default(),
            RecordingSink::default(),
        );
        assert!(g.state.muted);
        assert!(g.audio().muted);
    }

    #[test]
    fn test_crash_reports_score_and_sound_once() {
        let mut g = game();
        g.push_input(InputEvent::KeyDown(Key::Space));
        let mut now = 0.0;
        for _ in 0..180 {
            g.update(now);
            now += DT;
        }
        assert_eq!(g.state.phase(), GamePhase::GameOver);
        let scores: Vec<_> = g
            .notifier()
            .0
            .iter()
            .filter(|n| matches!(n, Notification::Score { .. }))
            .collect();
        assert_eq!(scores, vec![&Notification::Score { score: 0 }]);
        let game_overs = g
            .audio()
            .played
            .iter()
            .filter(|e| **e == SoundEffect::GameOver)
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_escape_quits() {
        let mut g = game();
        g.push_input(InputEvent::KeyDown(Key::Escape));
        assert!(g.update(0.0).quit);
        assert!(!g.update(DT).quit);
    }

    #[test]
    fn test_challenge_requests_soft_keyboard() {
        let mut g = game();
        g.push_input(InputEvent::KeyDown(Key::Space));
        g.update(0.0);
        g.state.session.next_challenge_threshold = 0;
        let outcome = g.update(DT);
        assert_eq!(g.state.phase(), GamePhase::Challenge);
        assert_eq!(outcome.soft_keyboard, Some(true));

        // Typing through the platform text input resolves it
        let code = g.state.challenge.challenge.code.clone().unwrap();
        let mut now = 2.0 * DT;
        for c in code.as_str().chars() {
            g.push_input(InputEvent::Text(c.to_ascii_lowercase().to_string()));
            g.update(now);
            now += 0.2;
        }
        assert_eq!(g.state.phase(), GamePhase::Ready);
    }

    #[test]
    fn test_host_best_score_shown_on_game_over() {
        let mut g = game();
        g.offer_best_score(77);
        g.state.session.phase = GamePhase::GameOver;
        let mut surface = CommandBuffer::new();
        g.frame(0.0, &mut surface);
        assert!(surface.contains_text("High Score: 77"));
    }

    #[test]
    fn test_frame_draws_player() {
        let mut g = game();
        let mut surface = CommandBuffer::new();
        g.frame(0.0, &mut surface);
        let player_at = surface.commands().iter().find_map(|c| match c {
            crate::render::DrawCommand::Image {
                asset: crate::assets::ImageAsset::Player,
                center,
                ..
            } => Some(*center),
            _ => None,
        });
        assert_eq!(player_at.map(|p| p.x), Some(PLAYER_X));
        assert!(player_at.is_some_and(|p| p.y > 0.0 && p.y < SCREEN_HEIGHT));
    }
}
