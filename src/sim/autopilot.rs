//! Demo mode controller
//!
//! Flies toward the gap of the next unpassed obstacle by flapping whenever the
//! body is about to sink below it. It never types codes, so a demo run always
//! ends at the first human check.

use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::input::{InputEvent, Key};

/// Flap once the body drops this far below the gap center. A flap rises
/// about 100px, so the apex stays inside the narrowest gap.
const FLAP_BELOW_CENTER: f32 = 45.0;

/// Gap center the controller is steering toward
pub fn target_y(state: &GameState) -> f32 {
    let player_left = PLAYER_X - PLAYER_HITBOX_W / 2.0;
    state
        .field
        .obstacles
        .iter()
        .filter(|ob| ob.trailing_edge() >= player_left)
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|ob| ob.gap_center_y as f32)
        .unwrap_or(SCREEN_HEIGHT / 2.0)
}

/// Whether a flap now keeps the body inside the target gap
pub fn wants_flap(state: &GameState) -> bool {
    let player = &state.body.player;
    if player.velocity_y < 0.0 {
        return false;
    }
    player.y >= target_y(state) + FLAP_BELOW_CENTER
}

/// The input a player would give this frame, if any
pub fn next_input(state: &GameState, now: f64) -> Option<InputEvent> {
    match state.phase() {
        GamePhase::Start | GamePhase::Ready => Some(InputEvent::KeyDown(Key::Space)),
        GamePhase::Play if wants_flap(state) => Some(InputEvent::KeyDown(Key::Space)),
        GamePhase::GameOver => {
            let cooled_down = state
                .gameover_at
                .is_some_and(|at| now - at > GAMEOVER_COOLDOWN);
            cooled_down.then_some(InputEvent::KeyDown(Key::Char('r')))
        }
        GamePhase::Play | GamePhase::Challenge => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::Obstacle;
    use crate::sim::tick::{TickInput, tick};
    use crate::tuning::Tuning;

    #[test]
    fn test_targets_next_unpassed_gap() {
        let mut state = GameState::new(1, Tuning::default());
        assert_eq!(target_y(&state), SCREEN_HEIGHT / 2.0);
        state.field.obstacles.push(Obstacle::new(0.0, 150, 160));
        state.field.obstacles.push(Obstacle::new(200.0, 420, 160));
        // First obstacle's trailing edge (60) is behind the player
        assert_eq!(target_y(&state), 420.0);
    }

    #[test]
    fn test_flaps_only_when_sinking_low() {
        let mut state = GameState::new(1, Tuning::default());
        state.body.player.y = 300.0;
        state.body.player.velocity_y = 200.0;
        assert!(!wants_flap(&state));
        state.body.player.y = 350.0;
        assert!(wants_flap(&state));
        state.body.player.velocity_y = -100.0;
        assert!(!wants_flap(&state));
    }

    #[test]
    fn test_autopilot_clears_first_obstacle() {
        let mut state = GameState::new(2024, Tuning::default());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        for _ in 0..60 * 6 {
            tick(&mut state, &input, now, dt);
            now += dt as f64;
        }
        assert!(state.score() >= 1 || state.session.high_score >= 1);
    }
}
