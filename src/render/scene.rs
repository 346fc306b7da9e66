//! Scene composition
//!
//! Turns a `GameState` into draw commands. Layering, back to front:
//! background, pillars, player, HUD / phase overlay, mute button.

use glam::Vec2;

use super::{Color, DrawCommand, DrawSurface, TextAlign, TextBaseline, TextStyle};
use crate::assets::ImageAsset;
use crate::consts::*;
use crate::sim::keyboard::{self, SoftKeyKind};
use crate::sim::{GamePhase, GameState, Obstacle};
use crate::{Rect, code_box_rect, mute_button_rect};

// Pillar palette
const GOLD_SHADOW: Color = Color::rgb(90, 70, 25);
const GOLD_LIGHT: Color = Color::rgb(210, 190, 120);
const GOLD_MID: Color = Color::rgb(170, 135, 40);
const RIDGE_LIGHT: Color = Color::rgba(220, 200, 150, 80.0 / 255.0);
const RIDGE_DARK: Color = Color::rgba(80, 60, 30, 70.0 / 255.0);
const PILLAR_BORDER: Color = Color::rgba(120, 85, 26, 180.0 / 255.0);
/// Vertical distance between coin ridges
const RIDGE_STEP: f32 = 24.0;

const DIM_TEXT: Color = Color::rgb(200, 200, 200);
const HUD_TEXT_SIZE: f32 = 28.0;
const PROMPT_SIZE: f32 = 22.0;

/// Glyph cell width of the distorted code, plus the gap between cells
const CODE_GLYPH_SIZE: f32 = 40.0;
const CODE_GLYPH_ADVANCE: f32 = 26.0;
const CODE_GLYPH_SPACING: f32 = 6.0;
/// Timer turns red below this many seconds
const TIMER_WARN_SECS: f64 = 3.0;

/// Draw one full frame of `state` at time `now`
pub fn draw_scene<S: DrawSurface + ?Sized>(surface: &mut S, state: &GameState, now: f64) {
    surface.begin_frame();

    surface.draw(DrawCommand::Image {
        asset: ImageAsset::Background,
        center: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),
        size: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        rotation_deg: 0.0,
    });

    for ob in &state.field.obstacles {
        draw_pillar(surface, ob);
    }

    draw_player(surface, state);

    match state.phase() {
        GamePhase::Start => draw_start(surface),
        GamePhase::Ready => draw_ready(surface),
        GamePhase::Play => {
            draw_score(surface, state.score());
            if state.paused_for_focus() {
                text_center(
                    surface,
                    "Paused (click tab to return)",
                    20.0,
                    SCREEN_HEIGHT * 0.15,
                    DIM_TEXT,
                );
            }
        }
        GamePhase::Challenge => {
            draw_score(surface, state.score());
            draw_challenge(surface, state, now);
        }
        GamePhase::GameOver => draw_game_over(surface, state, now),
    }

    draw_mute_button(surface, state.muted);
}

/// Horizontally centered text with its top at `y`
fn text_center<S: DrawSurface + ?Sized>(
    surface: &mut S,
    text: &str,
    size: f32,
    y: f32,
    color: Color,
) {
    surface.draw(DrawCommand::Text {
        text: text.to_string(),
        pos: Vec2::new(SCREEN_WIDTH / 2.0, y),
        style: TextStyle::new(size, color).centered(),
        rotation_deg: 0.0,
    });
}

fn fill<S: DrawSurface + ?Sized>(surface: &mut S, rect: Rect, color: Color) {
    surface.draw(DrawCommand::Rect {
        rect,
        fill: Some(color),
        stroke: None,
        radius: 0.0,
    });
}

fn draw_pillar<S: DrawSurface + ?Sized>(surface: &mut S, ob: &Obstacle) {
    let (top, bottom) = ob.visual_rects();
    for section in [top, bottom] {
        if section.is_empty() {
            continue;
        }
        surface.draw(DrawCommand::HorizontalGradient {
            rect: section,
            stops: vec![(0.0, GOLD_SHADOW), (0.40, GOLD_LIGHT), (1.0, GOLD_MID)],
        });

        // Coin ridges, anchored to the screen so they don't crawl as the gap moves
        let mut y = (section.top() / RIDGE_STEP).ceil() * RIDGE_STEP;
        while y < section.bottom() {
            let (x0, x1) = (section.left() + 2.0, section.right() - 2.0);
            surface.draw(DrawCommand::Line {
                from: Vec2::new(x0, y),
                to: Vec2::new(x1, y),
                color: RIDGE_LIGHT,
                width: 2.0,
            });
            surface.draw(DrawCommand::Line {
                from: Vec2::new(x0, y + 2.0),
                to: Vec2::new(x1, y + 2.0),
                color: RIDGE_DARK,
                width: 1.0,
            });
            y += RIDGE_STEP;
        }

        // Rim shadows
        fill(
            surface,
            Rect::new(section.left(), section.top(), 3.0, section.size.y),
            Color::rgba(0, 0, 0, 60.0 / 255.0),
        );
        fill(
            surface,
            Rect::new(section.right() - 4.0, section.top(), 4.0, section.size.y),
            Color::rgba(0, 0, 0, 70.0 / 255.0),
        );

        surface.draw(DrawCommand::Rect {
            rect: section,
            fill: None,
            stroke: Some((PILLAR_BORDER, 2.0)),
            radius: 6.0,
        });
    }
}

fn draw_player<S: DrawSurface + ?Sized>(surface: &mut S, state: &GameState) {
    let rotation_deg = if state.phase() == GamePhase::Play {
        state.body.tilt_degrees()
    } else {
        0.0
    };
    surface.draw(DrawCommand::Image {
        asset: ImageAsset::Player,
        center: Vec2::new(PLAYER_X, state.body.player.y),
        size: Vec2::new(PLAYER_SPRITE_W, PLAYER_SPRITE_H),
        rotation_deg,
    });
}

fn draw_score<S: DrawSurface + ?Sized>(surface: &mut S, score: u32) {
    surface.draw(DrawCommand::Text {
        text: format!("Score: {}", score),
        pos: Vec2::new(10.0, 10.0),
        style: TextStyle::new(HUD_TEXT_SIZE, Color::WHITE),
        rotation_deg: 0.0,
    });
}

fn draw_start<S: DrawSurface + ?Sized>(surface: &mut S) {
    text_center(surface, "Flappy Bara", 40.0, SCREEN_HEIGHT / 4.0, Color::WHITE);
    text_center(
        surface,
        "Press SPACE or TAP to Start",
        PROMPT_SIZE,
        SCREEN_HEIGHT / 2.0,
        Color::WHITE,
    );
    surface.draw(DrawCommand::Text {
        text: GAME_VERSION.to_string(),
        pos: Vec2::new(SCREEN_WIDTH - 6.0, SCREEN_HEIGHT - 6.0),
        style: TextStyle::new(14.0, DIM_TEXT).aligned(TextAlign::Right, TextBaseline::Bottom),
        rotation_deg: 0.0,
    });
}

fn draw_ready<S: DrawSurface + ?Sized>(surface: &mut S) {
    text_center(surface, "Get Ready!", 36.0, SCREEN_HEIGHT / 4.0, Color::WHITE);
    text_center(
        surface,
        "Press SPACE or TAP to continue",
        PROMPT_SIZE,
        SCREEN_HEIGHT / 2.0,
        Color::WHITE,
    );
}

fn draw_game_over<S: DrawSurface + ?Sized>(surface: &mut S, state: &GameState, now: f64) {
    text_center(surface, "Game Over!", 42.0, SCREEN_HEIGHT / 4.0, Color::rgb(255, 80, 80));
    text_center(
        surface,
        &format!("Score: {}", state.score()),
        HUD_TEXT_SIZE,
        SCREEN_HEIGHT / 2.0 - 40.0,
        Color::WHITE,
    );
    text_center(
        surface,
        &format!("High Score: {}", state.session.high_score),
        HUD_TEXT_SIZE,
        SCREEN_HEIGHT / 2.0,
        Color::WHITE,
    );
    let can_retry = state
        .gameover_at
        .is_some_and(|at| now - at > GAMEOVER_COOLDOWN);
    if can_retry {
        text_center(
            surface,
            "Press R / Tap to Try Again",
            PROMPT_SIZE,
            SCREEN_HEIGHT * 0.68,
            Color::WHITE,
        );
    }
}

fn draw_challenge<S: DrawSurface + ?Sized>(surface: &mut S, state: &GameState, now: f64) {
    let engine = &state.challenge;
    let challenge = &engine.challenge;

    fill(
        surface,
        Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT),
        Color::rgba(0, 0, 0, 160.0 / 255.0),
    );
    text_center(
        surface,
        "Quick Check!",
        34.0,
        SCREEN_HEIGHT * 0.22,
        Color::rgb(255, 215, 120),
    );
    text_center(
        surface,
        "Type this code to continue",
        20.0,
        SCREEN_HEIGHT * 0.32,
        Color::rgb(230, 230, 230),
    );

    let code_box = code_box_rect();
    surface.draw(DrawCommand::Rect {
        rect: code_box,
        fill: Some(Color::rgb(30, 30, 30)),
        stroke: Some((Color::rgb(200, 180, 90), 3.0)),
        radius: 10.0,
    });

    if let Some(code) = &challenge.code {
        let glyphs = code.glyph_transforms();
        let n = glyphs.len() as f32;
        let total_w = n * CODE_GLYPH_ADVANCE + (n - 1.0).max(0.0) * CODE_GLYPH_SPACING;
        let mut x = SCREEN_WIDTH / 2.0 - total_w / 2.0;
        for glyph in glyphs {
            surface.draw(DrawCommand::Text {
                text: glyph.ch.to_string(),
                pos: Vec2::new(
                    x + CODE_GLYPH_ADVANCE / 2.0 + glyph.offset_x as f32,
                    code_box.top() + 8.0,
                ),
                style: TextStyle::new(CODE_GLYPH_SIZE, Color::WHITE).centered(),
                rotation_deg: glyph.rotation_deg,
            });
            x += CODE_GLYPH_ADVANCE + CODE_GLYPH_SPACING;
        }
    }

    text_center(
        surface,
        challenge.typed(),
        26.0,
        code_box.top() + 46.0,
        Color::rgb(180, 220, 255),
    );

    let remaining = engine.remaining(now);
    let timer_color = if remaining < TIMER_WARN_SECS {
        Color::rgb(255, 200, 200)
    } else {
        Color::rgb(200, 255, 200)
    };
    text_center(
        surface,
        &format!("{:.1}s", remaining),
        PROMPT_SIZE,
        SCREEN_HEIGHT * 0.72,
        timer_color,
    );

    draw_keyboard(surface, engine.keyboard_mode);
}

fn draw_keyboard<S: DrawSurface + ?Sized>(surface: &mut S, mode: keyboard::KeyboardMode) {
    for key in keyboard::layout(mode) {
        let (bg, border, label_color) = if key.enabled {
            (Color::rgb(25, 25, 25), Color::rgb(210, 210, 210), Color::rgb(240, 240, 240))
        } else {
            (Color::rgb(15, 15, 15), Color::rgb(90, 90, 90), Color::rgb(120, 120, 120))
        };
        surface.draw(DrawCommand::Rect {
            rect: key.rect,
            fill: Some(bg),
            stroke: Some((border, 2.0)),
            radius: 8.0,
        });
        if key.kind == SoftKeyKind::Spacer {
            continue;
        }
        let size = (key.rect.size.y * 0.45).clamp(12.0, 24.0);
        surface.draw(DrawCommand::Text {
            text: key.label(mode),
            pos: key.rect.center(),
            style: TextStyle::new(size, label_color)
                .aligned(TextAlign::Center, TextBaseline::Middle),
            rotation_deg: 0.0,
        });
    }
}

fn draw_mute_button<S: DrawSurface + ?Sized>(surface: &mut S, muted: bool) {
    let rect = mute_button_rect();
    surface.draw(DrawCommand::Rect {
        rect,
        fill: Some(Color::BLACK),
        stroke: Some((Color::rgb(220, 220, 220), 2.0)),
        radius: 8.0,
    });
    let label_color = if muted {
        Color::rgb(210, 210, 210)
    } else {
        Color::rgb(240, 240, 240)
    };
    surface.draw(DrawCommand::Text {
        text: "MUTE".to_string(),
        pos: rect.center(),
        style: TextStyle::new(9.0, label_color).aligned(TextAlign::Center, TextBaseline::Middle),
        rotation_deg: 0.0,
    });
    if muted {
        let inner = rect.inflate(-6.0, -6.0);
        surface.draw(DrawCommand::Line {
            from: Vec2::new(inner.left(), inner.bottom()),
            to: Vec2::new(inner.right(), inner.top()),
            color: Color::rgb(230, 60, 60),
            width: (rect.size.x / 10.0).max(3.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CommandBuffer;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn render(state: &GameState, now: f64) -> CommandBuffer {
        let mut buf = CommandBuffer::new();
        draw_scene(&mut buf, state, now);
        buf
    }

    #[test]
    fn test_start_screen() {
        let state = GameState::new(1, Tuning::default());
        let buf = render(&state, 0.0);
        assert!(buf.contains_text("Flappy Bara"));
        assert!(buf.contains_text(GAME_VERSION));
        assert!(!buf.contains_text("Score:"));
        // Background first
        assert!(matches!(
            buf.commands()[0],
            DrawCommand::Image {
                asset: ImageAsset::Background,
                ..
            }
        ));
    }

    #[test]
    fn test_mute_button_drawn_last() {
        let mut state = GameState::new(1, Tuning::default());
        state.muted = true;
        let buf = render(&state, 0.0);
        match buf.commands().last() {
            Some(DrawCommand::Line { color, .. }) => assert_eq!(*color, Color::rgb(230, 60, 60)),
            other => panic!("expected mute slash, got {:?}", other),
        }

        state.muted = false;
        let buf = render(&state, 0.0);
        let last = buf.commands().last();
        assert!(matches!(last, Some(DrawCommand::Text { text, .. }) if text == "MUTE"));
    }

    #[test]
    fn test_play_hud_and_pause_banner() {
        let mut state = GameState::new(1, Tuning::default());
        state.session.phase = GamePhase::Play;
        state.session.score = 7;
        let buf = render(&state, 0.0);
        assert!(buf.contains_text("Score: 7"));
        assert!(!buf.contains_text("Paused"));

        state.has_focus = false;
        assert!(render(&state, 0.0).contains_text("Paused"));
    }

    #[test]
    fn test_pillar_sections_drawn() {
        let mut state = GameState::new(1, Tuning::default());
        state.session.phase = GamePhase::Play;
        state.field.obstacles.push(Obstacle::new(200.0, 300, 160));
        let buf = render(&state, 0.0);
        let gradients = buf
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::HorizontalGradient { .. }))
            .count();
        assert_eq!(gradients, 2);
    }

    #[test]
    fn test_challenge_overlay() {
        let mut state = GameState::new(1, Tuning::default());
        let mut rng = Pcg32::seed_from_u64(3);
        state.challenge.start(10.0, &mut rng);
        state.session.phase = GamePhase::Challenge;
        let code = state.challenge.challenge.code.clone().unwrap();

        let buf = render(&state, 10.0);
        assert!(buf.contains_text("Quick Check!"));
        assert!(buf.contains_text("15.0s"));
        for ch in code.as_str().chars() {
            assert!(buf.texts().any(|t| t == ch.to_string()));
        }
        // Keyboard toggle label
        assert!(buf.contains_text("123"));

        let buf = render(&state, 23.0);
        let timer = buf
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Text { text, style, .. } if text == "2.0s" => Some(style.color),
                _ => None,
            })
            .unwrap();
        assert_eq!(timer, Color::rgb(255, 200, 200));
    }

    #[test]
    fn test_game_over_retry_hint_after_cooldown() {
        let mut state = GameState::new(1, Tuning::default());
        state.session.phase = GamePhase::GameOver;
        state.session.score = 4;
        state.session.high_score = 9;
        state.gameover_at = Some(5.0);

        let buf = render(&state, 5.5);
        assert!(buf.contains_text("Game Over!"));
        assert!(buf.contains_text("High Score: 9"));
        assert!(!buf.contains_text("Try Again"));

        assert!(render(&state, 6.2).contains_text("Try Again"));
    }

    #[test]
    fn test_player_tilts_only_in_play() {
        let mut state = GameState::new(1, Tuning::default());
        state.body.player.velocity_y = 400.0;
        let rotation = |buf: &CommandBuffer| {
            buf.commands()
                .iter()
                .find_map(|c| match c {
                    DrawCommand::Image {
                        asset: ImageAsset::Player,
                        rotation_deg,
                        ..
                    } => Some(*rotation_deg),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(rotation(&render(&state, 0.0)), 0.0);
        state.session.phase = GamePhase::Play;
        assert!(rotation(&render(&state, 0.0)) < 0.0);
    }
}
