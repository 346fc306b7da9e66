//! Phone-style on-screen keyboard for the human check
//!
//! The layout is synthesized from the current mode and the screen size, so
//! hit-testing is a pure function of pointer position and mode.

use glam::Vec2;

use super::challenge::is_code_char;
use crate::Rect;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Space between keys and around the keyboard
const KEY_PAD: f32 = 6.0;
/// Keyboard occupies the screen from this fraction of the height down
const KEYBOARD_TOP_FRAC: f32 = 0.55;
/// Gap left below the bottom row
const KEYBOARD_BOTTOM_MARGIN: f32 = 10.0;
/// The keyboard is never squeezed shorter than this
const KEYBOARD_MIN_HEIGHT: f32 = 140.0;

const LETTER_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];
/// 0 and 1 never appear in codes
const NUMBER_ROWS: [&str; 2] = ["2345", "6789"];

/// Which character set the keyboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardMode {
    #[default]
    Letters,
    Numbers,
}

impl KeyboardMode {
    pub fn toggled(self) -> Self {
        match self {
            KeyboardMode::Letters => KeyboardMode::Numbers,
            KeyboardMode::Numbers => KeyboardMode::Letters,
        }
    }

    /// Label of the key that switches away from this mode
    pub fn toggle_label(self) -> &'static str {
        match self {
            KeyboardMode::Letters => "123",
            KeyboardMode::Numbers => "ABC",
        }
    }

    fn rows(self) -> &'static [&'static str] {
        match self {
            KeyboardMode::Letters => &LETTER_ROWS,
            KeyboardMode::Numbers => &NUMBER_ROWS,
        }
    }
}

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftKeyKind {
    Char(char),
    Toggle,
    Backspace,
    /// Blank filler in the bottom row
    Spacer,
}

/// One key of the on-screen keyboard
#[derive(Debug, Clone, PartialEq)]
pub struct SoftKey {
    pub kind: SoftKeyKind,
    pub rect: Rect,
    /// Disabled keys are drawn dimmed and ignore taps
    pub enabled: bool,
}

impl SoftKey {
    /// Text drawn on the key
    pub fn label(&self, mode: KeyboardMode) -> String {
        match self.kind {
            SoftKeyKind::Char(c) => c.to_string(),
            SoftKeyKind::Toggle => mode.toggle_label().to_string(),
            SoftKeyKind::Backspace => "\u{2190}".to_string(),
            SoftKeyKind::Spacer => String::new(),
        }
    }
}

/// Build the key grid for a mode.
///
/// Character rows come first, each split evenly across the screen width,
/// followed by a bottom bar of toggle / spacer / backspace.
pub fn layout(mode: KeyboardMode) -> Vec<SoftKey> {
    let rows = mode.rows();
    let total_rows = rows.len() + 1;

    let top = (SCREEN_HEIGHT * KEYBOARD_TOP_FRAC).floor();
    let bottom = SCREEN_HEIGHT - KEYBOARD_BOTTOM_MARGIN;
    let avail_h = (bottom - top).max(KEYBOARD_MIN_HEIGHT);
    let key_h = ((avail_h - (total_rows as f32 + 1.0) * KEY_PAD) / total_rows as f32).floor();

    let mut keys = Vec::with_capacity(rows.iter().map(|r| r.len()).sum::<usize>() + 3);
    let mut y = top + KEY_PAD;

    for row in rows {
        let n = row.chars().count();
        let key_w = key_width(n);
        let mut x = KEY_PAD;
        for c in row.chars() {
            keys.push(SoftKey {
                kind: SoftKeyKind::Char(c),
                rect: Rect::new(x, y, key_w, key_h),
                enabled: is_code_char(c),
            });
            x += key_w + KEY_PAD;
        }
        y += key_h + KEY_PAD;
    }

    // Bottom bar: three equal slots
    let key_w = key_width(3);
    let mut x = KEY_PAD;
    for (kind, enabled) in [
        (SoftKeyKind::Toggle, true),
        (SoftKeyKind::Spacer, false),
        (SoftKeyKind::Backspace, true),
    ] {
        keys.push(SoftKey {
            kind,
            rect: Rect::new(x, y, key_w, key_h),
            enabled,
        });
        x += key_w + KEY_PAD;
    }

    keys
}

fn key_width(keys_in_row: usize) -> f32 {
    ((SCREEN_WIDTH - (keys_in_row as f32 + 1.0) * KEY_PAD) / keys_in_row as f32).floor()
}

/// Find the key under a pointer position, if any
pub fn hit_test(keys: &[SoftKey], pos: Vec2) -> Option<&SoftKey> {
    keys.iter().find(|k| k.rect.contains(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(keys: &[SoftKey], kind: SoftKeyKind) -> &SoftKey {
        keys.iter().find(|k| k.kind == kind).unwrap()
    }

    #[test]
    fn test_letters_layout_shape() {
        let keys = layout(KeyboardMode::Letters);
        // 26 letters + toggle + spacer + backspace
        assert_eq!(keys.len(), 29);
        for key in &keys {
            assert!(key.rect.top() >= SCREEN_HEIGHT * KEYBOARD_TOP_FRAC - 1.0);
            assert!(key.rect.bottom() <= SCREEN_HEIGHT);
            assert!(key.rect.left() >= 0.0);
            assert!(key.rect.right() <= SCREEN_WIDTH);
        }
    }

    #[test]
    fn test_numbers_layout_has_only_valid_digits() {
        let keys = layout(KeyboardMode::Numbers);
        let digits: String = keys
            .iter()
            .filter_map(|k| match k.kind {
                SoftKeyKind::Char(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(digits, "23456789");
        assert!(keys.iter().filter(|k| matches!(k.kind, SoftKeyKind::Char(_))).all(|k| k.enabled));
    }

    #[test]
    fn test_ambiguous_letters_disabled() {
        let keys = layout(KeyboardMode::Letters);
        assert!(!find(&keys, SoftKeyKind::Char('I')).enabled);
        assert!(!find(&keys, SoftKeyKind::Char('O')).enabled);
        assert!(find(&keys, SoftKeyKind::Char('Q')).enabled);
        assert!(!find(&keys, SoftKeyKind::Spacer).enabled);
    }

    #[test]
    fn test_keys_do_not_overlap() {
        for mode in [KeyboardMode::Letters, KeyboardMode::Numbers] {
            let keys = layout(mode);
            for (i, a) in keys.iter().enumerate() {
                for b in &keys[i + 1..] {
                    assert!(!a.rect.intersects(&b.rect), "{:?} overlaps {:?}", a.kind, b.kind);
                }
            }
        }
    }

    #[test]
    fn test_hit_test_centers_and_gaps() {
        let keys = layout(KeyboardMode::Letters);
        for key in &keys {
            let hit = hit_test(&keys, key.rect.center()).unwrap();
            assert_eq!(hit.kind, key.kind);
        }
        // Above the keyboard
        assert!(hit_test(&keys, Vec2::new(200.0, 100.0)).is_none());
        // The padding column at the far left
        let first = &keys[0];
        assert!(hit_test(&keys, Vec2::new(2.0, first.rect.center().y)).is_none());
    }

    #[test]
    fn test_toggle_label() {
        assert_eq!(KeyboardMode::Letters.toggle_label(), "123");
        assert_eq!(KeyboardMode::Letters.toggled(), KeyboardMode::Numbers);
        assert_eq!(KeyboardMode::Numbers.toggle_label(), "ABC");
    }
}
