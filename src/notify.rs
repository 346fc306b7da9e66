//! Outbound messages for an embedding page
//!
//! When the game runs inside an iframe, the host page listens for run and
//! score messages. Delivery is strictly best-effort.

use serde::{Deserialize, Serialize};

/// Minimum seconds between two forwarded `RUN_START`s
pub const RUN_START_MIN_INTERVAL: f64 = 1.0;
/// Minimum seconds before an identical `SCORE` is forwarded again
pub const REPEAT_SCORE_MIN_INTERVAL: f64 = 2.0;

/// LocalStorage key the host page mirrors its best score into
pub const HOST_BEST_STORAGE_KEY: &str = "sm_my_best";
/// Global the host page may set directly
pub const HOST_BEST_GLOBAL: &str = "__sm_my_best";

/// A message for the host page, serialized as `{"type": ..., ...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// First confirm of a round
    RunStart,
    /// Final score, once per round
    Score { score: u32 },
    /// Running score after each obstacle
    ScoreTick { score: u32 },
}

impl Notification {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One-way message capability. Implementations swallow their own failures.
pub trait NotificationSink {
    fn notify(&mut self, notification: &Notification);
}

/// Writes notifications to the log (native builds, tests)
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, notification: &Notification) {
        match notification.to_json() {
            Ok(json) => log::debug!("notify {}", json),
            Err(e) => log::warn!("Failed to encode notification: {}", e),
        }
    }
}

/// Anti-spam filter applied before forwarding.
///
/// `RUN_START` passes at most once per second, and an identical `SCORE`
/// at most once per two seconds. `SCORE_TICK` is never throttled.
#[derive(Debug, Clone, Default)]
pub struct ForwardThrottle {
    last_start: Option<f64>,
    last_score: Option<(u32, f64)>,
}

impl ForwardThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `notification` may be forwarded at `now` (seconds).
    /// Records it if so.
    pub fn admit(&mut self, notification: &Notification, now: f64) -> bool {
        match *notification {
            Notification::RunStart => {
                if self
                    .last_start
                    .is_some_and(|at| now - at < RUN_START_MIN_INTERVAL)
                {
                    return false;
                }
                self.last_start = Some(now);
                true
            }
            Notification::Score { score } => {
                if let Some((last, at)) = self.last_score {
                    if last == score && now - at < REPEAT_SCORE_MIN_INTERVAL {
                        return false;
                    }
                }
                self.last_score = Some((score, now));
                true
            }
            Notification::ScoreTick { .. } => true,
        }
    }
}

/// Parse a best score published by the host page. Anything that is not a
/// non-negative integer is ignored.
pub fn parse_best_score(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    })
}

#[cfg(target_arch = "wasm32")]
pub use web::{ParentWindowSink, host_best_score};

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;

    use super::{
        HOST_BEST_GLOBAL, HOST_BEST_STORAGE_KEY, Notification, NotificationSink, parse_best_score,
    };

    /// Posts notifications to the top-level window (falling back to the
    /// direct parent) as plain JS objects
    #[derive(Debug, Default)]
    pub struct ParentWindowSink;

    impl ParentWindowSink {
        fn post(message: &JsValue) -> Result<(), JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            if let Some(top) = window.top()? {
                if top.post_message(message, "*").is_ok() {
                    return Ok(());
                }
            }
            match window.parent()? {
                Some(parent) => parent.post_message(message, "*"),
                None => Err(JsValue::from_str("no parent window")),
            }
        }
    }

    impl NotificationSink for ParentWindowSink {
        fn notify(&mut self, notification: &Notification) {
            let json = match notification.to_json() {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Failed to encode notification: {}", e);
                    return;
                }
            };
            let delivered = js_sys::JSON::parse(&json).and_then(|msg| Self::post(&msg));
            match delivered {
                Ok(()) => log::debug!("posted {}", json),
                Err(e) => log::warn!("Failed to post {}: {:?}", json, e),
            }
        }
    }

    /// Best score the host page has published, if any
    pub fn host_best_score() -> Option<u32> {
        let window = web_sys::window()?;

        let direct = js_sys::Reflect::get(&window, &JsValue::from_str(HOST_BEST_GLOBAL))
            .ok()
            .and_then(|v| {
                v.as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| n as u32)
                    .or_else(|| v.as_string().and_then(|s| parse_best_score(&s)))
            })
            .filter(|n| *n > 0);
        if direct.is_some() {
            return direct;
        }

        let storage = window.local_storage().ok()??;
        let raw = storage.get_item(HOST_BEST_STORAGE_KEY).ok()??;
        parse_best_score(&raw)
    }
}
