//! Flappy Bara entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use flappy_bara::audio::WebAudio;
    use flappy_bara::consts::*;
    use flappy_bara::input::{InputEvent, Key};
    use flappy_bara::notify::{ParentWindowSink, host_best_score};
    use flappy_bara::render::canvas::CanvasSurface;
    use flappy_bara::sim::GamePhase;
    use flappy_bara::{Game, Settings, Tuning, code_box_rect};

    /// Id of the hidden text field that raises the on-screen keyboard
    const TEXT_INPUT_ID: &str = "code-input";
    /// Seconds between host best-score polls
    const HOST_BEST_POLL_SECS: f64 = 2.0;

    /// Everything the browser callbacks share
    struct App {
        game: Game<WebAudio, ParentWindowSink>,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        text_input: Option<HtmlInputElement>,
        last_host_poll: Option<f64>,
        running: bool,
    }

    impl App {
        /// Client (CSS pixel) coordinates to logical screen coordinates
        fn to_logical(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let w = rect.width().max(1.0);
            let h = rect.height().max(1.0);
            Vec2::new(
                ((client_x - rect.left()) * SCREEN_WIDTH as f64 / w) as f32,
                ((client_y - rect.top()) * SCREEN_HEIGHT as f64 / h) as f32,
            )
        }

        fn pointer_down(&mut self, client_x: f64, client_y: f64) {
            let pos = self.to_logical(client_x, client_y);
            self.game.push_input(InputEvent::PointerDown(pos));
            // Mobile browsers only raise the keyboard from inside a gesture handler
            if self.game.state.phase() == GamePhase::Challenge && code_box_rect().contains(pos) {
                self.set_soft_keyboard(true);
            }
        }

        fn set_soft_keyboard(&self, show: bool) {
            let Some(input) = &self.text_input else {
                return;
            };
            if show {
                input.set_value("");
                if let Err(e) = input.focus() {
                    log::warn!("Failed to focus text input: {:?}", e);
                }
            } else {
                input.blur().ok();
            }
        }

        fn frame(&mut self, time_ms: f64) {
            let now = time_ms / 1000.0;

            if self
                .last_host_poll
                .is_none_or(|at| now - at >= HOST_BEST_POLL_SECS)
            {
                self.last_host_poll = Some(now);
                if let Some(best) = host_best_score() {
                    self.game.offer_best_score(best);
                }
            }

            let outcome = self.game.frame(now, &mut self.surface);
            if let Some(show) = outcome.soft_keyboard {
                self.set_soft_keyboard(show);
            }
            if outcome.quit {
                self.running = false;
                log::info!("Game loop stopped");
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy Bara {} starting...", GAME_VERSION);

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let surface = CanvasSurface::new(&canvas).expect("Failed to create 2d context");

        let settings = Settings::load();
        let audio = WebAudio::new(&settings);
        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed, Tuning::default(), settings, audio, ParentWindowSink);
        game.autopilot = window
            .location()
            .search()
            .is_ok_and(|query| query.contains("demo"));
        if game.autopilot {
            log::info!("Demo mode enabled");
        }

        let text_input = create_text_input(&document);
        let app = Rc::new(RefCell::new(App {
            game,
            surface,
            canvas: canvas.clone(),
            text_input: text_input.clone(),
            last_host_poll: None,
            running: true,
        }));

        setup_input_handlers(&canvas, app.clone());
        if let Some(input) = text_input {
            setup_text_input(&input, app.clone());
        }
        setup_auto_pause(app.clone());
        setup_resize(app.clone());

        request_animation_frame(app);

        log::info!("Flappy Bara running!");
    }

    /// Invisible text field used for the on-screen keyboard during the check
    fn create_text_input(document: &web_sys::Document) -> Option<HtmlInputElement> {
        let create = || -> Result<HtmlInputElement, JsValue> {
            let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
            input.set_id(TEXT_INPUT_ID);
            input.set_type("text");
            input.set_attribute("autocapitalize", "characters")?;
            input.set_attribute("autocomplete", "off")?;
            input.set_attribute("autocorrect", "off")?;
            input.set_attribute("spellcheck", "false")?;
            input.set_attribute(
                "style",
                "position:fixed;left:0;top:0;width:1px;height:1px;opacity:0;border:0;padding:0;",
            )?;
            let body = document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?;
            body.append_child(&input)?;
            Ok(input)
        };
        match create() {
            Ok(input) => Some(input),
            Err(e) => {
                log::warn!("Failed to create text input, typing needs a keyboard: {:?}", e);
                None
            }
        }
    }

    fn text_input_focused() -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.active_element())
            .is_some_and(|el| el.id() == TEXT_INPUT_ID)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .pointer_down(event.client_x() as f64, event.client_y() as f64);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (suppresses the synthesized mouse event)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    app.borrow_mut()
                        .pointer_down(touch.client_x() as f64, touch.client_y() as f64);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_dom_key(&event.key()) else {
                    return;
                };
                // Characters typed into the text field arrive as input events
                if matches!(key, Key::Char(_)) && text_input_focused() {
                    return;
                }
                if key == Key::Space {
                    event.prevent_default();
                }
                app.borrow_mut().game.push_input(InputEvent::KeyDown(key));
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_text_input(input: &HtmlInputElement, app: Rc<RefCell<App>>) {
        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let text = input_clone.value();
            input_clone.set_value("");
            if !text.is_empty() {
                app.borrow_mut().game.push_input(InputEvent::Text(text));
            }
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");

        for (event_name, focused) in [("blur", false), ("focus", true)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().game.push_input(InputEvent::Focus(focused));
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut app = app.borrow_mut();
            let canvas = app.canvas.clone();
            app.surface.resize(&canvas);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            if !a.running {
                return;
            }
            a.frame(time);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!(
        "Flappy Bara {} (native) starting...",
        flappy_bara::consts::GAME_VERSION
    );
    log::info!("Native mode runs a headless autopilot demo - serve the wasm build to play");

    report_assets();

    let seconds = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(60.0);
    run_demo(seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Log where each image would be loaded from
#[cfg(not(target_arch = "wasm32"))]
fn report_assets() {
    use flappy_bara::assets::{ImageAsset, resolve_in};

    let root = std::env::current_dir().unwrap_or_default();
    for asset in ImageAsset::ALL {
        match resolve_in(&root, asset.logical_name()) {
            Ok(path) => log::info!("Found {}", path.display()),
            Err(e) => log::warn!("{} - a placeholder will be drawn", e),
        }
    }
}

/// Balance overrides from the JSON file named by `FLAPPY_BARA_TUNING`
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning() -> flappy_bara::Tuning {
    use flappy_bara::Tuning;

    let Ok(path) = std::env::var("FLAPPY_BARA_TUNING") else {
        return Tuning::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Failed to load tuning from {}: {} - using defaults", path, e);
            Tuning::default()
        }
    }
}

/// Play `seconds` of simulated time with the autopilot at the target frame rate
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(seconds: f64) {
    use flappy_bara::audio::SilentAudio;
    use flappy_bara::consts::TARGET_FPS;
    use flappy_bara::notify::LogSink;
    use flappy_bara::render::CommandBuffer;
    use flappy_bara::sim::GamePhase;
    use flappy_bara::{Game, Settings};

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    let settings = Settings::load();
    let audio = SilentAudio::new(&settings);
    let mut game = Game::new(seed, load_tuning(), settings, audio, LogSink);
    game.autopilot = true;

    let mut surface = CommandBuffer::new();
    let dt = 1.0 / TARGET_FPS as f64;
    let frames = (seconds * TARGET_FPS as f64) as u64;
    let mut runs = 0;
    let mut last_phase = game.state.phase();

    for frame in 0..frames {
        let outcome = game.frame(frame as f64 * dt, &mut surface);
        if outcome.quit {
            break;
        }
        let phase = game.state.phase();
        if phase != last_phase {
            if phase == GamePhase::GameOver {
                runs += 1;
                log::info!("Run {} ended with score {}", runs, game.state.score());
            }
            last_phase = phase;
        }
    }

    println!(
        "Demo finished: {:.0}s simulated, {} runs, high score {}",
        seconds, runs, game.state.session.high_score
    );
}
