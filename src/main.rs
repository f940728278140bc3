//! Retro Arcade entry point
//!
//! On the web this wires the cabinet to the DOM, keyboard, WebGPU and Web
//! Audio. Natively it runs the attract-mode autopilot headlessly.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement};

    use retro_arcade::audio::{AudioManager, SoundEffect};
    use retro_arcade::consts::FIRST_FRAME_MS;
    use retro_arcade::renderer::RenderState;
    use retro_arcade::{ArcadeError, Cabinet, GameId, HighScores, Key, Result, Settings, catalog};

    /// Master volume change per key press
    const VOLUME_STEP: f32 = 0.1;

    /// Everything the browser callbacks share
    struct App {
        cabinet: Cabinet,
        render_state: Option<RenderState>,
        audio: AudioManager,
        last_time: f64,
        /// Last values written to the DOM, so frames only touch what changed
        shown_game: Option<GameId>,
        shown_hud: String,
        shown_over: bool,
        shown_paused: bool,
    }

    impl App {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let audio = AudioManager::new(&settings);
            Self {
                cabinet: Cabinet::new(seed, settings, HighScores::load()),
                render_state: None,
                audio,
                last_time: 0.0,
                shown_game: None,
                shown_hud: String::new(),
                shown_over: false,
                shown_paused: false,
            }
        }

        /// Run simulation ticks and play their sounds
        fn update(&mut self, dt: f64) {
            self.cabinet.advance(dt, js_sys::Date::now());
            for event in self.cabinet.drain_events() {
                self.audio.play(SoundEffect::for_event(&event));
            }
        }

        fn render(&mut self) {
            let Some(canvas) = self.cabinet.draw() else {
                return;
            };
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&canvas) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Sync menu, HUD and overlays with the cabinet
        fn update_hud(&mut self, document: &Document) {
            let current = self.cabinet.current();
            let id = current.map(|g| g.id());

            if id != self.shown_game {
                set_visible(document, "menu", id.is_none());
                set_visible(document, "hud", id.is_some());
                set_visible(document, "canvas", id.is_some());
                if let Some(id) = id {
                    set_text(document, "hud-title", id.title());
                    set_text(document, "controls", id.controls());
                }
                self.shown_game = id;
                self.shown_hud.clear();
                self.shown_over = false;
                set_visible(document, "game-over", false);
            }

            let Some(game) = current else {
                return;
            };

            let hud = game.hud();
            if hud != self.shown_hud {
                set_text(document, "hud-score", &hud);
                self.shown_hud = hud;
            }

            let over = game.phase().is_over();
            if over != self.shown_over {
                if over {
                    set_text(document, "game-over-title", game.banner().unwrap_or("GAME OVER"));
                    let mut lines = game.summary();
                    if let Some(best) = self.cabinet.high_scores().top_score(game.id()) {
                        lines.push(format!("Best: {}", best));
                    }
                    if let Some(el) = document.get_element_by_id("game-over-summary") {
                        let html: String = lines.iter().map(|l| format!("<p>{}</p>", l)).collect();
                        el.set_inner_html(&html);
                    }
                }
                set_visible(document, "game-over", over);
                self.shown_over = over;
            }

            let paused = self.cabinet.is_paused();
            if paused != self.shown_paused {
                set_visible(document, "pause-banner", paused);
                self.shown_paused = paused;
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn element(document: &Document, id: &str) -> Result<Element> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| ArcadeError::Dom(format!("missing #{}", id)))
    }

    pub async fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Retro Arcade starting...");

        let window = web_sys::window().ok_or_else(|| ArcadeError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ArcadeError::Dom("no document".into()))?;

        let canvas: HtmlCanvasElement = element(&document, "canvas")?
            .dyn_into()
            .map_err(|_| ArcadeError::Dom("#canvas is not a canvas".into()))?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width().max(1) as f64 * dpr) as u32;
        let height = (canvas.client_height().max(1) as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));
        log::info!("Cabinet initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| ArcadeError::Gpu(format!("create_surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ArcadeError::Gpu(format!("request_adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;
        app.borrow_mut().render_state = Some(render_state);

        build_menu(&document, app.clone())?;
        setup_keyboard(app.clone());
        setup_buttons(&document, app.clone());
        setup_auto_pause(app.clone());

        set_visible(&document, "menu", true);
        set_visible(&document, "hud", false);
        set_visible(&document, "canvas", false);
        set_visible(&document, "game-over", false);
        set_visible(&document, "pause-banner", false);

        request_animation_frame(app);

        log::info!("Retro Arcade running!");
        Ok(())
    }

    /// One button per catalog entry
    fn build_menu(document: &Document, app: Rc<RefCell<App>>) -> Result<()> {
        let menu = element(document, "menu")?;
        for info in catalog() {
            let button = document
                .create_element("button")
                .map_err(|_| ArcadeError::Dom("create_element failed".into()))?;
            let _ = button.set_attribute("class", "game-button");
            let _ = button.set_attribute("data-game", info.id.as_str());
            button.set_inner_html(&format!("<h3>{}</h3><p>{}</p>", info.name, info.description));

            let app = app.clone();
            let selector = info.id.as_str();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                if let Err(e) = a.cabinet.select(selector) {
                    log::warn!("{}", e);
                }
            });
            let _ =
                button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();

            let _ = menu.append_child(&button);
        }
        Ok(())
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut a = app.borrow_mut();
            let name = event.key();
            // Cabinet shortcuts work from the menu too
            let settings_changed = match name.as_str() {
                "i" | "I" => {
                    a.cabinet.toggle_demo();
                    return;
                }
                "m" | "M" => {
                    a.cabinet.toggle_mute();
                    true
                }
                "s" | "S" => {
                    a.cabinet.cycle_speed();
                    true
                }
                "-" | "_" => {
                    a.cabinet.adjust_volume(-VOLUME_STEP);
                    true
                }
                "=" | "+" => {
                    a.cabinet.adjust_volume(VOLUME_STEP);
                    true
                }
                _ => false,
            };
            if settings_changed {
                let settings = a.cabinet.settings().clone();
                a.audio.apply_settings(&settings);
                return;
            }
            let Some(key) = Key::from_key_name(&name) else {
                return;
            };
            let Some(over) = a.cabinet.current().map(|g| g.phase().is_over()) else {
                return;
            };
            // Arrow keys and space would otherwise scroll the page
            if key.is_navigation() {
                event.prevent_default();
            }
            a.audio.resume();
            if over && key == Key::Enter {
                a.cabinet.restart();
            } else {
                a.cabinet.key(key);
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("back-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().cabinet.back();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().cabinet.restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut a = app.borrow_mut();
                if hidden && a.cabinet.settings().pause_on_blur {
                    a.cabinet.set_paused(true);
                    log::info!("Auto-paused (tab hidden)");
                }
                // Frame deltas across the hidden period are meaningless
                a.last_time = 0.0;
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.cabinet.settings().pause_on_blur {
                    a.cabinet.set_paused(true);
                }
                if a.cabinet.settings().mute_on_blur {
                    a.audio.set_blurred(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().audio.set_blurred(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            let dt = if a.last_time > 0.0 {
                time - a.last_time
            } else {
                FIRST_FRAME_MS
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                a.update_hud(&document);
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Retro Arcade failed to start: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> retro_arcade::Result<()> {
    use retro_arcade::{GameId, GamePhase};

    env_logger::init();
    log::info!("Retro Arcade (native) starting...");
    log::info!("Rendering needs a browser - running the attract-mode autopilot headlessly");

    let games: Vec<GameId> = match std::env::args().nth(1) {
        Some(arg) => vec![arg.parse()?],
        None => GameId::ALL.to_vec(),
    };

    println!("\n{:<16} {:<8} {:>8} {:>8}", "GAME", "RESULT", "SCORE", "TICKS");
    for id in games {
        let run = attract::run(id, 0x5EED);
        let result = match run.phase {
            GamePhase::Playing => "timeout",
            GamePhase::Won => "won",
            GamePhase::Lost => "lost",
        };
        println!("{:<16} {:<8} {:>8} {:>8}", id.as_str(), result, run.score, run.ticks);
        for line in run.summary {
            log::info!("  {}", line);
        }
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod attract {
    use retro_arcade::{Cabinet, GameId, GamePhase, HighScores, Settings};

    /// Frame length fed to the cabinet (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much game time (ms)
    const MAX_GAME_MS: f64 = 10.0 * 60.0 * 1000.0;

    pub struct AttractRun {
        pub phase: GamePhase,
        pub score: u32,
        pub ticks: u64,
        pub summary: Vec<String>,
    }

    /// Let the autopilot play one game until it ends or time runs out
    pub fn run(id: GameId, seed: u64) -> AttractRun {
        let mut cabinet = Cabinet::new(seed, Settings::default(), HighScores::new());
        cabinet.mount(id);
        cabinet.set_demo(true);

        let mut now = 0.0;
        let mut ticks = 0u64;
        while now < MAX_GAME_MS {
            now += FRAME_MS;
            ticks += cabinet.advance(FRAME_MS, now) as u64;
            if cabinet.current().is_some_and(|g| g.phase().is_over()) {
                break;
            }
        }

        let events = cabinet.drain_events().len();
        log::debug!("{}: {} events", id, events);

        match cabinet.current() {
            Some(game) => AttractRun {
                phase: game.phase(),
                score: game.score(),
                ticks,
                summary: game.summary(),
            },
            None => AttractRun {
                phase: GamePhase::Playing,
                score: 0,
                ticks,
                summary: Vec::new(),
            },
        }
    }
}
