//! Browser shell around [`GameLoop`]: canvas and sprite setup, the
//! `requestAnimationFrame` chain, input and visibility listeners, the restart
//! timer and high-score persistence.
//!
//! All shared state lives in one `Rc<RefCell<App>>` captured by the callbacks.
//! The browser never runs two of them at once, so borrows never overlap.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, window,
};

use crate::config::{GameConfig, Viewport};
use crate::render::CanvasRenderer;
use crate::runner::{Crash, FrameOutcome, GameLoop};
use crate::score_store::{IndexedDbStore, MemoryStore, ScoreStore, StoreError, submit_score};

const CANVAS_ID: &str = "gameCanvas";
const HIGH_SCORE_ID: &str = "highScore";
const CHARACTER_SPRITE: &str = "dino.png";
const OBSTACLE_SPRITE: &str = "tree.png";
const JUMP_KEYS: [&str; 2] = ["Space", "ArrowUp"];

// --- Store selection --------------------------------------------------------

/// IndexedDB when it opens, otherwise an in-memory fallback for the session.
enum BrowserStore {
    IndexedDb(IndexedDbStore),
    Memory(MemoryStore),
}

impl ScoreStore for BrowserStore {
    async fn high_score(&self) -> Result<u32, StoreError> {
        match self {
            BrowserStore::IndexedDb(db) => db.high_score().await,
            BrowserStore::Memory(mem) => mem.high_score().await,
        }
    }

    async fn set_high_score(&self, value: u32) -> Result<(), StoreError> {
        match self {
            BrowserStore::IndexedDb(db) => db.set_high_score(value).await,
            BrowserStore::Memory(mem) => mem.set_high_score(value).await,
        }
    }
}

// --- Shell state ------------------------------------------------------------

struct App {
    game: GameLoop<StdRng>,
    renderer: CanvasRenderer,
    store: Option<Rc<BrowserStore>>,
    frame_id: Option<i32>,
    restart_timer: Option<i32>,
    /// Sprites loaded; nothing runs before this.
    ready: bool,
}

impl App {
    /// Stop the frame chain and drop any pending restart.
    fn cancel_pending(&mut self) {
        let Some(win) = window() else { return };
        if let Some(id) = self.frame_id.take() {
            win.cancel_animation_frame(id).ok();
        }
        if let Some(id) = self.restart_timer.take() {
            win.clear_timeout_with_handle(id);
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[derive(Clone)]
struct Shell {
    app: Rc<RefCell<App>>,
    frame: FrameCallback,
}

pub fn start(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Sized once to the viewport; resizes are not tracked.
    let viewport = Viewport::new(
        win.inner_width()?.as_f64().unwrap_or(800.0),
        win.inner_height()?.as_f64().unwrap_or(600.0),
    );
    let canvas = game_canvas(&doc)?;
    canvas.set_width(viewport.width as u32);
    canvas.set_height(viewport.height as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let character_img = HtmlImageElement::new()?;
    let obstacle_img = HtmlImageElement::new()?;
    let renderer = CanvasRenderer::new(
        ctx,
        viewport,
        config.ground_offset,
        character_img.clone(),
        obstacle_img.clone(),
    );
    let game = GameLoop::new(config, viewport, now_ms(), StdRng::from_entropy());

    let shell = Shell::new(App {
        game,
        renderer,
        store: None,
        frame_id: None,
        restart_timer: None,
        ready: false,
    });
    shell.install_input(&doc)?;
    shell.install_visibility(&doc)?;
    shell.open_store();
    shell.load_sprites(&[(character_img, CHARACTER_SPRITE), (obstacle_img, OBSTACLE_SPRITE)])?;
    Ok(())
}

impl Shell {
    fn new(app: App) -> Self {
        let shell = Self {
            app: Rc::new(RefCell::new(app)),
            frame: Rc::new(RefCell::new(None)),
        };
        let tick = shell.clone();
        *shell.frame.borrow_mut() = Some(Closure::wrap(
            Box::new(move |ts: f64| tick.on_frame(ts)) as Box<dyn FnMut(f64)>
        ));
        shell
    }

    // --- Frame chain ---

    fn request_frame(&self) {
        let Some(win) = window() else { return };
        let frame = self.frame.borrow();
        let Some(callback) = frame.as_ref() else { return };
        match win.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => self.app.borrow_mut().frame_id = Some(id),
            Err(err) => console_error!("requestAnimationFrame failed: {err:?}"),
        }
    }

    fn on_frame(&self, ts: f64) {
        let outcome = {
            let mut app = self.app.borrow_mut();
            app.frame_id = None;
            let App { game, renderer, .. } = &mut *app;
            game.frame(ts, renderer)
        };
        match outcome {
            FrameOutcome::Continue => self.request_frame(),
            FrameOutcome::GameOver(crash) => self.on_crash(crash),
            FrameOutcome::Halted => {}
        }
    }

    // --- Restart ---

    /// Unconditional reset used by the first start and by visibility loss.
    fn restart(&self) {
        {
            let mut app = self.app.borrow_mut();
            if !app.ready {
                return;
            }
            app.cancel_pending();
            app.game.reset_and_start(now_ms());
        }
        self.request_frame();
    }

    /// Timer-driven reset; a no-op if something else reset the game first.
    fn restart_if_current(&self, generation: u64) {
        {
            let mut app = self.app.borrow_mut();
            app.restart_timer = None;
            if app.game.generation() != generation {
                return;
            }
            app.cancel_pending();
            app.game.restart_if_current(generation, now_ms());
        }
        self.request_frame();
    }

    fn on_crash(&self, crash: Crash) {
        if let Some(score) = crash.new_high_score {
            show_high_score(score);
            self.persist_high_score(score);
        }
        let delay = self.app.borrow().game.config().restart_delay_ms;
        let shell = self.clone();
        let callback = Closure::once_into_js(move || shell.restart_if_current(crash.generation));
        let Some(win) = window() else { return };
        match win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay) {
            Ok(id) => self.app.borrow_mut().restart_timer = Some(id),
            Err(err) => console_error!("failed to schedule restart: {err:?}"),
        }
    }

    // --- Score store ---

    fn open_store(&self) {
        let shell = self.clone();
        spawn_local(async move {
            let store = match IndexedDbStore::open().await {
                Ok(db) => BrowserStore::IndexedDb(db),
                Err(err) => {
                    console_error!("IndexedDB error: {err}");
                    BrowserStore::Memory(MemoryStore::default())
                }
            };
            let store = Rc::new(store);
            shell.app.borrow_mut().store = Some(store.clone());

            let stored = match store.high_score().await {
                Ok(stored) => stored,
                Err(err) => {
                    console_error!("Error retrieving high score: {err}");
                    return;
                }
            };
            console_log!("Retrieved high score: {stored}");
            let cached = {
                let mut app = shell.app.borrow_mut();
                app.game.apply_stored_high_score(stored);
                app.game.state().high_score
            };
            show_high_score(cached);
            // A run may have ended before the store finished opening.
            if cached > stored {
                shell.persist_high_score(cached);
            }
        });
    }

    fn persist_high_score(&self, score: u32) {
        let Some(store) = self.app.borrow().store.clone() else {
            console_log!("Score store not open yet; high score {score} kept in memory.");
            return;
        };
        spawn_local(async move {
            match submit_score(store.as_ref(), score).await {
                Ok(Some(written)) => console_log!("Updated high score: {written}"),
                Ok(None) => {}
                Err(err) => console_error!("Error storing high score: {err}"),
            }
        });
    }

    // --- DOM wiring ---

    fn jump(&self) {
        self.app.borrow_mut().game.apply_jump();
    }

    fn install_input(&self, doc: &Document) -> Result<(), JsValue> {
        for event in ["mousedown", "touchstart"] {
            let shell = self.clone();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
                shell.jump();
            }) as Box<dyn FnMut(_)>);
            doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let shell = self.clone();
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            if JUMP_KEYS.contains(&evt.code().as_str()) {
                shell.jump();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn install_visibility(&self, doc: &Document) -> Result<(), JsValue> {
        let shell = self.clone();
        let watched = doc.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if watched.hidden() {
                shell.restart();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Start the first run once every sprite has loaded. A failed load is
    /// logged and the game never starts.
    fn load_sprites(&self, sprites: &[(HtmlImageElement, &'static str)]) -> Result<(), JsValue> {
        let pending = Rc::new(Cell::new(sprites.len()));
        for (img, src) in sprites {
            let shell = self.clone();
            let remaining = pending.clone();
            let on_load = Closure::wrap(Box::new(move || {
                remaining.set(remaining.get().saturating_sub(1));
                if remaining.get() == 0 {
                    shell.app.borrow_mut().ready = true;
                    shell.restart();
                }
            }) as Box<dyn FnMut()>);
            img.set_onload(Some(on_load.as_ref().unchecked_ref()));
            on_load.forget();

            let src_name = *src;
            let on_error = Closure::wrap(Box::new(move || {
                console_error!("failed to load sprite {src_name}");
            }) as Box<dyn FnMut()>);
            img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
            on_error.forget();

            img.set_src(src);
        }
        Ok(())
    }
}

// --- Helpers ----------------------------------------------------------------

fn game_canvas(doc: &Document) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        return Ok(el.dyn_into()?);
    }
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_id(CANVAS_ID);
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&canvas)?;
    Ok(canvas)
}

/// Mirror the cached high score into the optional `#highScore` element.
fn show_high_score(score: u32) {
    if let Some(el) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(HIGH_SCORE_ID))
    {
        el.set_text_content(Some(&format!("High Score: {score}s")));
    }
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
