//! Dino Run core crate.
//!
//! A canvas endless runner: the character jumps over trees scrolling in from
//! the right, survival time is the score, and the best score is persisted in
//! IndexedDB. The game loop (`runner`) is plain Rust and runs natively under
//! `cargo test`; the browser wiring (`web`) is only built for wasm32.

use wasm_bindgen::prelude::*;

// Logging goes to the browser console on wasm32 and to stderr in native tests.
macro_rules! console_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!($($arg)*);
    }};
}

#[allow(unused_macros)]
macro_rules! console_error {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!($($arg)*);
    }};
}

pub mod config;
pub mod render;
pub mod runner;
pub mod score_store;
#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{GameConfig, Params, Viewport};
pub use render::{Point, Rect, Renderer};
pub use runner::{Crash, FrameOutcome, GameLoop, GameState, RunPhase};
pub use score_store::{MemoryStore, ScoreStore, StoreError, submit_score};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start the game on `#gameCanvas` with default tuning.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    launch(GameConfig::default())
}

/// Start the game with a JSON tuning override, e.g. `{"game_speed": 3}`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json)
        .map_err(|err| JsValue::from_str(&format!("invalid game config: {err}")))?;
    launch(config)
}

#[cfg(target_arch = "wasm32")]
fn launch(config: GameConfig) -> Result<(), JsValue> {
    web::start(config)
}

#[cfg(not(target_arch = "wasm32"))]
fn launch(_config: GameConfig) -> Result<(), JsValue> {
    Err(JsValue::from_str("dino-run only runs in a browser"))
}
