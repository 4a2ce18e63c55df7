//! High-score persistence. The game only sees [`ScoreStore`]; the browser
//! build backs it with IndexedDB and falls back to [`MemoryStore`] when the
//! database cannot be opened.

use std::cell::{Cell, RefCell};
use std::fmt;

use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
mod indexed_db;
#[cfg(target_arch = "wasm32")]
pub use indexed_db::IndexedDbStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage backend does not exist in this environment.
    Unavailable(&'static str),
    /// A JS-side failure, carrying its message.
    Js(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(what) => write!(f, "storage unavailable: {what}"),
            StoreError::Js(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<JsValue> for StoreError {
    fn from(value: JsValue) -> Self {
        StoreError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Single-record high-score storage.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    /// Stored best score, 0 when nothing has been stored yet.
    async fn high_score(&self) -> Result<u32, StoreError>;
    /// Replace whatever is stored with `value`.
    async fn set_high_score(&self, value: u32) -> Result<(), StoreError>;
}

/// Persist `score` only if it strictly beats the stored value. Returns the
/// value written, or `None` when the store was left as is.
pub async fn submit_score<S: ScoreStore>(store: &S, score: u32) -> Result<Option<u32>, StoreError> {
    let stored = store.high_score().await?;
    if score <= stored {
        return Ok(None);
    }
    store.set_high_score(score).await?;
    Ok(Some(score))
}

/// In-process store. Used when IndexedDB is unavailable and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RefCell<Option<u32>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        Self { value: RefCell::new(Some(score)), writes: Cell::new(0) }
    }

    /// Number of successful `set_high_score` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ScoreStore for MemoryStore {
    async fn high_score(&self) -> Result<u32, StoreError> {
        Ok(self.value.borrow().unwrap_or(0))
    }

    async fn set_high_score(&self, value: u32) -> Result<(), StoreError> {
        *self.value.borrow_mut() = Some(value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
