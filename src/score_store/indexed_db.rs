// IndexedDB-backed score store: one object store holding at most one
// `{ id, score }` row, replaced with clear + add on every write.
use js_sys::{Array, Object, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    IdbDatabase, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest, IdbTransaction,
    IdbTransactionMode, IdbVersionChangeEvent, window,
};

use super::{ScoreStore, StoreError};

pub const DB_NAME: &str = "dinoGameDB";
pub const DB_VERSION: u32 = 1;
pub const SCORE_STORE_NAME: &str = "scores";
const SCORE_FIELD: &str = "score";

pub struct IndexedDbStore {
    db: IdbDatabase,
}

impl IndexedDbStore {
    /// Open (and on first use create) the score database.
    pub async fn open() -> Result<Self, StoreError> {
        Self::open_named(DB_NAME).await
    }

    pub async fn open_named(name: &str) -> Result<Self, StoreError> {
        let factory = window()
            .ok_or(StoreError::Unavailable("no window"))?
            .indexed_db()?
            .ok_or(StoreError::Unavailable("indexedDB"))?;
        let request = factory.open_with_u32(name, DB_VERSION)?;

        let on_upgrade = Closure::<dyn FnMut(IdbVersionChangeEvent)>::new(|evt: IdbVersionChangeEvent| {
            console_log!("IndexedDB upgrade needed.");
            if let Err(err) = create_score_store(&evt) {
                console_error!("IndexedDB upgrade failed: {err:?}");
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
        let opened = request_done(&request).await;
        request.set_onupgradeneeded(None);
        drop(on_upgrade);

        let db: IdbDatabase = opened?.dyn_into()?;
        console_log!("IndexedDB opened successfully.");
        Ok(Self { db })
    }
}

impl ScoreStore for IndexedDbStore {
    async fn high_score(&self) -> Result<u32, StoreError> {
        let tx = self.db.transaction_with_str(SCORE_STORE_NAME)?;
        let store = tx.object_store(SCORE_STORE_NAME)?;
        let rows: Array = request_done(&store.get_all()?).await?.dyn_into()?;
        let best = rows
            .iter()
            .filter_map(|row| Reflect::get(&row, &JsValue::from_str(SCORE_FIELD)).ok()?.as_f64())
            .fold(0.0, f64::max);
        Ok(best as u32)
    }

    async fn set_high_score(&self, value: u32) -> Result<(), StoreError> {
        let tx = self
            .db
            .transaction_with_str_and_mode(SCORE_STORE_NAME, IdbTransactionMode::Readwrite)?;
        let store = tx.object_store(SCORE_STORE_NAME)?;
        store.clear()?;
        store.add(&score_record(value)?)?;
        transaction_done(&tx).await
    }
}

fn create_score_store(evt: &IdbVersionChangeEvent) -> Result<(), JsValue> {
    let request: IdbOpenDbRequest = evt.target().ok_or("upgrade event without target")?.dyn_into()?;
    let db: IdbDatabase = request.result()?.dyn_into()?;
    if !db.object_store_names().contains(SCORE_STORE_NAME) {
        let params = IdbObjectStoreParameters::new();
        params.set_key_path(Some(&JsValue::from_str("id")));
        params.set_auto_increment(true);
        db.create_object_store_with_optional_parameters(SCORE_STORE_NAME, &params)?;
    }
    Ok(())
}

fn score_record(value: u32) -> Result<Object, JsValue> {
    let record = Object::new();
    Reflect::set(&record, &JsValue::from_str(SCORE_FIELD), &JsValue::from(value))?;
    Ok(record)
}

/// Resolve once `request` fires success, yielding its result.
async fn request_done(request: &IdbRequest) -> Result<JsValue, StoreError> {
    let promise = Promise::new(&mut |resolve, reject| {
        request.set_onsuccess(Some(&resolve));
        request.set_onerror(Some(&reject));
    });
    let settled = JsFuture::from(promise).await;
    request.set_onsuccess(None);
    request.set_onerror(None);
    if settled.is_err() {
        let message = request
            .error()
            .ok()
            .flatten()
            .map(|e| e.message())
            .unwrap_or_else(|| "request failed".to_string());
        return Err(StoreError::Js(message));
    }
    Ok(request.result()?)
}

async fn transaction_done(tx: &IdbTransaction) -> Result<(), StoreError> {
    let promise = Promise::new(&mut |resolve, reject| {
        tx.set_oncomplete(Some(&resolve));
        tx.set_onerror(Some(&reject));
        tx.set_onabort(Some(&reject));
    });
    match JsFuture::from(promise).await {
        Ok(_) => Ok(()),
        Err(_) => Err(StoreError::Js(
            tx.error()
                .map(|e| e.message())
                .unwrap_or_else(|| "transaction aborted".to_string()),
        )),
    }
}
