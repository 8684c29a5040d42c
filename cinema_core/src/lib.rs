// cinema_core: Rust/WASM core of the movie browser.
// Catalog queries, filters, pagination and playback state live here; JS renders.

mod carousel;
mod catalog;
mod config;
mod error;
mod filters;
mod loader;
mod log;
mod matcher;
mod pagination;
pub mod playback;
mod timer;
mod types;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use carousel::{load_heroes, HeroCarousel, HeroService, WasmHeroCarousel};
pub use catalog::{Catalog, CatalogService, QueryOptions, ResultPage, WasmCatalog};
pub use config::CoreConfig;
pub use error::{CoreError, FetchError, Result};
pub use filters::{
    load_filter_set, Filter, FilterChangeEvent, FilterNames, FilterService, FilterSet, WasmFilterSet,
};
pub use loader::{DataSource, JsonFetch, Resource, StaticSource};
pub use log::{message_for, ConsoleLog, ErrorLog, TracingLog};
pub use matcher::{matches, satisfies, Criterion, NumberField, TagField, TextField};
pub use pagination::{paginate, paginate_js, total_pages, PageNo, Paginator, WasmPaginator};
pub use playback::{
    ExclusiveMenu, MediaElement, PlaybackClock, PlayerState, TimeFormat, VideoPlayer, WasmVideoPlayer,
};
pub use timer::{BrowserScheduler, Debouncer, ManualScheduler, Scheduler, TimerId};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Report an error to the browser console. A missing message logs the
/// generic fallback.
#[wasm_bindgen]
pub fn log_error(message: Option<String>) {
    match message {
        Some(message) => ConsoleLog.error(Some(&message)),
        None => ConsoleLog.error(None),
    }
}

/// Errors cross into JS as their display string.
pub(crate) fn to_js(err: CoreError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn json_string<T: Serialize + ?Sized>(value: &T) -> std::result::Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| to_js(e.into()))
}

/// JSON text as a JS string, for promise results.
pub(crate) fn json_value<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsValue> {
    json_string(value).map(|json| JsValue::from_str(&json))
}
