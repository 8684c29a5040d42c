// Browser tests for the JS-facing API. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use cinema_core::playback::{JsMediaElement, MediaElement};
use cinema_core::{paginate_js, ConsoleLog, CoreError, ErrorLog, WasmCatalog, WasmFilterSet};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const MOVIES: &str = r#"[
    {"title": "Inception", "isan": "A-1", "filters": ["Popular", "Movie"], "releaseYear": 2010},
    {"title": "Interstellar", "isan": "A-2", "filters": ["Movie"], "releaseYear": 2014},
    {"title": "Memento", "isan": "A-3", "filters": ["Movie"], "releaseYear": 2000}
]"#;

fn fetch_returning(body: &'static str) -> js_sys::Function {
    let closure = Closure::wrap(Box::new(move |_url: JsValue| {
        js_sys::Promise::resolve(&JsValue::from_str(body))
    }) as Box<dyn FnMut(JsValue) -> js_sys::Promise>);
    let function: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    function
}

fn failing_fetch() -> js_sys::Function {
    js_sys::Function::new_with_args("url", "return Promise.reject('404 ' + url)")
}

#[wasm_bindgen_test]
fn paginate_returns_json_window() {
    assert_eq!(paginate_js(1.0, 9.0, 5.0).unwrap(), "[1,2,3,4,5]");
    assert!(paginate_js(10.0, 9.0, 5.0).is_err());
    assert!(paginate_js(1.5, 9.0, 5.0).is_err());
}

#[wasm_bindgen_test]
async fn catalog_query_through_promise() {
    let catalog = WasmCatalog::new(fetch_returning(MOVIES), "{}").unwrap();
    let result = JsFuture::from(catalog.query(r#"{"title":"in"}"#, "")).await.unwrap();
    let movies: serde_json::Value = serde_json::from_str(&result.as_string().unwrap()).unwrap();
    assert_eq!(movies.as_array().unwrap().len(), 2);

    let missing = JsFuture::from(catalog.query_by_id("".to_string())).await.unwrap();
    assert!(missing.is_null());
}

#[wasm_bindgen_test]
async fn catalog_load_failure_message() {
    let catalog = WasmCatalog::new(failing_fetch(), "{}").unwrap();
    let err = JsFuture::from(catalog.load()).await.unwrap_err();
    assert_eq!(
        err.as_string().unwrap(),
        CoreError::CatalogUnavailable { cause: String::new() }.to_string()
    );
}

#[wasm_bindgen_test]
fn filter_set_reports_toggles() {
    let mut filters = WasmFilterSet::new(r#"["Popular","Movie","Drama"]"#, "{}").unwrap();
    let event: serde_json::Value = serde_json::from_str(&filters.toggle_active("Drama").unwrap()).unwrap();
    assert_eq!(event["changed_filter_name"], "Drama");
    assert_eq!(event["active_filters"], serde_json::json!(["Drama", "Popular"]));
}

#[wasm_bindgen_test]
fn console_log_accepts_missing_error() {
    ConsoleLog.error(None);
    cinema_core::log_error(Some("visible in the browser console".to_string()));
}

fn media_with_play(body: &str) -> JsValue {
    let element = js_sys::Object::new();
    let play = js_sys::Function::new_no_args(body);
    js_sys::Reflect::set(&element, &JsValue::from_str("play"), &play).unwrap();
    js_sys::Reflect::set(&element, &JsValue::from_str("plays"), &JsValue::from(0)).unwrap();
    element.into()
}

fn plays(element: &JsValue) -> f64 {
    js_sys::Reflect::get(element, &JsValue::from_str("plays"))
        .unwrap()
        .as_f64()
        .unwrap()
}

#[wasm_bindgen_test]
async fn blocked_autoplay_is_swallowed() {
    let element = media_with_play("this.plays += 1; return Promise.reject('NotAllowedError');");
    let media = JsMediaElement::new(element.clone());
    media.play();
    media.play();
    JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL)).await.unwrap();
    assert_eq!(plays(&element), 2.0);
}
