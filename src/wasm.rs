//! WASM bindings for the browser front end.
//!
//! Inputs and outputs cross the boundary as strings: page and glossary HTML
//! in, JSON out.

use wasm_bindgen::prelude::*;

use crate::{Glossary, UserSettings, parse_glossary, transform_page};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse the glossary appendix page.
///
/// Returns the term map as JSON, ready to pass back to [`render_page`].
#[wasm_bindgen]
pub fn build_glossary(html: &str) -> Result<String, JsValue> {
    parse_glossary(html).to_json().map_err(js_err)
}

/// Transform a page.
///
/// `glossary_json` and `settings_json` may be empty, meaning no glossary
/// and default settings. Returns the page output as JSON.
#[wasm_bindgen]
pub fn render_page(html: &str, glossary_json: &str, settings_json: &str) -> Result<String, JsValue> {
    let glossary = if glossary_json.trim().is_empty() {
        Glossary::new()
    } else {
        Glossary::from_json(glossary_json).map_err(js_err)?
    };
    let settings = if settings_json.trim().is_empty() {
        UserSettings::default()
    } else {
        UserSettings::from_json(settings_json).map_err(js_err)?
    };

    transform_page(html, &glossary, &settings)
        .to_json(false)
        .map_err(js_err)
}

/// Default settings as JSON, for a first-run settings store.
#[wasm_bindgen]
pub fn default_settings() -> Result<String, JsValue> {
    UserSettings::default().to_json().map_err(js_err)
}
