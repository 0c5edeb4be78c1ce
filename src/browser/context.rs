//! Visitor context read from the browser

use wasm_bindgen::JsValue;

use crate::core::lead::ClientContext;

/// Collect user agent, language, timezone and referrer of the current page
pub fn client_context() -> ClientContext {
    let Some(window) = web_sys::window() else {
        return ClientContext::default();
    };
    let navigator = window.navigator();

    ClientContext {
        user_agent: navigator.user_agent().unwrap_or_default(),
        language: navigator.language().unwrap_or_default(),
        timezone: resolved_timezone().unwrap_or_else(|| "UTC".to_string()),
        referrer: window
            .document()
            .map(|document| document.referrer())
            .filter(|referrer| !referrer.is_empty()),
    }
}

fn resolved_timezone() -> Option<String> {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    js_sys::Reflect::get(&format.resolved_options(), &JsValue::from_str("timeZone"))
        .ok()?
        .as_string()
}
