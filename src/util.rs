// Console logging helpers. Native builds (unit tests) go to stderr since the
// console bindings are only callable from wasm.

#[cfg(target_arch = "wasm32")]
pub fn clog(msg: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn clog(msg: &str) {
    eprintln!("{}", msg);
}

#[cfg(target_arch = "wasm32")]
pub fn cwarn(msg: &str) {
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn cwarn(msg: &str) {
    eprintln!("warn: {}", msg);
}

/// Only emitted when the page config turns `debug` on.
pub fn cdebug(enabled: bool, msg: &str) {
    if enabled {
        clog(&format!("[debug] {}", msg));
    }
}

/// `"#about"` -> `Some("about")`. Bare `"#"` and non-fragment hrefs give `None`.
pub fn fragment_of(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() { None } else { Some(id) }
}
