use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ChromeError {
    #[error("javascript error: {0}")]
    Js(String),
    #[error("no global `window` exists")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("required element missing: {0}")]
    MissingElement(&'static str),
    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<JsValue> for ChromeError {
    fn from(value: JsValue) -> Self {
        let msg = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        ChromeError::Js(msg)
    }
}
