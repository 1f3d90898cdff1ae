use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::error::{PresetError, Result};

pub const CANVAS_ID: &str = "gl";
pub const AUDIO_ID: &str = "audio";

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(PresetError::Dom {
        id: "window",
        reason: "no global window".into(),
    })
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(PresetError::Dom {
        id: "document",
        reason: "window has no document".into(),
    })
}

/// Look up `#id` and cast it to the expected element type.
pub fn element<T: JsCast>(document: &Document, id: &'static str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| PresetError::Dom {
            id,
            reason: "not found".into(),
        })?
        .dyn_into::<T>()
        .map_err(|_| PresetError::Dom {
            id,
            reason: "unexpected element type".into(),
        })
}

/// `performance.now()` in milliseconds, 0 if unavailable.
pub fn now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}
