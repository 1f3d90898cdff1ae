//! Audio-reactive shader presets for the browser.
//!
//! The host-compilable modules hold everything that does not touch the
//! DOM: configuration, preset strategies and their CPU reference shading,
//! analyser sizing, loop gating and the upload payloads. The `wasm` module
//! wires them to WebGL2 and Web Audio.

pub mod analysis;
pub mod color;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod preset;
pub mod shading;
pub mod upload;

pub use color::Rgb;
pub use config::{PresetParams, VisualizerVariables};
pub use error::{ConfigError, PresetError};
pub use preset::PresetKind;

// Only compile browser-facing code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::error::PresetError;

    mod audio;
    mod dom;
    mod gl;
    mod remote;
    mod render;
    mod visualizer;

    pub use visualizer::Visualizer;

    impl From<PresetError> for JsValue {
        fn from(e: PresetError) -> Self {
            log::error!("{e}");
            js_sys::Error::new(&e.to_string()).into()
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("viz_presets loaded");
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::Visualizer;
