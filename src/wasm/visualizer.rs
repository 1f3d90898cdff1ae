//! The JS-facing session object.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{HtmlCanvasElement, HtmlFormElement, HtmlMediaElement};

use super::audio::AudioTap;
use super::render::{self, PresetHandle};
use super::{dom, gl, remote};
use crate::analysis::AnalyserSettings;
use crate::error::{PresetError, Result};
use crate::lifecycle::{Session, StartAction};
use crate::preset::PresetKind;
use crate::upload::{self, uploads_url};

#[derive(Default)]
struct State {
    session: Session<PresetHandle>,
    tap: Option<Rc<AudioTap>>,
}

impl State {
    fn tap_for(&mut self, media: &HtmlMediaElement) -> Result<Rc<AudioTap>> {
        if let Some(tap) = &self.tap {
            if tap.is_attached_to(media) {
                return Ok(tap.clone());
            }
        }
        let tap = Rc::new(AudioTap::attach(media)?);
        self.tap = Some(tap.clone());
        Ok(tap)
    }
}

type Shared = Rc<RefCell<State>>;

/// Owns the running preset, the loaded variables and the audio tap.
///
/// Starting a preset stops the previous one first, so one page never runs
/// two frame loops.
#[wasm_bindgen]
pub struct Visualizer {
    state: Shared,
}

#[wasm_bindgen]
impl Visualizer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Visualizer {
        Visualizer {
            state: Rc::default(),
        }
    }

    /// Start preset `name`. `vars` replaces the session variables when
    /// given. Resolves to whether a frame loop was armed.
    pub fn start_preset(&self, name: String, vars: Option<String>) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let kind: PresetKind = name.parse()?;
            if let Some(text) = vars {
                let vars = upload::parse_vars_module(&text).map_err(PresetError::from)?;
                state.borrow_mut().session.set_vars(vars);
            }
            let armed = start(state, kind).await?;
            Ok(JsValue::from_bool(armed))
        })
    }

    /// Replace the session variables without starting anything.
    pub fn load_vars(&self, text: &str) -> std::result::Result<(), JsValue> {
        let vars = upload::parse_vars_module(text).map_err(PresetError::from)?;
        self.state.borrow_mut().session.set_vars(vars);
        Ok(())
    }

    pub fn stop(&self) -> bool {
        self.state.borrow_mut().session.stop()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().session.is_running()
    }

    /// Upload the form's audio, then reset the media element and the
    /// session to the new file. Resolves to the stored audio file name.
    pub fn submit_upload(&self, form: HtmlFormElement) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let reply = replace_audio(state, form).await?;
            Ok(JsValue::from_str(&reply))
        })
    }

    /// Ask the server which preset suits the current audio.
    pub fn fetch_preset(&self) -> Promise {
        future_to_promise(async move {
            let kind = remote::fetch_preset().await?;
            Ok(JsValue::from_str(kind.name()))
        })
    }

    /// Load the server's active variables file, if any. Resolves to
    /// whether one was loaded.
    pub fn load_active_vars(&self) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let Some(file) = remote::fetch_active_vars().await? else {
                return Ok(JsValue::FALSE);
            };
            let vars = remote::fetch_vars(&uploads_url(&file)).await?;
            state.borrow_mut().session.set_vars(vars);
            Ok(JsValue::TRUE)
        })
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

async fn start(state: Shared, kind: PresetKind) -> Result<bool> {
    let (ticket, params) = {
        let mut st = state.borrow_mut();
        let params = st.session.vars().ok_or(PresetError::NoConfig)?.resolve()?;
        (st.session.begin(), params)
    };
    let settings = AnalyserSettings::for_bar_count(params.bar_count)?;

    let document = dom::document()?;
    let canvas: HtmlCanvasElement = dom::element(&document, dom::CANVAS_ID)?;
    let media: HtmlMediaElement = dom::element(&document, dom::AUDIO_ID)?;

    let pipeline = gl::Pipeline::new(gl::context(&canvas)?, kind, &params)?;
    let tap = state.borrow_mut().tap_for(&media)?;
    tap.configure(&settings);
    tap.resume().await?;

    match StartAction::from_paused(media.paused()) {
        StartAction::Pause => {
            media
                .pause()
                .map_err(|e| PresetError::Playback(format!("{e:?}")))?;
            info!("{kind}: media was playing, paused instead of starting");
            return Ok(false);
        }
        StartAction::Play => {
            let playing = media
                .play()
                .map_err(|e| PresetError::Playback(format!("{e:?}")))?;
            JsFuture::from(playing)
                .await
                .map_err(|e| PresetError::Playback(format!("{e:?}")))?;
        }
    }

    let handle = render::run(kind, &params, canvas, pipeline, tap)?;
    let installed = state.borrow_mut().session.commit(ticket, handle);
    if installed {
        info!("{kind} running ({} samples)", params.bar_count);
    }
    Ok(installed)
}

async fn replace_audio(state: Shared, form: HtmlFormElement) -> Result<String> {
    let data = remote::upload_form(&form)?;
    let document = dom::document()?;
    let media: HtmlMediaElement = dom::element(&document, dom::AUDIO_ID)?;

    state.borrow_mut().session.invalidate();
    let _ = media.pause();
    media.set_current_time(0.0);
    let _ = media.remove_attribute("src");
    media.load();

    let reply = remote::post_upload(&data).await?;
    info!("uploaded {} with {}", reply.audio, reply.vars);

    // The tap stays bound to this element; only its source changes.
    media.set_src(&reply.audio_url());
    media.load();

    let vars = remote::fetch_vars(&reply.vars_url()).await?;
    state.borrow_mut().session.set_vars(vars);
    Ok(reply.audio)
}
