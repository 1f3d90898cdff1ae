use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlCanvasElement, Window};

use super::audio::AudioTap;
use super::dom;
use super::gl::Pipeline;
use crate::analysis::AnalysisBuffer;
use crate::config::PresetParams;
use crate::error::{PresetError, Result};
use crate::lifecycle::{FrameGate, LoopClock, StopToken, Stoppable};
use crate::preset::PresetKind;

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running preset. Stopping cancels the pending frame, detaches the
/// resize listener and frees the pipeline.
pub struct PresetHandle {
    kind: PresetKind,
    window: Window,
    token: StopToken,
    raf_id: Rc<Cell<Option<i32>>>,
    frame: FrameSlot,
    resize: Closure<dyn FnMut()>,
}

impl Stoppable for PresetHandle {
    fn stop(&self) {
        if self.token.is_stopped() {
            return;
        }
        self.token.stop();
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref());
        // Breaks the closure's reference to its own slot.
        self.frame.borrow_mut().take();
        debug!("{} loop released", self.kind);
    }

    fn is_stopped(&self) -> bool {
        self.token.is_stopped()
    }
}

impl Drop for PresetHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn fit_to_window(window: &Window, canvas: &HtmlCanvasElement) {
    let size = |v: wasm_bindgen::JsValue| v.as_f64().unwrap_or(0.0) as u32;
    if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
        canvas.set_width(size(w));
        canvas.set_height(size(h));
    }
}

fn request_frame(window: &Window, slot: &FrameSlot) -> Result<i32> {
    let slot = slot.borrow();
    let callback = slot.as_ref().ok_or(PresetError::Resource("frame callback"))?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|e| PresetError::Context(format!("request_animation_frame: {e:?}")))
}

/// Arm the per-frame loop: refresh samples, upload, draw, reschedule.
pub fn run(
    kind: PresetKind,
    params: &PresetParams,
    canvas: HtmlCanvasElement,
    pipeline: Pipeline,
    tap: Rc<AudioTap>,
) -> Result<PresetHandle> {
    let window = dom::window()?;

    // Resize canvas to fit window
    fit_to_window(&window, &canvas);
    let resize = {
        let window = window.clone();
        Closure::wrap(Box::new(move || fit_to_window(&window, &canvas)) as Box<dyn FnMut()>)
    };
    window
        .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
        .map_err(|e| PresetError::Context(format!("resize listener: {e:?}")))?;

    let token = StopToken::new();
    let mut gate = FrameGate::new(token.clone());
    gate.arm();
    let clock = LoopClock::new(dom::now(&window), params.time_scale);
    let clear = kind.clear_color(params);
    let mut samples = AnalysisBuffer::new(kind.analysis(), params.bar_count);

    // `f` holds the animation-frame closure so it can reschedule itself.
    let f: FrameSlot = Rc::new(RefCell::new(None));
    let g = f.clone();
    let raf_id = Rc::new(Cell::new(None));
    let next_id = raf_id.clone();
    let frame_window = window.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        if !gate.begin_frame() {
            return;
        }
        samples.refresh(tap.as_ref());
        if let Err(e) = pipeline.upload(samples.as_slice()) {
            warn!("{kind}: {e}");
        }
        pipeline.draw(clock.elapsed(now), clear);

        match request_frame(&frame_window, &f) {
            Ok(id) => next_id.set(Some(id)),
            Err(e) => error!("{kind}: {e}"),
        }
    }) as Box<dyn FnMut(f64)>));

    let handle = PresetHandle {
        kind,
        window,
        token,
        raf_id,
        frame: g,
        resize,
    };
    let id = request_frame(&handle.window, &handle.frame)?;
    handle.raf_id.set(Some(id));
    Ok(handle)
}
