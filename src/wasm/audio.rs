//! Analysis tap on the page's media element.

use log::{debug, info, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, AudioContextState, HtmlMediaElement, MediaElementAudioSourceNode,
};

use crate::analysis::{AnalyserSettings, AnalysisKind, SampleSource};
use crate::error::{PresetError, Result};

fn audio_err(e: JsValue) -> PresetError {
    PresetError::Audio(format!("{e:?}"))
}

/// `media -> analyser -> destination`.
///
/// A media element can feed only one source node for its whole life, so
/// the tap outlives individual presets and is reused while the element is.
pub struct AudioTap {
    context: AudioContext,
    analyser: AnalyserNode,
    media: HtmlMediaElement,
    _source: MediaElementAudioSourceNode,
}

impl AudioTap {
    pub fn attach(media: &HtmlMediaElement) -> Result<Self> {
        let context = AudioContext::new().map_err(audio_err)?;
        let source = context.create_media_element_source(media).map_err(audio_err)?;
        let analyser = context.create_analyser().map_err(audio_err)?;
        source.connect_with_audio_node(&analyser).map_err(audio_err)?;
        analyser
            .connect_with_audio_node(&context.destination())
            .map_err(audio_err)?;
        info!("audio tap attached");
        Ok(Self {
            context,
            analyser,
            media: media.clone(),
            _source: source,
        })
    }

    pub fn is_attached_to(&self, media: &HtmlMediaElement) -> bool {
        let ours: &JsValue = self.media.as_ref();
        let theirs: &JsValue = media.as_ref();
        ours == theirs
    }

    pub fn configure(&self, settings: &AnalyserSettings) {
        self.analyser.set_fft_size(settings.fft_size());
        debug!("analyser fft size {}", settings.fft_size());
    }

    /// Browsers create contexts suspended until a user gesture.
    pub async fn resume(&self) -> Result<()> {
        if self.context.state() == AudioContextState::Suspended {
            let promise = self.context.resume().map_err(audio_err)?;
            JsFuture::from(promise).await.map_err(audio_err)?;
        }
        Ok(())
    }
}

impl SampleSource for AudioTap {
    fn fill(&self, kind: AnalysisKind, out: &mut [u8]) {
        match kind {
            AnalysisKind::Frequency => self.analyser.get_byte_frequency_data(out),
            AnalysisKind::TimeDomain => self.analyser.get_byte_time_domain_data(out),
        }
    }
}

impl Drop for AudioTap {
    fn drop(&mut self) {
        if let Err(e) = self.context.close() {
            warn!("closing audio context: {e:?}");
        }
    }
}
