//! `fetch` calls to the upload collaborator.

use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, HtmlFormElement, RequestInit, Response};

use super::dom;
use crate::config::VisualizerVariables;
use crate::error::{PresetError, Result};
use crate::preset::PresetKind;
use crate::upload::{
    self, UploadResponse, ACTIVE_VARS_ENDPOINT, PRESET_ENDPOINT, UPLOAD_ENDPOINT, UPLOAD_FIELD,
};

fn http_err(url: &str) -> impl Fn(JsValue) -> PresetError + '_ {
    move |e| PresetError::Http {
        url: url.to_owned(),
        reason: format!("{e:?}"),
    }
}

/// Returns `(response.ok, body)`.
async fn fetch_text(url: &str, init: Option<&RequestInit>) -> Result<(bool, String)> {
    let window = dom::window()?;
    let promise = match init {
        Some(init) => window.fetch_with_str_and_init(url, init),
        None => window.fetch_with_str(url),
    };
    let response: Response = JsFuture::from(promise)
        .await
        .map_err(http_err(url))?
        .dyn_into()
        .map_err(http_err(url))?;
    let body = JsFuture::from(response.text().map_err(http_err(url))?)
        .await
        .map_err(http_err(url))?
        .as_string()
        .unwrap_or_default();
    debug!("{url} -> {}", response.status());
    Ok((response.ok(), body))
}

async fn fetch_ok(url: &str) -> Result<String> {
    let (ok, body) = fetch_text(url, None).await?;
    if !ok {
        return Err(PresetError::Http {
            url: url.to_owned(),
            reason: "unsuccessful status".into(),
        });
    }
    Ok(body)
}

/// Collect the form's fields; it must carry the audio file.
pub fn upload_form(form: &HtmlFormElement) -> Result<FormData> {
    let data = FormData::new_with_form(form).map_err(http_err(UPLOAD_ENDPOINT))?;
    if !data.has(UPLOAD_FIELD) {
        return Err(PresetError::Upload(format!(
            "form has no `{UPLOAD_FIELD}` field"
        )));
    }
    Ok(data)
}

pub async fn post_upload(data: &FormData) -> Result<UploadResponse> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(data);
    let (ok, body) = fetch_text(UPLOAD_ENDPOINT, Some(&init)).await?;
    UploadResponse::from_body(ok, &body)
}

pub async fn fetch_vars(url: &str) -> Result<VisualizerVariables> {
    let body = fetch_ok(url).await?;
    Ok(upload::parse_vars_module(&body)?)
}

pub async fn fetch_preset() -> Result<PresetKind> {
    upload::parse_preset_reply(&fetch_ok(PRESET_ENDPOINT).await?)
}

pub async fn fetch_active_vars() -> Result<Option<String>> {
    upload::parse_active_vars_reply(&fetch_ok(ACTIVE_VARS_ENDPOINT).await?)
}
