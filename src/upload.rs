//! Payloads exchanged with the upload collaborator.
//!
//! The server accepts a multipart form on [`UPLOAD_ENDPOINT`], stores the
//! audio under `uploads/` and writes a matching variables module next to
//! it. These types and parsers carry no browser dependency; the `fetch`
//! calls live in the wasm layer.

use serde::Deserialize;

use crate::config::VisualizerVariables;
use crate::error::{ConfigError, PresetError};
use crate::preset::PresetKind;

pub const UPLOAD_ENDPOINT: &str = "/upload";
pub const PRESET_ENDPOINT: &str = "/get-preset";
pub const ACTIVE_VARS_ENDPOINT: &str = "/active-vars";
pub const UPLOADS_DIR: &str = "uploads";
/// Multipart field name carrying the audio file.
pub const UPLOAD_FIELD: &str = "music";

/// Successful upload: the stored audio and its variables module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub audio: String,
    pub vars: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadReply {
    Accepted(UploadResponse),
    Rejected { error: String },
}

impl UploadResponse {
    /// Interpret the body of an upload reply.
    pub fn from_body(ok: bool, body: &str) -> Result<Self, PresetError> {
        let reply = serde_json::from_str::<UploadReply>(body).map_err(|e| {
            PresetError::Upload(format!("unreadable reply ({e})"))
        })?;
        match reply {
            UploadReply::Accepted(r) if ok => Ok(r),
            UploadReply::Accepted(_) => Err(PresetError::Upload("server reported failure".into())),
            UploadReply::Rejected { error } => Err(PresetError::Upload(error)),
        }
    }

    pub fn audio_url(&self) -> String {
        uploads_url(&self.audio)
    }

    pub fn vars_url(&self) -> String {
        uploads_url(&self.vars)
    }
}

pub fn uploads_url(file: &str) -> String {
    format!("{UPLOADS_DIR}/{file}")
}

#[derive(Debug, Deserialize)]
struct PresetRoute {
    script_path: String,
}

/// Parse the `{"script_path": "presets/<name>-script.js"}` reply.
pub fn parse_preset_reply(body: &str) -> Result<PresetKind, PresetError> {
    let route: PresetRoute = serde_json::from_str(body).map_err(ConfigError::from)?;
    PresetKind::from_script_path(&route.script_path)
}

#[derive(Debug, Deserialize)]
struct ActiveVars {
    vars: Option<String>,
}

/// Parse the `{"vars": "<file>" | null}` reply.
pub fn parse_active_vars_reply(body: &str) -> Result<Option<String>, PresetError> {
    let active: ActiveVars = serde_json::from_str(body).map_err(ConfigError::from)?;
    Ok(active.vars)
}

/// Parse a variables file, either plain JSON or the module form
/// `export const visualizerVariables = {...};`.
pub fn parse_vars_module(text: &str) -> Result<VisualizerVariables, ConfigError> {
    let text = text.trim();
    let json = match text.strip_prefix("export") {
        Some(rest) => {
            let (_, value) = rest.split_once('=').ok_or(ConfigError::Missing("visualizerVariables"))?;
            value.trim().trim_end_matches(';').trim_end()
        }
        None => text,
    };
    VisualizerVariables::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_upload() {
        let r = UploadResponse::from_body(
            true,
            r#"{"audio": "tempFile3.mp3", "vars": "visualizer_variables3.js"}"#,
        )
        .unwrap();
        assert_eq!(r.audio_url(), "uploads/tempFile3.mp3");
        assert_eq!(r.vars_url(), "uploads/visualizer_variables3.js");
    }

    #[test]
    fn rejected_upload_carries_message() {
        match UploadResponse::from_body(false, r#"{"error": "No selected file"}"#) {
            Err(PresetError::Upload(msg)) => assert_eq!(msg, "No selected file"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            UploadResponse::from_body(true, "<html>"),
            Err(PresetError::Upload(_))
        ));
    }

    #[test]
    fn preset_reply_resolves_kind() {
        let kind = parse_preset_reply(r#"{"script_path": "presets/heart-spectrum\n-script.js"}"#);
        assert_eq!(kind.unwrap(), PresetKind::HeartSpectrum);
    }

    #[test]
    fn active_vars_may_be_null() {
        assert_eq!(parse_active_vars_reply(r#"{"vars": null}"#).unwrap(), None);
        assert_eq!(
            parse_active_vars_reply(r#"{"vars": "visualizer_variables1.js"}"#).unwrap(),
            Some("visualizer_variables1.js".to_owned())
        );
    }

    #[test]
    fn vars_module_and_plain_json() {
        let module = "export const visualizerVariables = {\"bar_count\": 64, \
                      \"base_color_low\": \"#000000\", \"base_color_high\": \"#ff00ff\"};\n";
        let v = parse_vars_module(module).unwrap();
        assert_eq!(v.bar_count, Some(64));
        assert_eq!(v.base_color_high.as_deref(), Some("#ff00ff"));

        let v = parse_vars_module(r#"{"bar_count": 32}"#).unwrap();
        assert_eq!(v.bar_count, Some(32));

        assert!(parse_vars_module("export const nothing;").is_err());
    }

    #[test]
    fn page_form_uses_upload_field() {
        let page = include_str!("../static/index.html");
        assert!(page.contains(&format!("name=\"{UPLOAD_FIELD}\"")));
    }
}
