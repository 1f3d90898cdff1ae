//! Visualizer variables: the flat configuration object handed to a preset.
//!
//! [`VisualizerVariables`] mirrors the wire form, where every key may be
//! absent or `null`. [`PresetParams`] is the resolved form a preset runs
//! with; only `bar_count` and the two base colours have no fallback.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ConfigError;

pub const DEFAULT_CLEAR_COLOR: &str = "#000000";
pub const DEFAULT_TIME_SCALE: f32 = 1.0;
pub const DEFAULT_INTENSITY_GAMMA: f32 = 1.0;
pub const DEFAULT_ACTIVATION_THRESHOLD: f32 = 1.2;
pub const DEFAULT_DROP_SPACING: (f32, f32) = (0.05, 0.2);
pub const DEFAULT_FALL_SPEED: (f32, f32) = (0.5, 4.0);
pub const DEFAULT_DROP_HEIGHT: (f32, f32) = (0.05, 0.3);
pub const DEFAULT_BASE_RADIUS: f32 = 0.4;
pub const DEFAULT_EDGE_SOFTNESS: (f32, f32) = (0.02, 0.021);

/// Raw configuration as produced by the variables generator.
///
/// Unknown keys are ignored so that generator-only fields (such as
/// `line_thickness`) do not break deserialisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerVariables {
    pub bar_count: Option<u32>,
    pub clear_color: Option<String>,
    pub time_scale: Option<f32>,
    pub base_color_low: Option<String>,
    pub base_color_high: Option<String>,
    pub intensity_gamma: Option<f32>,
    pub base_radius: Option<f32>,
    pub radius_scale: Option<f32>,
    pub drop_height_min: Option<f32>,
    pub drop_height_max: Option<f32>,
    pub fall_speed_min: Option<f32>,
    pub fall_speed_max: Option<f32>,
    pub drop_spacing_min: Option<f32>,
    pub drop_spacing_max: Option<f32>,
    pub activation_threshold: Option<f32>,
    pub edge_softness_inner: Option<f32>,
    pub edge_softness_outer: Option<f32>,
}

/// Fully resolved preset parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetParams {
    pub bar_count: u32,
    pub clear_color: Rgb,
    pub time_scale: f32,
    pub base_color_low: Rgb,
    pub base_color_high: Rgb,
    pub intensity_gamma: f32,
    pub base_radius: f32,
    /// Left unresolved: the fallback depends on the preset.
    pub radius_scale: Option<f32>,
    pub drop_height: (f32, f32),
    pub fall_speed: (f32, f32),
    pub drop_spacing: (f32, f32),
    pub activation_threshold: f32,
    pub edge_softness: (f32, f32),
}

fn color(field: &'static str, value: &str) -> Result<Rgb, ConfigError> {
    Rgb::from_hex(value).map_err(|source| ConfigError::Color { field, source })
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::Missing(field))
}

impl VisualizerVariables {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate and fill in fallbacks.
    pub fn resolve(&self) -> Result<PresetParams, ConfigError> {
        let bar_count = self.bar_count.ok_or(ConfigError::Missing("bar_count"))?;
        if bar_count == 0 {
            return Err(ConfigError::InvalidBarCount(bar_count));
        }
        let base_color_low = color("base_color_low", required("base_color_low", &self.base_color_low)?)?;
        let base_color_high =
            color("base_color_high", required("base_color_high", &self.base_color_high)?)?;
        let clear_color = color(
            "clear_color",
            self.clear_color.as_deref().unwrap_or(DEFAULT_CLEAR_COLOR),
        )?;

        let pair = |lo: Option<f32>, hi: Option<f32>, dflt: (f32, f32)| {
            (lo.unwrap_or(dflt.0), hi.unwrap_or(dflt.1))
        };

        Ok(PresetParams {
            bar_count,
            clear_color,
            time_scale: self.time_scale.unwrap_or(DEFAULT_TIME_SCALE),
            base_color_low,
            base_color_high,
            intensity_gamma: self.intensity_gamma.unwrap_or(DEFAULT_INTENSITY_GAMMA),
            base_radius: self.base_radius.unwrap_or(DEFAULT_BASE_RADIUS),
            radius_scale: self.radius_scale,
            drop_height: pair(self.drop_height_min, self.drop_height_max, DEFAULT_DROP_HEIGHT),
            fall_speed: pair(self.fall_speed_min, self.fall_speed_max, DEFAULT_FALL_SPEED),
            drop_spacing: pair(self.drop_spacing_min, self.drop_spacing_max, DEFAULT_DROP_SPACING),
            activation_threshold: self
                .activation_threshold
                .unwrap_or(DEFAULT_ACTIVATION_THRESHOLD),
            edge_softness: pair(
                self.edge_softness_inner,
                self.edge_softness_outer,
                DEFAULT_EDGE_SOFTNESS,
            ),
        })
    }
}

impl PresetParams {
    pub fn radius_scale_or(&self, fallback: f32) -> f32 {
        self.radius_scale.unwrap_or(fallback)
    }
}
