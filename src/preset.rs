//! Preset strategies.
//!
//! Every preset shares one pipeline: a full-screen triangle, a `N x 1`
//! luminance texture of analysis samples and a fragment shader. What varies
//! is the fragment body, which analyser array feeds it and the uniforms it
//! reads. Configuration never enters shader text; it is all uniforms.

use std::fmt;
use std::str::FromStr;

use crate::analysis::AnalysisKind;
use crate::color::Rgb;
use crate::config::PresetParams;
use crate::error::PresetError;

pub const VERTEX_SHADER: &str = r#"
attribute vec2 a_position;
varying vec2 v_uv;
void main() {
  v_uv = (a_position + 1.0) * 0.5;
  gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

/// Oversized triangle covering the whole viewport.
pub const FULLSCREEN_TRIANGLE: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];

pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const SAMPLER_UNIFORM: &str = "u_samples";
pub const TIME_UNIFORM: &str = "u_time";

const FRAGMENT_PRELUDE: &str = r#"
precision mediump float;
varying vec2 v_uv;
uniform sampler2D u_samples;
uniform float u_sampleCount;
uniform float u_time;
uniform vec3 u_baseLow;
uniform vec3 u_baseHigh;
uniform float u_gamma;

float sampleAt(float index) {
  return texture2D(u_samples, vec2((index + 0.5) / u_sampleCount, 0.5)).r;
}

float angleBucket(vec2 p) {
  float t = (atan(p.y, p.x) + 3.14159265) / 6.2831853;
  return clamp(floor(t * u_sampleCount), 0.0, u_sampleCount - 1.0);
}

float hash(float n) {
  return fract(sin(n * 91.3458) * 43758.5453);
}

float heart(vec2 p, float scale) {
  p *= scale;
  float q = p.x * p.x + p.y * p.y - 1.0;
  return q * q * q - p.x * p.x * p.y * p.y * p.y;
}
"#;

const BAR_BODY: &str = r#"
void main() {
  float a = sampleAt(floor(v_uv.x * u_sampleCount));
  float covered = step(v_uv.y, a);
  vec3 color = mix(u_baseLow, u_baseHigh, a);
  gl_FragColor = vec4(pow(color, vec3(u_gamma)) * covered, 1.0);
}
"#;

const WAVEFORM_BODY: &str = r#"
uniform vec2 u_edge;
void main() {
  float signal = sampleAt(floor(v_uv.x * u_sampleCount)) * 2.0 - 1.0;
  float d = abs(signal - (v_uv.y * 2.0 - 1.0));
  float line = 1.0 - smoothstep(u_edge.x, u_edge.y, d);
  gl_FragColor = vec4(pow(vec3(line) * u_baseHigh, vec3(u_gamma)), 1.0);
}
"#;

const RADIAL_WAVEFORM_BODY: &str = r#"
uniform vec2 u_radius;
void main() {
  vec2 p = v_uv * 2.0 - 1.0;
  float signal = sampleAt(angleBucket(p)) * 2.0 - 1.0;
  float d = abs(length(p) - (u_radius.x + signal * u_radius.y));
  float brightness = 1.0 - smoothstep(0.01, 0.03, d);
  gl_FragColor = vec4(pow(u_baseHigh, vec3(u_gamma)) * brightness, 1.0);
}
"#;

const RADIAL_SPECTRUM_BODY: &str = r#"
uniform vec2 u_radius;
void main() {
  vec2 p = v_uv * 2.0 - 1.0;
  float a = sampleAt(angleBucket(p));
  float d = abs(length(p) - (u_radius.x + a * u_radius.y));
  float brightness = 1.0 - smoothstep(0.01, 0.03, d);
  vec3 color = mix(u_baseLow, u_baseHigh, a);
  gl_FragColor = vec4(pow(color, vec3(u_gamma)) * brightness, 1.0);
}
"#;

const HEART_SPECTRUM_BODY: &str = r#"
void main() {
  vec2 p = v_uv * 2.0 - 1.0;
  float a = sampleAt(angleBucket(p));
  float d = abs(heart(p, 1.6)) * 3.0 - a * 0.5;
  float intensity = 1.0 - smoothstep(0.0, 0.05, d);
  gl_FragColor = vec4(pow(u_baseHigh, vec3(u_gamma)) * intensity, 1.0);
}
"#;

const HEART_WAVEFORM_BODY: &str = r#"
uniform vec2 u_radius;
void main() {
  vec2 p = v_uv * 2.0 - 1.0;
  float signal = sampleAt(angleBucket(p)) * 2.0 - 1.0;
  float d = abs(heart(p, u_radius.y) - signal * 0.5);
  float intensity = 1.0 - smoothstep(0.01, 0.03, d);
  gl_FragColor = vec4(pow(u_baseHigh, vec3(u_gamma)) * intensity, 1.0);
}
"#;

const RAIN_BODY: &str = r#"
uniform float u_threshold;
uniform vec2 u_dropSpacing;
uniform vec2 u_fallSpeed;
uniform vec2 u_dropHeight;
void main() {
  float column = floor(v_uv.x * u_sampleCount);
  float a = sampleAt(column);
  if (column < 0.5) a = max(a - 0.05, 0.0);
  if (a <= 0.0 || hash(column * 7.123) > a * u_threshold) discard;

  float spacing = mix(u_dropSpacing.x, u_dropSpacing.y, a);
  float speed = mix(u_fallSpeed.x, u_fallSpeed.y, a);
  float y = fract(v_uv.y + u_time * speed + hash(column + 1.0));
  float height = mix(u_dropHeight.x, u_dropHeight.y, hash(column * 11.5));
  float shape = smoothstep(height, height * 0.7, abs(fract(y / spacing) - 0.5));

  vec3 color = mix(u_baseLow, u_baseHigh, column / u_sampleCount);
  gl_FragColor = vec4(pow(color, vec3(u_gamma)) * shape, 1.0);
}
"#;

/// Fallback `radius_scale` for the radial presets.
pub const RADIAL_RADIUS_SCALE: f32 = 0.2;
/// Fallback `radius_scale` for the heart waveform, where it scales the shape.
pub const HEART_RADIUS_SCALE: f32 = 1.5;

/// A uniform value as uploaded to the program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// One selectable visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Bar,
    Waveform,
    RadialWaveform,
    RadialSpectrum,
    HeartSpectrum,
    HeartWaveform,
    Rain,
}

impl PresetKind {
    pub const ALL: [PresetKind; 7] = [
        Self::Bar,
        Self::Waveform,
        Self::RadialWaveform,
        Self::RadialSpectrum,
        Self::HeartSpectrum,
        Self::HeartWaveform,
        Self::Rain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar => "bar-spectrum",
            Self::Waveform => "waveform",
            Self::RadialWaveform => "radial-waveform",
            Self::RadialSpectrum => "radial-spectrum",
            Self::HeartSpectrum => "heart-spectrum",
            Self::HeartWaveform => "heart-waveform",
            Self::Rain => "rain-spectrum",
        }
    }

    pub fn analysis(&self) -> AnalysisKind {
        match self {
            Self::Waveform | Self::RadialWaveform | Self::HeartWaveform => AnalysisKind::TimeDomain,
            Self::Bar | Self::RadialSpectrum | Self::HeartSpectrum | Self::Rain => {
                AnalysisKind::Frequency
            }
        }
    }

    fn fragment_body(&self) -> &'static str {
        match self {
            Self::Bar => BAR_BODY,
            Self::Waveform => WAVEFORM_BODY,
            Self::RadialWaveform => RADIAL_WAVEFORM_BODY,
            Self::RadialSpectrum => RADIAL_SPECTRUM_BODY,
            Self::HeartSpectrum => HEART_SPECTRUM_BODY,
            Self::HeartWaveform => HEART_WAVEFORM_BODY,
            Self::Rain => RAIN_BODY,
        }
    }

    pub fn fragment_shader(&self) -> String {
        let mut src = String::with_capacity(FRAGMENT_PRELUDE.len() + 1024);
        src.push_str(FRAGMENT_PRELUDE);
        src.push_str(self.fragment_body());
        src
    }

    /// Colour the surface is cleared to before each draw.
    ///
    /// Rain discards fragments, so it always clears to black to avoid trails.
    pub fn clear_color(&self, params: &PresetParams) -> Rgb {
        match self {
            Self::Rain => Rgb::BLACK,
            _ => params.clear_color,
        }
    }

    /// `(base_radius, radius_scale)` with the preset's own fallback scale.
    pub fn radius(&self, params: &PresetParams) -> [f32; 2] {
        let fallback = match self {
            Self::HeartWaveform => HEART_RADIUS_SCALE,
            _ => RADIAL_RADIUS_SCALE,
        };
        [params.base_radius, params.radius_scale_or(fallback)]
    }

    /// Static uniforms, set once after linking. `u_time` is per frame.
    pub fn uniforms(&self, params: &PresetParams) -> Vec<(&'static str, UniformValue)> {
        use UniformValue::*;

        let mut out = vec![
            ("u_sampleCount", Float(params.bar_count as f32)),
            ("u_baseLow", Vec3(params.base_color_low.to_array())),
            ("u_baseHigh", Vec3(params.base_color_high.to_array())),
            ("u_gamma", Float(params.intensity_gamma)),
        ];
        match self {
            Self::Bar | Self::HeartSpectrum => {}
            Self::Waveform => {
                let (inner, outer) = params.edge_softness;
                out.push(("u_edge", Vec2([inner, outer])));
            }
            Self::RadialWaveform | Self::RadialSpectrum | Self::HeartWaveform => {
                out.push(("u_radius", Vec2(self.radius(params))));
            }
            Self::Rain => {
                let pair = |(a, b): (f32, f32)| Vec2([a, b]);
                out.push(("u_threshold", Float(params.activation_threshold)));
                out.push(("u_dropSpacing", pair(params.drop_spacing)));
                out.push(("u_fallSpeed", pair(params.fall_speed)));
                out.push(("u_dropHeight", pair(params.drop_height)));
            }
        }
        out
    }

    /// Resolve the `presets/<name>-script.js` path served by the preset
    /// endpoint.
    pub fn from_script_path(path: &str) -> Result<Self, PresetError> {
        let file = path.trim().rsplit('/').next().unwrap_or_default();
        let name = file
            .strip_suffix(".js")
            .map(|f| f.strip_suffix("-script").unwrap_or(f))
            .unwrap_or(file);
        name.parse()
    }
}

impl FromStr for PresetKind {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PresetError::UnknownPreset(s.to_owned()))
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
