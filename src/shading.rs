//! CPU reference for the preset fragment shaders.
//!
//! Each function mirrors the GLSL in [`crate::preset`] line for line, so
//! preset behaviour can be checked without a GPU. Samples are looked up the
//! way the analysis texture is sampled: nearest neighbour, clamped to edge.

use std::f32::consts::PI;

use crate::color::Rgb;
use crate::config::PresetParams;
use crate::preset::PresetKind;

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn mix_rgb(a: Rgb, b: Rgb, t: f32) -> [f32; 3] {
    [mix(a.r, b.r, t), mix(a.g, b.g, t), mix(a.b, b.b, t)]
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn graded(color: [f32; 3], gamma: f32, coverage: f32) -> [f32; 3] {
    color.map(|c| c.powf(gamma) * coverage)
}

/// Pseudo-random value in `[0, 1)` used to jitter rain columns.
pub fn hash(n: f32) -> f32 {
    fract((n * 91.3458).sin() * 43758.5453)
}

/// Sample at `index` as `[0, 1]`, clamped to the buffer's edges.
pub fn amplitude(samples: &[u8], index: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let i = (index.max(0.0) as usize).min(samples.len() - 1);
    samples[i] as f32 / 255.0
}

/// Bucket for polar angle `theta` in `[-PI, PI]`; `theta == PI` maps to
/// `n - 1` rather than overflowing to `n`.
pub fn angle_bucket(theta: f32, n: u32) -> u32 {
    let t = (theta + PI) / (2.0 * PI);
    let bucket = (t * n as f32).floor().max(0.0) as u32;
    bucket.min(n.saturating_sub(1))
}

/// Implicit heart curve; zero on the outline.
pub fn heart(p: [f32; 2], scale: f32) -> f32 {
    let [x, y] = [p[0] * scale, p[1] * scale];
    let q = x * x + y * y - 1.0;
    q * q * q - x * x * y * y * y
}

/// Colour of the fragment at `uv` (each axis in `[0, 1]`, origin bottom-left).
pub fn shade(
    kind: PresetKind,
    uv: [f32; 2],
    samples: &[u8],
    params: &PresetParams,
    time: f32,
) -> [f32; 3] {
    let n = params.bar_count;
    let count = n as f32;
    let [u, v] = uv;
    let gamma = params.intensity_gamma;
    let high = params.base_color_high.to_array();
    let p = [u * 2.0 - 1.0, v * 2.0 - 1.0];
    let polar = || angle_bucket(p[1].atan2(p[0]), n) as f32;

    match kind {
        PresetKind::Bar => {
            let a = amplitude(samples, (u * count).floor());
            let covered = if a >= v { 1.0 } else { 0.0 };
            let color = mix_rgb(params.base_color_low, params.base_color_high, a);
            graded(color, gamma, covered)
        }
        PresetKind::Waveform => {
            let signal = amplitude(samples, (u * count).floor()) * 2.0 - 1.0;
            let d = (signal - p[1]).abs();
            let (inner, outer) = params.edge_softness;
            let line = 1.0 - smoothstep(inner, outer, d);
            graded(high.map(|c| c * line), gamma, 1.0)
        }
        PresetKind::RadialWaveform | PresetKind::RadialSpectrum => {
            let a = amplitude(samples, polar());
            let [base, scale] = kind.radius(params);
            let offset = if kind == PresetKind::RadialWaveform { a * 2.0 - 1.0 } else { a };
            let radius = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let d = (radius - (base + offset * scale)).abs();
            let brightness = 1.0 - smoothstep(0.01, 0.03, d);
            let color = if kind == PresetKind::RadialSpectrum {
                mix_rgb(params.base_color_low, params.base_color_high, a)
            } else {
                high
            };
            graded(color, gamma, brightness)
        }
        PresetKind::HeartSpectrum => {
            let a = amplitude(samples, polar());
            let d = heart(p, 1.6).abs() * 3.0 - a * 0.5;
            let intensity = 1.0 - smoothstep(0.0, 0.05, d);
            graded(high, gamma, intensity)
        }
        PresetKind::HeartWaveform => {
            let signal = amplitude(samples, polar()) * 2.0 - 1.0;
            let [_, scale] = kind.radius(params);
            let d = (heart(p, scale) - signal * 0.5).abs();
            let intensity = 1.0 - smoothstep(0.01, 0.03, d);
            graded(high, gamma, intensity)
        }
        PresetKind::Rain => {
            let column = (u * count).floor();
            let mut a = amplitude(samples, column);
            if column < 0.5 {
                a = (a - 0.05).max(0.0);
            }
            // Silent columns never activate, whatever the hash.
            if a <= 0.0 || hash(column * 7.123) > a * params.activation_threshold {
                // discarded: the cleared background shows through
                return kind.clear_color(params).to_array();
            }
            let spacing = mix(params.drop_spacing.0, params.drop_spacing.1, a);
            let speed = mix(params.fall_speed.0, params.fall_speed.1, a);
            let y = fract(v + time * speed + hash(column + 1.0));
            let height = mix(params.drop_height.0, params.drop_height.1, hash(column * 11.5));
            let shape = smoothstep(height, height * 0.7, (fract(y / spacing) - 0.5).abs());
            let color = mix_rgb(params.base_color_low, params.base_color_high, column / count);
            graded(color, gamma, shape)
        }
    }
}
