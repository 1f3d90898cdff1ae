use viz_presets::preset::{PresetKind, UniformValue};
use viz_presets::shading::shade;
use viz_presets::{PresetParams, VisualizerVariables};

fn vars(bar_count: u32, high: &str) -> VisualizerVariables {
    VisualizerVariables {
        bar_count: Some(bar_count),
        clear_color: Some("#000000".into()),
        base_color_low: Some("#000000".into()),
        base_color_high: Some(high.into()),
        intensity_gamma: Some(1.0),
        ..Default::default()
    }
}

fn params(bar_count: u32, high: &str) -> PresetParams {
    vars(bar_count, high).resolve().unwrap()
}

/// Pixel centres of a `w x h` grid in uv space.
fn grid(w: usize, h: usize) -> impl Iterator<Item = [f32; 2]> {
    (0..h).flat_map(move |y| {
        (0..w).map(move |x| [(x as f32 + 0.5) / w as f32, (y as f32 + 0.5) / h as f32])
    })
}

fn is_black(c: [f32; 3]) -> bool {
    c.iter().all(|&v| v == 0.0)
}

#[test]
fn bar_silence_is_black() {
    let p = params(8, "#ffffff");
    let silent = [0u8; 8];
    for uv in grid(64, 64) {
        assert!(is_black(shade(PresetKind::Bar, uv, &silent, &p, 0.0)), "{uv:?}");
    }
}

#[test]
fn bar_saturation_is_full_high_colour() {
    let p = params(8, "#ffffff");
    let loud = [255u8; 8];
    for uv in grid(64, 64) {
        assert_eq!(shade(PresetKind::Bar, uv, &loud, &p, 0.0), [1.0, 1.0, 1.0], "{uv:?}");
    }

    let p = params(8, "#ff8000");
    let expected = p.base_color_high.to_array();
    for column in 0..8 {
        let uv = [(column as f32 + 0.5) / 8.0, 0.99];
        assert_eq!(shade(PresetKind::Bar, uv, &loud, &p, 0.0), expected);
    }
}

#[test]
fn bar_height_tracks_amplitude() {
    let p = params(4, "#ffffff");
    let samples = [0u8, 64, 128, 255];
    for (column, &s) in samples.iter().enumerate() {
        let u = (column as f32 + 0.5) / 4.0;
        let level = s as f32 / 255.0;
        let below = shade(PresetKind::Bar, [u, level * 0.9], &samples, &p, 0.0);
        let above = shade(PresetKind::Bar, [u, (level + 0.05).min(1.0)], &samples, &p, 0.0);
        if s > 0 {
            assert!(!is_black(below), "column {column}");
        }
        if s < 255 {
            assert!(is_black(above), "column {column}");
        }
    }
}

#[test]
fn silent_waveform_draws_a_centre_line() {
    let p = params(64, "#00ff00");
    let silent = [128u8; 64];
    let on_line = shade(PresetKind::Waveform, [0.3, 0.5], &silent, &p, 0.0);
    assert_eq!(on_line, [0.0, 1.0, 0.0]);
    let off_line = shade(PresetKind::Waveform, [0.3, 0.9], &silent, &p, 0.0);
    assert!(is_black(off_line));
}

#[test]
fn silent_radial_waveform_draws_base_ring() {
    let p = params(64, "#ffffff");
    let silent = [128u8; 64];
    // base radius 0.4 along +x
    assert_eq!(
        shade(PresetKind::RadialWaveform, [0.7, 0.5], &silent, &p, 0.0),
        [1.0, 1.0, 1.0]
    );
    assert!(is_black(shade(PresetKind::RadialWaveform, [0.5, 0.5], &silent, &p, 0.0)));
}

#[test]
fn radial_spectrum_ring_grows_with_amplitude() {
    let mut v = vars(64, "#ffffff");
    // quiet rings take the low colour
    v.base_color_low = Some("#404040".into());
    let p = v.resolve().unwrap();
    let quiet = [0u8; 64];
    let loud = [255u8; 64];
    // base 0.4, scale 0.2: ring at 0.4 when quiet, 0.6 when loud
    let at = |r: f32| [0.5 + r / 2.0, 0.5];
    assert!(!is_black(shade(PresetKind::RadialSpectrum, at(0.4), &quiet, &p, 0.0)));
    assert!(is_black(shade(PresetKind::RadialSpectrum, at(0.6), &quiet, &p, 0.0)));
    assert!(!is_black(shade(PresetKind::RadialSpectrum, at(0.6), &loud, &p, 0.0)));
}

#[test]
fn heart_spectrum_lights_the_outline_only() {
    let p = params(64, "#ff0000");
    let silent = [0u8; 64];
    // (1/1.6, 0) lies on the scaled heart
    let outline = [(1.0 / 1.6 + 1.0) / 2.0, 0.5];
    assert_eq!(shade(PresetKind::HeartSpectrum, outline, &silent, &p, 0.0), [1.0, 0.0, 0.0]);
    assert!(is_black(shade(PresetKind::HeartSpectrum, [0.5, 0.5], &silent, &p, 0.0)));
}

#[test]
fn silent_heart_waveform_traces_the_scaled_outline() {
    let p = params(64, "#ff0000");
    let silent = [128u8; 64];
    // fallback scale 1.5 puts the outline's right tip at x = 1/1.5
    let tip = [(1.0 / 1.5 + 1.0) / 2.0, 0.5];
    assert_eq!(shade(PresetKind::HeartWaveform, tip, &silent, &p, 0.0), [1.0, 0.0, 0.0]);
    assert!(is_black(shade(PresetKind::HeartWaveform, [0.5, 0.5], &silent, &p, 0.0)));

    // an explicit scale moves the outline away from that point
    let mut v = vars(64, "#ff0000");
    v.radius_scale = Some(1.0);
    let unscaled = v.resolve().unwrap();
    assert!(is_black(shade(PresetKind::HeartWaveform, tip, &silent, &unscaled, 0.0)));
    let unit_tip = [1.0, 0.5];
    assert!(!is_black(shade(PresetKind::HeartWaveform, unit_tip, &silent, &unscaled, 0.0)));
}

#[test]
fn rain_needs_signal() {
    let p = params(32, "#ffffff");
    let silent = [0u8; 32];
    assert!(grid(64, 64).all(|uv| is_black(shade(PresetKind::Rain, uv, &silent, &p, 0.0))));

    let loud = [255u8; 32];
    let lit = grid(64, 64)
        .filter(|&uv| !is_black(shade(PresetKind::Rain, uv, &loud, &p, 0.0)))
        .count();
    assert!(lit > 0);
}

#[test]
fn rain_moves_with_time() {
    let p = params(32, "#ffffff");
    let loud = [255u8; 32];
    let frame = |t: f32| {
        grid(32, 64)
            .map(|uv| shade(PresetKind::Rain, uv, &loud, &p, t))
            .collect::<Vec<_>>()
    };
    assert_ne!(frame(0.0), frame(0.37));
}

#[test]
fn gamma_darkens_midtones() {
    let mut v = vars(4, "#808080");
    v.intensity_gamma = Some(2.2);
    let p = v.resolve().unwrap();
    let loud = [255u8; 4];
    let [r, ..] = shade(PresetKind::Bar, [0.1, 0.1], &loud, &p, 0.0);
    assert!((r - (128.0f32 / 255.0).powf(2.2)).abs() < 1e-6);
}

#[test]
fn sample_count_uniform_follows_config() {
    for n in [16u32, 64, 512] {
        let p = params(n, "#ffffff");
        for kind in PresetKind::ALL {
            let count = kind
                .uniforms(&p)
                .into_iter()
                .find(|(name, _)| *name == "u_sampleCount")
                .map(|(_, v)| v);
            assert_eq!(count, Some(UniformValue::Float(n as f32)), "{kind}");
        }
    }
}
