//! Analyser sizing and the per-frame analysis buffer.

use crate::error::PresetError;

/// Which sample array a preset reads from the analyser each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Magnitude per frequency bin.
    Frequency,
    /// Raw waveform amplitude, 128 is silence.
    TimeDomain,
}

/// Web Audio accepts power-of-two FFT sizes in this range.
pub const MIN_FFT_SIZE: u32 = 32;
pub const MAX_FFT_SIZE: u32 = 32768;

/// Analyser window derived from the configured bar count.
///
/// An FFT of size `2N` yields `N` usable frequency bins, so the window is
/// always exactly twice the bar count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyserSettings {
    bar_count: u32,
}

impl AnalyserSettings {
    pub fn for_bar_count(bar_count: u32) -> Result<Self, PresetError> {
        let fft_size = bar_count.saturating_mul(2);
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(PresetError::AnalyserSize(fft_size));
        }
        Ok(Self { bar_count })
    }

    pub fn fft_size(&self) -> u32 {
        self.bar_count * 2
    }

    pub fn bar_count(&self) -> u32 {
        self.bar_count
    }

    /// Equal to `bar_count`; kept separate to match the analyser's own naming.
    pub fn frequency_bin_count(&self) -> u32 {
        self.fft_size() / 2
    }
}

/// Anything that can fill a byte buffer with analysis samples.
pub trait SampleSource {
    fn fill(&self, kind: AnalysisKind, out: &mut [u8]);
}

/// Fixed-length sample buffer, overwritten in place every frame.
#[derive(Debug, Clone)]
pub struct AnalysisBuffer {
    kind: AnalysisKind,
    data: Vec<u8>,
}

impl AnalysisBuffer {
    pub fn new(kind: AnalysisKind, len: u32) -> Self {
        Self {
            kind,
            data: vec![0; len as usize],
        }
    }

    pub fn refresh(&mut self, source: &impl SampleSource) {
        source.fill(self.kind, &mut self.data);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fft_is_twice_bar_count() {
        for n in [16u32, 32, 64, 128, 256, 512, 1024, 16384] {
            let s = AnalyserSettings::for_bar_count(n).unwrap();
            assert_eq!(s.fft_size(), 2 * n);
            assert_eq!(s.frequency_bin_count(), n);
        }
    }

    #[test]
    fn rejects_sizes_web_audio_refuses() {
        for n in [0u32, 1, 8, 100, 32768, u32::MAX] {
            assert!(matches!(
                AnalyserSettings::for_bar_count(n),
                Err(PresetError::AnalyserSize(_))
            ));
        }
    }

    struct Counting {
        calls: Cell<u32>,
    }

    impl SampleSource for Counting {
        fn fill(&self, kind: AnalysisKind, out: &mut [u8]) {
            self.calls.set(self.calls.get() + 1);
            let v = match kind {
                AnalysisKind::Frequency => 7,
                AnalysisKind::TimeDomain => 128,
            };
            out.fill(v);
        }
    }

    #[test]
    fn refresh_overwrites_in_place() {
        let src = Counting { calls: Cell::new(0) };
        let mut buf = AnalysisBuffer::new(AnalysisKind::TimeDomain, 32);
        buf.refresh(&src);
        buf.refresh(&src);
        assert_eq!(src.calls.get(), 2);
        assert_eq!(buf.len(), 32);
        assert!(buf.as_slice().iter().all(|&b| b == 128));
    }
}
