//! Windowed FFT spectral analysis.
//!
//! One [`SpectralAnalyzer`] is planned per run and reused for every
//! frame; analysis allocates nothing beyond the returned frame and is
//! deterministic for a given buffer, offset and window choice.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

use crate::sample::SampleBuffer;

/// Epsilon added before `log10` when converting magnitudes to decibels.
pub const DB_EPSILON: f32 = 1e-6;

/// Taper applied to the analysis window before transforming.
///
/// Both variants exist in the visual corpus; the active style picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    /// No taper; samples enter the FFT unchanged.
    #[default]
    Rect,
    /// Hann taper `0.5 * (1 - cos(2*pi*i/(N-1)))` to reduce spectral leakage.
    Hann,
}

/// Complex output of one forward FFT over an analysis window.
///
/// Holds the `N/2 + 1` usable bins (the rest mirror by Nyquist symmetry).
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    bins: Vec<Complex<f32>>,
    fft_size: usize,
    sample_rate: u32,
}

impl SpectralFrame {
    fn new(bins: Vec<Complex<f32>>, fft_size: usize, sample_rate: u32) -> Self {
        Self {
            bins,
            fft_size,
            sample_rate,
        }
    }

    /// An all-zero frame, equivalent to analyzing silence.
    pub fn silent(fft_size: usize, sample_rate: u32) -> Self {
        Self::new(
            vec![Complex::new(0.0, 0.0); fft_size / 2 + 1],
            fft_size,
            sample_rate,
        )
    }

    /// Number of usable bins (`N/2 + 1`).
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True if the frame holds no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// FFT size `N` this frame was produced with.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Sample rate of the analyzed signal in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw complex bins.
    pub fn bins(&self) -> &[Complex<f32>] {
        &self.bins
    }

    /// Magnitude `sqrt(re^2 + im^2)` of `bin`, 0.0 out of range.
    pub fn magnitude(&self, bin: usize) -> f32 {
        self.bins.get(bin).map(|c| c.norm()).unwrap_or(0.0)
    }

    /// Decibel value `20 * log10(magnitude + epsilon)` of `bin`.
    pub fn db(&self, bin: usize) -> f32 {
        20.0 * (self.magnitude(bin) + DB_EPSILON).log10()
    }

    /// Iterator over all bin magnitudes.
    pub fn magnitudes(&self) -> impl Iterator<Item = f32> + '_ {
        self.bins.iter().map(|c| c.norm())
    }

    /// Width of one bin in Hz (`sample_rate / N`).
    pub fn bin_hz(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    /// Bin index for a frequency, via `bin = freq * N / sample_rate`,
    /// clamped to the usable range.
    pub fn bin_of_hz(&self, hz: f32) -> usize {
        let bin = (hz * self.fft_size as f32 / self.sample_rate as f32) as usize;
        bin.min(self.fft_size / 2)
    }
}

/// Forward real-signal FFT with a precomputed Hann table.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    sample_rate: u32,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralAnalyzer {
    /// Plans the transform for `fft_size` samples at `sample_rate` Hz.
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        // Hann table, computed once.
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (fft_size - 1) as f32).cos()))
            .collect();

        debug!("SpectralAnalyzer planned: fft_size={fft_size}, sample_rate={sample_rate}");

        Self {
            fft,
            fft_size,
            sample_rate,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// FFT size this analyzer was planned for.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Analyzes the window of `buffer` starting at `offset`.
    ///
    /// Positions past the end of the buffer are zero-filled, so offsets
    /// beyond the buffer degrade to analyzing silence rather than
    /// failing.
    pub fn analyze(
        &mut self,
        buffer: &SampleBuffer,
        offset: u64,
        window: WindowKind,
    ) -> SpectralFrame {
        for i in 0..self.fft_size {
            let sample = buffer.get(offset + i as u64);
            self.buffer[i] = Complex::new(self.taper(sample, i, window), 0.0);
        }
        self.run()
    }

    /// Analyzes an already-copied sample slice (the live snapshot path).
    ///
    /// Slices shorter than the FFT size are zero-padded.
    pub fn analyze_slice(&mut self, samples: &[f32], window: WindowKind) -> SpectralFrame {
        for i in 0..self.fft_size {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            self.buffer[i] = Complex::new(self.taper(sample, i, window), 0.0);
        }
        self.run()
    }

    fn taper(&self, sample: f32, i: usize, window: WindowKind) -> f32 {
        // Non-finite input would contaminate every bin.
        let sample = if sample.is_finite() { sample } else { 0.0 };
        match window {
            WindowKind::Rect => sample,
            WindowKind::Hann => sample * self.window[i],
        }
    }

    fn run(&mut self) -> SpectralFrame {
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        let bins = self.buffer[..self.fft_size / 2 + 1].to_vec();
        SpectralFrame::new(bins, self.fft_size, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, len: usize, rate: f32) -> SampleBuffer {
        let samples = (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / rate).sin() * amplitude)
            .collect();
        SampleBuffer::new(samples, rate as u32)
    }

    #[test]
    fn silence_yields_zero_spectrum() {
        let buf = SampleBuffer::new(vec![0.0; 44_100], 44_100);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let frame = analyzer.analyze(&buf, 0, WindowKind::Hann);
        assert_eq!(frame.len(), 513);
        assert!(frame.magnitudes().all(|m| m == 0.0));
    }

    #[test]
    fn sine_peak_lands_in_expected_bin() {
        let buf = sine(1000.0, 1.0, 44_100, 44_100.0);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let frame = analyzer.analyze(&buf, 0, WindowKind::Hann);

        let expected = frame.bin_of_hz(1000.0);
        let peak = (0..frame.len())
            .max_by(|&a, &b| frame.magnitude(a).total_cmp(&frame.magnitude(b)))
            .unwrap();
        assert!(
            (peak as i64 - expected as i64).abs() <= 1,
            "peak bin {} not near expected {}",
            peak,
            expected
        );
    }

    #[test]
    fn offset_past_end_degrades_to_silence() {
        let buf = sine(440.0, 1.0, 1000, 44_100.0);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let frame = analyzer.analyze(&buf, 10_000, WindowKind::Rect);
        assert!(frame.magnitudes().all(|m| m == 0.0));
    }

    #[test]
    fn window_near_end_zero_pads() {
        // Offset within N of the end must not fault and must match an
        // explicitly zero-padded copy bit for bit.
        let buf = sine(440.0, 0.8, 2000, 44_100.0);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let tail = analyzer.analyze(&buf, 1500, WindowKind::Hann);

        let mut padded = vec![0.0f32; 1024];
        buf.fill_window(1500, &mut padded);
        let explicit = analyzer.analyze_slice(&padded, WindowKind::Hann);

        for bin in 0..tail.len() {
            assert_eq!(tail.bins()[bin], explicit.bins()[bin]);
        }
    }

    #[test]
    fn analysis_is_deterministic() {
        let buf = sine(1000.0, 1.0, 44_100, 44_100.0);
        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let a = analyzer.analyze(&buf, 4410, WindowKind::Hann);
        let b = analyzer.analyze(&buf, 4410, WindowKind::Hann);
        assert_eq!(a.bins(), b.bins());
    }

    #[test]
    fn non_finite_samples_are_sanitized() {
        let buf = SampleBuffer::new(vec![f32::NAN, f32::INFINITY, 0.5, -0.5], 44_100);
        let mut analyzer = SpectralAnalyzer::new(64, 44_100);
        let frame = analyzer.analyze(&buf, 0, WindowKind::Rect);
        assert!(frame.magnitudes().all(|m| m.is_finite()));
    }

    #[test]
    fn db_is_finite_for_zero_magnitude() {
        let frame = SpectralFrame::silent(1024, 44_100);
        assert!(frame.db(0).is_finite());
        assert!(frame.db(512).is_finite());
    }
}
