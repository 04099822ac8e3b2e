//! Frequency-band decomposition and scaling policies.
//!
//! Every visual style reduces the spectrum to a handful of levels, but
//! each one tunes the reduction differently (boundary policy, frequency
//! weighting, normalization divisor). [`BandPlan`] captures those knobs
//! as parameters so the styles own their tuning constants instead of
//! hard-coding a second copy of the math.

use tracing::trace;

use crate::analyzer::SpectralFrame;

/// How band boundaries are derived from the spectrum.
#[derive(Debug, Clone)]
pub enum BandLayout {
    /// Even split of the usable bins into `bands` ranges.
    Linear {
        /// Number of bands.
        bands: usize,
    },
    /// Logarithmic frequency split:
    /// `f_i = min_hz * 10^(i/bands * log10(max_hz/min_hz))`.
    LogFrequency {
        /// Lower edge of the first band in Hz.
        min_hz: f32,
        /// Upper edge of the last band in Hz.
        max_hz: f32,
        /// Number of bands.
        bands: usize,
    },
    /// Power curve over bin indices: `start_i = (N/2)^(i/bands) - 1`.
    BinPower {
        /// Number of bands.
        bands: usize,
    },
    /// Explicit Hz cutoffs, one `(low, high)` pair per band.
    HzRanges(Vec<(f32, f32)>),
}

/// Normalization divisor applied to a band's aggregated magnitude.
#[derive(Debug, Clone, Copy)]
pub enum Divisor {
    /// One divisor for every band.
    Fixed(f32),
    /// Separate divisors for the low/mid/high thirds of the band list.
    Thirds {
        /// Divisor for the first third.
        low: f32,
        /// Divisor for the middle third.
        mid: f32,
        /// Divisor for the last third.
        high: f32,
    },
}

impl Divisor {
    fn for_band(&self, index: usize, bands: usize) -> f32 {
        match *self {
            Divisor::Fixed(d) => d,
            Divisor::Thirds { low, mid, high } => {
                if index < bands / 3 {
                    low
                } else if index < 2 * bands / 3 {
                    mid
                } else {
                    high
                }
            }
        }
    }
}

/// Style-specific tuning applied while aggregating a band.
#[derive(Debug, Clone)]
pub struct BandOptions {
    /// Frequency-dependent weight `(bin / max(start_bin, 1))^e` applied
    /// per magnitude before averaging, when set.
    pub weight_exponent: Option<f32>,
    /// Band-index gain `1 + index/bands * k` applied after averaging;
    /// 0.0 disables it.
    pub index_gain: f32,
    /// Normalization divisor before clamping.
    pub divisor: Divisor,
    /// Compress each magnitude with `log10(1 + m)` before averaging.
    pub log_compress: bool,
    /// After all bands are aggregated, rescale so the loudest band is 1.
    pub peak_normalize: bool,
}

impl Default for BandOptions {
    fn default() -> Self {
        Self {
            weight_exponent: None,
            index_gain: 0.0,
            divisor: Divisor::Fixed(50.0),
            log_compress: false,
            peak_normalize: false,
        }
    }
}

/// Bin ranges plus tuning, resolved once per style instance.
#[derive(Debug, Clone)]
pub struct BandPlan {
    ranges: Vec<(usize, usize)>,
    opts: BandOptions,
}

impl BandPlan {
    /// Resolves `layout` into half-open bin ranges for the given FFT
    /// geometry. Ranges are clamped to the usable bins; a degenerate
    /// range stays empty and later reads as level 0.
    pub fn new(layout: &BandLayout, fft_size: usize, sample_rate: u32, opts: BandOptions) -> Self {
        let max_bin = fft_size / 2;
        let hz_to_bin = |hz: f32| ((hz * fft_size as f32 / sample_rate as f32) as usize).min(max_bin);

        let ranges: Vec<(usize, usize)> = match layout {
            BandLayout::Linear { bands } => {
                let per = (max_bin / bands.max(&1)).max(1);
                (0..*bands)
                    .map(|i| ((i * per).min(max_bin), ((i + 1) * per).min(max_bin)))
                    .collect()
            }
            BandLayout::LogFrequency {
                min_hz,
                max_hz,
                bands,
            } => {
                let span = (max_hz / min_hz).log10();
                (0..*bands)
                    .map(|i| {
                        let f1 = min_hz * 10f32.powf(span * i as f32 / *bands as f32);
                        let f2 = min_hz * 10f32.powf(span * (i + 1) as f32 / *bands as f32);
                        let start = hz_to_bin(f1).min(max_bin.saturating_sub(1));
                        let end = hz_to_bin(f2).max(start + 1).min(max_bin);
                        (start, end)
                    })
                    .collect()
            }
            BandLayout::BinPower { bands } => (0..*bands)
                .map(|i| {
                    let curve = |t: f32| ((max_bin as f32).powf(t) - 1.0).max(0.0) as usize;
                    let start = curve(i as f32 / *bands as f32).min(max_bin.saturating_sub(1));
                    let end = curve((i + 1) as f32 / *bands as f32)
                        .max(start + 1)
                        .min(max_bin);
                    (start, end)
                })
                .collect(),
            BandLayout::HzRanges(ranges) => ranges
                .iter()
                .map(|&(lo, hi)| (hz_to_bin(lo), hz_to_bin(hi)))
                .collect(),
        };

        trace!("BandPlan resolved: {} bands over {} bins", ranges.len(), max_bin);

        Self { ranges, opts }
    }

    /// Number of bands in the plan.
    pub fn bands(&self) -> usize {
        self.ranges.len()
    }

    /// Resolved half-open bin ranges.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }

    /// One normalized level in [0, 1] per band.
    pub fn levels(&self, frame: &SpectralFrame) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.ranges.len());
        self.levels_into(frame, &mut out);
        out
    }

    /// [`Self::levels`] into a caller-owned vector (cleared first).
    pub fn levels_into(&self, frame: &SpectralFrame, out: &mut Vec<f32>) {
        out.clear();
        let bands = self.ranges.len();
        for (index, &(start, end)) in self.ranges.iter().enumerate() {
            out.push(self.band_level(frame, index, bands, start, end));
        }

        if self.opts.peak_normalize {
            let peak = out.iter().copied().fold(0.0f32, f32::max);
            if peak > 0.0 {
                for level in out.iter_mut() {
                    *level /= peak;
                }
            }
        }
    }

    fn band_level(
        &self,
        frame: &SpectralFrame,
        index: usize,
        bands: usize,
        start: usize,
        end: usize,
    ) -> f32 {
        let end = end.min(frame.len());
        if start >= end {
            return 0.0;
        }

        let mut sum = 0.0f32;
        for bin in start..end {
            let mut magnitude = frame.magnitude(bin);
            if self.opts.log_compress {
                magnitude = (1.0 + magnitude).log10();
            }
            if let Some(exponent) = self.opts.weight_exponent {
                magnitude *= (bin as f32 / start.max(1) as f32).powf(exponent);
            }
            sum += magnitude;
        }
        let mut level = sum / (end - start) as f32;

        if self.opts.index_gain != 0.0 {
            level *= 1.0 + index as f32 / bands as f32 * self.opts.index_gain;
        }
        level /= self.opts.divisor.for_band(index, bands);

        if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Per-bin levels over a bin range, weighted and clamped.
///
/// Used by the circle styles, which modulate a ring with one value per
/// bin rather than one per band.
pub fn bin_levels(
    frame: &SpectralFrame,
    start_bin: usize,
    end_bin: usize,
    weight_exponent: f32,
    gain: f32,
    divisor: f32,
) -> Vec<f32> {
    let max_bin = frame.fft_size() / 2;
    let start = start_bin.min(max_bin);
    let end = end_bin.min(max_bin);

    (start..end)
        .map(|bin| {
            let weight = (bin as f32 / (start + 1) as f32).powf(weight_exponent);
            let level = frame.magnitude(bin) * weight * gain / divisor;
            if level.is_finite() {
                level.clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Resamples a bin range onto `out_len` points with fractional-bin
/// weighting, log compression and peak normalization.
///
/// This is the multi-band waveform / terrain path: a band's bins are
/// spread across a fixed number of display points so every band renders
/// at the same width regardless of how many bins it spans. Output values
/// are in [0, 1]; a degenerate range yields all zeros.
pub fn resample_range(
    frame: &SpectralFrame,
    start_bin: usize,
    end_bin: usize,
    out_len: usize,
) -> Vec<f32> {
    let mut out = vec![0.0f32; out_len];
    let max_bin = frame.fft_size() / 2;
    let start = start_bin.min(max_bin);
    let end = end_bin.min(max_bin);
    if start >= end || out_len == 0 {
        return out;
    }

    let bins_per_point = (end - start) as f32 / out_len as f32;

    for (point, slot) in out.iter_mut().enumerate() {
        let lo = start as f32 + point as f32 * bins_per_point;
        let hi = lo + bins_per_point;

        let bin_start = lo as usize;
        let bin_end = (hi.ceil() as usize).min(end);

        let mut sum = 0.0f32;
        let mut weight_total = 0.0f32;
        for bin in bin_start..bin_end {
            let magnitude = frame.magnitude(bin);
            let compressed = if magnitude > 0.0 {
                (1.0 + magnitude).log10()
            } else {
                0.0
            };

            // Partial bins at the segment boundaries count fractionally.
            let mut weight = 1.0f32;
            if bin == bin_start {
                weight = 1.0 - (lo - bin_start as f32);
            }
            if bin + 1 == bin_end {
                weight = weight.min(hi - (bin_end - 1) as f32);
            }

            sum += compressed * weight;
            weight_total += weight;
        }

        *slot = if weight_total > 0.0 {
            sum / weight_total
        } else {
            0.0
        };
    }

    let peak = out.iter().copied().fold(0.0f32, f32::max);
    if peak > 0.0 {
        for value in out.iter_mut() {
            *value /= peak;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{SpectralAnalyzer, WindowKind};
    use crate::sample::SampleBuffer;
    use std::f32::consts::PI;

    fn frame_of(samples: Vec<f32>) -> SpectralFrame {
        let buf = SampleBuffer::new(samples, 44_100);
        SpectralAnalyzer::new(1024, 44_100).analyze(&buf, 0, WindowKind::Hann)
    }

    fn sine_frame(freq: f32) -> SpectralFrame {
        frame_of(
            (0..44_100)
                .map(|i| (2.0 * PI * freq * i as f32 / 44_100.0).sin())
                .collect(),
        )
    }

    #[test]
    fn silence_yields_zero_levels_for_every_layout() {
        let frame = frame_of(vec![0.0; 44_100]);
        let layouts = [
            BandLayout::Linear { bands: 16 },
            BandLayout::LogFrequency {
                min_hz: 20.0,
                max_hz: 20_000.0,
                bands: 16,
            },
            BandLayout::BinPower { bands: 16 },
            BandLayout::HzRanges(vec![(0.0, 250.0), (250.0, 2000.0), (2000.0, 20_000.0)]),
        ];
        for layout in &layouts {
            let plan = BandPlan::new(layout, 1024, 44_100, BandOptions::default());
            assert!(plan.levels(&frame).iter().all(|&l| l == 0.0));
        }
    }

    #[test]
    fn pure_tone_concentrates_in_its_band() {
        let frame = sine_frame(1000.0);
        let plan = BandPlan::new(
            &BandLayout::LogFrequency {
                min_hz: 20.0,
                max_hz: 20_000.0,
                bands: 16,
            },
            1024,
            44_100,
            BandOptions {
                divisor: Divisor::Fixed(35.0),
                ..Default::default()
            },
        );

        let levels = plan.levels(&frame);
        let tone_bin = frame.bin_of_hz(1000.0);
        let tone_band = plan
            .ranges()
            .iter()
            .position(|&(s, e)| (s..e).contains(&tone_bin))
            .expect("1 kHz band present in layout");

        for (band, &level) in levels.iter().enumerate() {
            if (band as i64 - tone_band as i64).abs() > 1 {
                assert!(
                    levels[tone_band] > level,
                    "band {} ({}) not below tone band {} ({})",
                    band,
                    level,
                    tone_band,
                    levels[tone_band]
                );
            }
        }
        assert!(levels[tone_band] > 0.0);
    }

    #[test]
    fn degenerate_range_reads_as_zero() {
        let frame = sine_frame(440.0);
        let plan = BandPlan::new(
            &BandLayout::HzRanges(vec![(500.0, 500.0), (800.0, 400.0)]),
            1024,
            44_100,
            BandOptions::default(),
        );
        assert_eq!(plan.levels(&frame), vec![0.0, 0.0]);
    }

    #[test]
    fn levels_are_bounded_for_full_scale_input() {
        // Full-scale DC plus tone; with an absurdly small divisor the
        // clamp still has to hold.
        let frame = frame_of(vec![1.0; 44_100]);
        let plan = BandPlan::new(
            &BandLayout::Linear { bands: 8 },
            1024,
            44_100,
            BandOptions {
                divisor: Divisor::Fixed(0.001),
                index_gain: 4.0,
                weight_exponent: Some(0.5),
                ..Default::default()
            },
        );
        for level in plan.levels(&frame) {
            assert!(level.is_finite());
            assert!((0.0..=1.0).contains(&level));
        }
    }

    #[test]
    fn thirds_divisor_splits_band_list() {
        let div = Divisor::Thirds {
            low: 50.0,
            mid: 35.0,
            high: 25.0,
        };
        assert_eq!(div.for_band(0, 16), 50.0);
        assert_eq!(div.for_band(7, 16), 35.0);
        assert_eq!(div.for_band(15, 16), 25.0);
    }

    #[test]
    fn resample_outputs_fixed_length_unit_range() {
        let frame = sine_frame(120.0);
        let end = frame.bin_of_hz(250.0);
        let band = resample_range(&frame, 0, end, 200);
        assert_eq!(band.len(), 200);
        assert!(band.iter().all(|v| (0.0..=1.0).contains(v)));
        // Peak normalization puts the loudest point at exactly 1.
        assert!((band.iter().copied().fold(0.0f32, f32::max) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn resample_degenerate_range_is_zeroed() {
        let frame = sine_frame(120.0);
        assert!(resample_range(&frame, 100, 100, 64).iter().all(|&v| v == 0.0));
        assert!(resample_range(&frame, 200, 100, 64).iter().all(|&v| v == 0.0));
        assert!(resample_range(&frame, 0, 100, 0).is_empty());
    }

    #[test]
    fn bin_levels_clamped_with_start_zero() {
        let frame = sine_frame(60.0);
        let levels = bin_levels(&frame, 0, 64, 0.5, 3.0, 12.5);
        assert_eq!(levels.len(), 64);
        for level in levels {
            assert!(level.is_finite());
            assert!((0.0..=1.0).contains(&level));
        }
    }
}
