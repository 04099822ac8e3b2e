//! Property test: band levels are always finite and inside [0, 1], no
//! matter the input signal or tuning constants.

use proptest::prelude::*;
use std::f32::consts::PI;

use tonescope_core::{
    BandLayout, BandOptions, BandPlan, Divisor, SampleBuffer, SpectralAnalyzer, WindowKind,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn band_levels_stay_in_unit_range(
        freq in 20.0f32..20_000.0,
        amplitude in 0.0f32..1.0,
        bands in 1usize..64,
        divisor in 0.01f32..100.0,
        index_gain in 0.0f32..4.0,
        exponent in 0.0f32..1.0,
        offset in 0u64..60_000,
    ) {
        let rate = 44_100.0;
        let samples: Vec<f32> = (0..22_050)
            .map(|i| (2.0 * PI * freq * i as f32 / rate).sin() * amplitude)
            .collect();
        let buffer = SampleBuffer::new(samples, 44_100);

        let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
        let spectrum = analyzer.analyze(&buffer, offset, WindowKind::Hann);

        let layouts = [
            BandLayout::Linear { bands },
            BandLayout::LogFrequency { min_hz: 20.0, max_hz: 20_000.0, bands },
            BandLayout::BinPower { bands },
        ];
        for layout in &layouts {
            let plan = BandPlan::new(layout, 1024, 44_100, BandOptions {
                weight_exponent: Some(exponent),
                index_gain,
                divisor: Divisor::Fixed(divisor),
                ..Default::default()
            });
            for level in plan.levels(&spectrum) {
                prop_assert!(level.is_finite());
                prop_assert!((0.0..=1.0).contains(&level));
            }
        }
    }
}
