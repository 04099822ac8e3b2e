use criterion::{criterion_group, criterion_main, Criterion};
use std::f32::consts::PI;

use tonescope_core::{
    BandLayout, BandOptions, BandPlan, SampleBuffer, SpectralAnalyzer, WindowKind,
};

fn bench_analysis(c: &mut Criterion) {
    let rate = 44_100.0;
    let samples: Vec<f32> = (0..44_100 * 10)
        .map(|i| (2.0 * PI * 440.0 * i as f32 / rate).sin())
        .collect();
    let buffer = SampleBuffer::new(samples, 44_100);

    let mut analyzer = SpectralAnalyzer::new(1024, 44_100);
    let plan = BandPlan::new(
        &BandLayout::LogFrequency {
            min_hz: 20.0,
            max_hz: 20_000.0,
            bands: 16,
        },
        1024,
        44_100,
        BandOptions::default(),
    );

    c.bench_function("analyze_1024_hann", |b| {
        let mut offset = 0u64;
        b.iter(|| {
            offset = (offset + 1470) % buffer.len();
            analyzer.analyze(&buffer, offset, WindowKind::Hann)
        })
    });

    c.bench_function("band_levels_16", |b| {
        let spectrum = analyzer.analyze(&buffer, 0, WindowKind::Hann);
        let mut levels = Vec::with_capacity(16);
        b.iter(|| plan.levels_into(&spectrum, &mut levels))
    });
}

criterion_group!(benches, bench_analysis);
criterion_main!(benches);
