//! Per-frame analysis step shared by the two frame drivers.

use tonescope_core::{SourceSet, SpectralAnalyzer, WindowKind};
use tonescope_render::SourceAnalysis;

/// Runs the analyzer over every source at `offset`.
///
/// Offsets past a buffer's end analyze as silence, so short sources
/// keep rendering (dark) while longer ones still carry signal.
pub fn analyze_sources(
    analyzer: &mut SpectralAnalyzer,
    sources: &SourceSet,
    offset: u64,
    window: WindowKind,
) -> Vec<SourceAnalysis> {
    let fft_size = analyzer.fft_size();
    sources
        .sources()
        .iter()
        .map(|buffer| {
            let spectrum = analyzer.analyze(buffer, offset, window);
            let mut raw = vec![0.0f32; fft_size];
            buffer.fill_window(offset, &mut raw);
            SourceAnalysis {
                spectrum,
                amplitude: buffer.mean_abs(offset, fft_size),
                window: raw,
            }
        })
        .collect()
}

/// Live-mode variant: the primary source's spectrum comes from the
/// audio callback's window snapshot (never from a torn read of the
/// cursor), the remaining sources read their immutable buffers.
pub fn analyze_sources_live(
    analyzer: &mut SpectralAnalyzer,
    sources: &SourceSet,
    snapshot: &[f32],
    offset: u64,
    window: WindowKind,
) -> Vec<SourceAnalysis> {
    let mut analyses = analyze_sources(analyzer, sources, offset, window);
    if let Some(primary) = analyses.first_mut() {
        primary.spectrum = analyzer.analyze_slice(snapshot, window);
        primary.window.clear();
        primary.window.extend_from_slice(snapshot);
        let len = snapshot.len().max(1);
        primary.amplitude = snapshot.iter().map(|s| s.abs()).sum::<f32>() / len as f32;
    }
    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonescope_core::SampleBuffer;

    #[test]
    fn exhausted_source_analyzes_as_silence() {
        let sources = SourceSet::new(vec![
            SampleBuffer::new(vec![0.5; 1000], 44_100),
            SampleBuffer::new(vec![0.5; 2000], 44_100),
        ])
        .unwrap();
        let mut analyzer = SpectralAnalyzer::new(256, 44_100);

        let analyses = analyze_sources(&mut analyzer, &sources, 1500, WindowKind::Hann);
        assert_eq!(analyses.len(), 2);
        assert!(analyses[0].spectrum.magnitudes().all(|m| m == 0.0));
        assert_eq!(analyses[0].amplitude, 0.0);
        assert!(analyses[1].amplitude > 0.0);
    }

    #[test]
    fn live_primary_uses_snapshot() {
        let sources =
            SourceSet::new(vec![SampleBuffer::new(vec![0.0; 4096], 44_100)]).unwrap();
        let mut analyzer = SpectralAnalyzer::new(256, 44_100);

        let snapshot = vec![0.25f32; 256];
        let analyses =
            analyze_sources_live(&mut analyzer, &sources, &snapshot, 0, WindowKind::Rect);
        // The buffer itself is silent; the snapshot is not.
        assert!(analyses[0].amplitude > 0.0);
        assert!(analyses[0].spectrum.magnitudes().sum::<f32>() > 0.0);
    }
}
