//! Clock-to-sample-offset mapping for both run modes.
//!
//! Offline rendering maps frame indices to offsets with exact integer
//! arithmetic so re-rendering a frame is byte-identical. Live playback
//! shares a cursor between the audio callback (sole writer) and the
//! render loop (sole reader); the callback additionally publishes a
//! snapshot of the most recent analysis window behind a short-lived
//! mutex so the render thread never reads a torn window.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Deterministic frame-index clock for offline rendering.
#[derive(Debug, Clone, Copy)]
pub struct OfflineClock {
    fps: u32,
    sample_rate: u32,
}

impl OfflineClock {
    /// Creates a clock for the given frame and sample rates.
    pub fn new(fps: u32, sample_rate: u32) -> Self {
        Self { fps, sample_rate }
    }

    /// Sample offset of `frame`: `floor(frame / fps * sample_rate)`.
    ///
    /// Computed as `frame * sample_rate / fps` in integer arithmetic, so
    /// the mapping is monotonic and exactly reproducible.
    pub fn sample_offset(&self, frame: u64) -> u64 {
        frame * self.sample_rate as u64 / self.fps as u64
    }

    /// Presentation time of `frame` in seconds.
    pub fn seconds(&self, frame: u64) -> f64 {
        frame as f64 / self.fps as f64
    }

    /// Total frames needed to cover `buffer_len` samples:
    /// `ceil(buffer_len / (sample_rate / fps))`.
    pub fn total_frames(&self, buffer_len: u64) -> u64 {
        let fps = self.fps as u64;
        let rate = self.sample_rate as u64;
        (buffer_len * fps).div_ceil(rate)
    }
}

/// Shared playback cursor for live mode.
///
/// The audio callback is the only writer of the position and the window
/// snapshot; the render loop is the only reader. The callback must not
/// block beyond the window copy.
pub struct LiveCursor {
    position: AtomicUsize,
    finished: AtomicBool,
    window: Mutex<Vec<f32>>,
}

impl LiveCursor {
    /// Creates a cursor whose window snapshot holds `window_len` samples.
    pub fn new(window_len: usize) -> Self {
        Self {
            position: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            window: Mutex::new(vec![0.0; window_len]),
        }
    }

    /// Current sample position.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Acquire) as u64
    }

    /// Advances the position by one device buffer's worth of frames.
    pub fn advance(&self, frames: usize) {
        self.position.fetch_add(frames, Ordering::AcqRel);
    }

    /// True once playback has passed the end of the longest buffer.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Marks playback finished. Terminal; never cleared.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Publishes the latest analysis window. Called from the audio
    /// callback; the lock is held only for the copy.
    pub fn store_window(&self, samples: &[f32]) {
        let mut window = self.window.lock();
        let len = window.len().min(samples.len());
        window[..len].copy_from_slice(&samples[..len]);
        for slot in window[len..].iter_mut() {
            *slot = 0.0;
        }
    }

    /// Copies the latest analysis window into `out` (resized to the
    /// snapshot length). Called from the render loop.
    pub fn snapshot_window(&self, out: &mut Vec<f32>) {
        let window = self.window.lock();
        out.clear();
        out.extend_from_slice(&window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_offsets_are_monotonic_and_exact() {
        let clock = OfflineClock::new(30, 44_100);
        assert_eq!(clock.sample_offset(0), 0);
        assert_eq!(clock.sample_offset(1), 1470);
        assert_eq!(clock.sample_offset(30), 44_100);

        let mut last = 0;
        for frame in 0..10_000 {
            let offset = clock.sample_offset(frame);
            assert!(offset >= last, "offset regressed at frame {}", frame);
            // Re-evaluating the same frame must be identical.
            assert_eq!(offset, clock.sample_offset(frame));
            last = offset;
        }
    }

    #[test]
    fn frame_coverage_matches_buffer_length() {
        let clock = OfflineClock::new(30, 44_100);

        // 2.5 seconds at 44.1 kHz -> exactly ceil(2.5 * 30) = 75 frames.
        let len = (2.5 * 44_100.0) as u64;
        assert_eq!(clock.total_frames(len), 75);

        // The last frame starts inside the buffer, the next one past it.
        let total = clock.total_frames(len);
        assert!(clock.sample_offset(total - 1) < len);
        assert!(clock.sample_offset(total) >= len);
    }

    #[test]
    fn total_frames_of_empty_buffer_is_zero() {
        let clock = OfflineClock::new(30, 44_100);
        assert_eq!(clock.total_frames(0), 0);
    }

    #[test]
    fn non_integer_fps_ratio_still_covers() {
        // 60 fps over 44.1 kHz leaves a fractional samples-per-frame.
        let clock = OfflineClock::new(60, 44_100);
        let len = 44_100u64;
        let total = clock.total_frames(len);
        assert_eq!(total, 60);
        assert!(clock.sample_offset(total - 1) < len);
    }

    #[test]
    fn live_cursor_advances_and_finishes() {
        let cursor = LiveCursor::new(8);
        assert_eq!(cursor.position(), 0);
        cursor.advance(512);
        cursor.advance(512);
        assert_eq!(cursor.position(), 1024);

        assert!(!cursor.is_finished());
        cursor.mark_finished();
        assert!(cursor.is_finished());
    }

    #[test]
    fn window_snapshot_round_trips() {
        let cursor = LiveCursor::new(4);
        cursor.store_window(&[0.1, 0.2, 0.3, 0.4]);

        let mut out = Vec::new();
        cursor.snapshot_window(&mut out);
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.4]);

        // Short writes zero-fill the remainder of the snapshot.
        cursor.store_window(&[0.5]);
        cursor.snapshot_window(&mut out);
        assert_eq!(out, vec![0.5, 0.0, 0.0, 0.0]);
    }
}
