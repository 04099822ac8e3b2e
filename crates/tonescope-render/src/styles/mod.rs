//! The visual style family.
//!
//! Styles form a closed sum type: [`StyleKind`] identifies a style and
//! owns the case-insensitive alias table (resolved once at startup,
//! never re-parsed per frame), and [`Style`] holds the per-instance
//! state behind a single three-method interface. Each style is
//! independent; the tuning constants inside one style are cosmetic and
//! deliberately not shared with any other.

use tonescope_core::WindowKind;
use tracing::debug;

use crate::draw::Canvas;
use crate::input::FrameInput;

mod ascii;
mod balls;
mod bars;
mod circles;
mod cube;
mod grid;
mod maze;
mod multi_band;
mod racer;
mod scroller;
mod spectrum;
mod terminal;
mod terrain;
mod waveform;

pub use ascii::AsciiEqualizer;
pub use balls::BallsVisualizer;
pub use bars::BarEqualizer;
pub use circles::CircleWaveform;
pub use cube::CubeVisualizer;
pub use grid::GridVisualizer;
pub use maze::MazeVisualizer;
pub use multi_band::MultiBandWaveform;
pub use racer::RacerVisualizer;
pub use scroller::ScrollerText;
pub use spectrum::Spectrogram;
pub use terminal::HackerTerminal;
pub use terrain::Terrain3D;
pub use waveform::Waveform;

/// Style identifier, in registry (cycling) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// Logarithmic bar equalizer with falling peak markers.
    Bars,
    /// 32-bar equalizer variant tuned for a tiny logical viewport.
    MiniBars,
    /// Raw time-domain waveform.
    Waveform,
    /// Three stacked bipolar band waveforms.
    MultiBand,
    /// Bar equalizer built from random 0/1 glyphs.
    Ascii,
    /// Filled dB spectrum with a blue-to-red gradient.
    Spectrum,
    /// Line-only spectrum variant for a tiny logical viewport.
    MiniSpectrum,
    /// Three concentric band-modulated circles.
    Circles,
    /// Circle variant tuned for a tiny logical viewport.
    MiniCircles,
    /// 3D terrain mesh built from three band curves.
    Terrain,
    /// Log-spaced 16x16 brightness grid.
    Grid,
    /// Scrolling stroke-font marquee with bass bounce.
    Scroller,
    /// Audio-reactive rotating wireframe cube.
    Cube,
    /// Cube variant tuned for a tiny logical viewport.
    MiniCube,
    /// Synthwave racer: perspective road, sun and buildings.
    Racer,
    /// Racer variant tuned for a tiny logical viewport.
    MiniRacer,
    /// First-person maze flythrough with audio-pulsed walls.
    Maze,
    /// Hacker terminal: scrolling code, alerts and status bars.
    Hacker,
    /// Bouncing balls driven by per-band energy.
    Balls,
}

impl StyleKind {
    /// Every kind, in cycling order.
    pub const ALL: [StyleKind; 19] = [
        StyleKind::Bars,
        StyleKind::MiniBars,
        StyleKind::Waveform,
        StyleKind::MultiBand,
        StyleKind::Ascii,
        StyleKind::Spectrum,
        StyleKind::MiniSpectrum,
        StyleKind::Circles,
        StyleKind::MiniCircles,
        StyleKind::Terrain,
        StyleKind::Grid,
        StyleKind::Scroller,
        StyleKind::Cube,
        StyleKind::MiniCube,
        StyleKind::Racer,
        StyleKind::MiniRacer,
        StyleKind::Maze,
        StyleKind::Hacker,
        StyleKind::Balls,
    ];

    /// Accepted CLI names for this kind (first entry is canonical).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            StyleKind::Bars => &["bars", "equalizer", "bar_equalizer"],
            StyleKind::MiniBars => &["mini_bars", "minibars", "mini_bar_equalizer"],
            StyleKind::Waveform => &["wave", "waveform"],
            StyleKind::MultiBand => &["multiband", "multi_band", "multi_band_waveform"],
            StyleKind::Ascii => &["ascii", "ascii_bars", "ascii_equalizer"],
            StyleKind::Spectrum => &["spectrogram", "spectrum"],
            StyleKind::MiniSpectrum => &["mini_spectrogram", "minispectrogram", "mini_spectrum"],
            StyleKind::Circles => &["circle", "circles", "multi_band_circle"],
            StyleKind::MiniCircles => &["mini_circle", "minicircle", "mini_circles"],
            StyleKind::Terrain => &["terrain", "3d", "terrain3d", "3d_terrain"],
            StyleKind::Grid => &["grid"],
            StyleKind::Scroller => &["scroller", "text", "scroll"],
            StyleKind::Cube => &["cube", "3d_cube"],
            StyleKind::MiniCube => &["mini_cube", "minicube", "mini_3d_cube"],
            StyleKind::Racer => &["racer", "synthwave", "race"],
            StyleKind::MiniRacer => &["mini_racer", "miniracer"],
            StyleKind::Maze => &["maze", "3d_maze", "vector_maze"],
            StyleKind::Hacker => &["hacker", "terminal", "cyber", "hack"],
            StyleKind::Balls => &["balls", "bouncing_balls", "bounce"],
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StyleKind::Bars => "Bar Equalizer",
            StyleKind::MiniBars => "Mini Bar Equalizer",
            StyleKind::Waveform => "Waveform",
            StyleKind::MultiBand => "Multi-Band Waveform",
            StyleKind::Ascii => "ASCII Bar Equalizer",
            StyleKind::Spectrum => "Spectrogram",
            StyleKind::MiniSpectrum => "Mini Spectrogram",
            StyleKind::Circles => "Multi-Band Circle Waveform",
            StyleKind::MiniCircles => "Mini Circle Visualizer",
            StyleKind::Terrain => "3D Terrain Visualizer",
            StyleKind::Grid => "Grid Visualizer",
            StyleKind::Scroller => "Scroller Text",
            StyleKind::Cube => "3D Cube Visualizer",
            StyleKind::MiniCube => "Mini Cube Visualizer",
            StyleKind::Racer => "Synthwave Racer",
            StyleKind::MiniRacer => "Mini Racer",
            StyleKind::Maze => "Maze Visualizer",
            StyleKind::Hacker => "Hacker Terminal",
            StyleKind::Balls => "Bouncing Balls",
        }
    }

    /// Resolves a case-insensitive name or alias.
    pub fn from_name(name: &str) -> Option<StyleKind> {
        let lower = name.to_lowercase();
        StyleKind::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&lower.as_str()))
    }

    /// The kind after this one in cycling order, wrapping around.
    pub fn next(&self) -> StyleKind {
        let index = StyleKind::ALL
            .iter()
            .position(|k| k == self)
            .unwrap_or(0);
        StyleKind::ALL[(index + 1) % StyleKind::ALL.len()]
    }

    /// Taper the analyzer applies for this style's spectra.
    pub fn window_kind(&self) -> WindowKind {
        match self {
            StyleKind::MultiBand
            | StyleKind::Spectrum
            | StyleKind::MiniSpectrum
            | StyleKind::Circles
            | StyleKind::MiniCircles
            | StyleKind::Terrain
            | StyleKind::Grid
            | StyleKind::Balls => WindowKind::Hann,
            _ => WindowKind::Rect,
        }
    }
}

/// One style instance: identifier plus private state.
pub enum Style {
    /// See [`StyleKind::Bars`].
    Bars(BarEqualizer),
    /// See [`StyleKind::MiniBars`].
    MiniBars(BarEqualizer),
    /// See [`StyleKind::Waveform`].
    Waveform(Waveform),
    /// See [`StyleKind::MultiBand`].
    MultiBand(MultiBandWaveform),
    /// See [`StyleKind::Ascii`].
    Ascii(AsciiEqualizer),
    /// See [`StyleKind::Spectrum`].
    Spectrum(Spectrogram),
    /// See [`StyleKind::MiniSpectrum`].
    MiniSpectrum(Spectrogram),
    /// See [`StyleKind::Circles`].
    Circles(CircleWaveform),
    /// See [`StyleKind::MiniCircles`].
    MiniCircles(CircleWaveform),
    /// See [`StyleKind::Terrain`].
    Terrain(Terrain3D),
    /// See [`StyleKind::Grid`].
    Grid(GridVisualizer),
    /// See [`StyleKind::Scroller`].
    Scroller(ScrollerText),
    /// See [`StyleKind::Cube`].
    Cube(CubeVisualizer),
    /// See [`StyleKind::MiniCube`].
    MiniCube(CubeVisualizer),
    /// See [`StyleKind::Racer`].
    Racer(RacerVisualizer),
    /// See [`StyleKind::MiniRacer`].
    MiniRacer(RacerVisualizer),
    /// See [`StyleKind::Maze`].
    Maze(MazeVisualizer),
    /// See [`StyleKind::Hacker`].
    Hacker(HackerTerminal),
    /// See [`StyleKind::Balls`].
    Balls(BallsVisualizer),
}

macro_rules! with_style {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Style::Bars($s) => $body,
            Style::MiniBars($s) => $body,
            Style::Waveform($s) => $body,
            Style::MultiBand($s) => $body,
            Style::Ascii($s) => $body,
            Style::Spectrum($s) => $body,
            Style::MiniSpectrum($s) => $body,
            Style::Circles($s) => $body,
            Style::MiniCircles($s) => $body,
            Style::Terrain($s) => $body,
            Style::Grid($s) => $body,
            Style::Scroller($s) => $body,
            Style::Cube($s) => $body,
            Style::MiniCube($s) => $body,
            Style::Racer($s) => $body,
            Style::MiniRacer($s) => $body,
            Style::Maze($s) => $body,
            Style::Hacker($s) => $body,
            Style::Balls($s) => $body,
        }
    };
}

impl Style {
    /// Builds a fresh instance of `kind` for the given FFT geometry.
    ///
    /// Smoothing/animation state starts from its reset values; seeded
    /// generators make offline renders reproducible.
    pub fn new(kind: StyleKind, fft_size: usize, sample_rate: u32) -> Style {
        debug!("instantiating style {:?}", kind);
        match kind {
            StyleKind::Bars => Style::Bars(BarEqualizer::standard(fft_size, sample_rate)),
            StyleKind::MiniBars => Style::MiniBars(BarEqualizer::mini(fft_size, sample_rate)),
            StyleKind::Waveform => Style::Waveform(Waveform::new(fft_size)),
            StyleKind::MultiBand => {
                Style::MultiBand(MultiBandWaveform::new(fft_size, sample_rate))
            }
            StyleKind::Ascii => Style::Ascii(AsciiEqualizer::new(fft_size)),
            StyleKind::Spectrum => Style::Spectrum(Spectrogram::standard()),
            StyleKind::MiniSpectrum => Style::MiniSpectrum(Spectrogram::mini()),
            StyleKind::Circles => Style::Circles(CircleWaveform::standard(fft_size, sample_rate)),
            StyleKind::MiniCircles => {
                Style::MiniCircles(CircleWaveform::mini(fft_size, sample_rate))
            }
            StyleKind::Terrain => Style::Terrain(Terrain3D::new(fft_size, sample_rate)),
            StyleKind::Grid => Style::Grid(GridVisualizer::new(fft_size, sample_rate)),
            StyleKind::Scroller => Style::Scroller(ScrollerText::new()),
            StyleKind::Cube => Style::Cube(CubeVisualizer::standard(fft_size)),
            StyleKind::MiniCube => Style::MiniCube(CubeVisualizer::mini(fft_size)),
            StyleKind::Racer => Style::Racer(RacerVisualizer::standard()),
            StyleKind::MiniRacer => Style::MiniRacer(RacerVisualizer::mini()),
            StyleKind::Maze => Style::Maze(MazeVisualizer::new()),
            StyleKind::Hacker => Style::Hacker(HackerTerminal::new()),
            StyleKind::Balls => Style::Balls(BallsVisualizer::new(fft_size)),
        }
    }

    /// Identifier of this instance.
    pub fn kind(&self) -> StyleKind {
        match self {
            Style::Bars(_) => StyleKind::Bars,
            Style::MiniBars(_) => StyleKind::MiniBars,
            Style::Waveform(_) => StyleKind::Waveform,
            Style::MultiBand(_) => StyleKind::MultiBand,
            Style::Ascii(_) => StyleKind::Ascii,
            Style::Spectrum(_) => StyleKind::Spectrum,
            Style::MiniSpectrum(_) => StyleKind::MiniSpectrum,
            Style::Circles(_) => StyleKind::Circles,
            Style::MiniCircles(_) => StyleKind::MiniCircles,
            Style::Terrain(_) => StyleKind::Terrain,
            Style::Grid(_) => StyleKind::Grid,
            Style::Scroller(_) => StyleKind::Scroller,
            Style::Cube(_) => StyleKind::Cube,
            Style::MiniCube(_) => StyleKind::MiniCube,
            Style::Racer(_) => StyleKind::Racer,
            Style::MiniRacer(_) => StyleKind::MiniRacer,
            Style::Maze(_) => StyleKind::Maze,
            Style::Hacker(_) => StyleKind::Hacker,
            Style::Balls(_) => StyleKind::Balls,
        }
    }

    /// (Re)initializes the style for the current window dimensions.
    pub fn initialize(&mut self, width: u32, height: u32) {
        with_style!(self, s => s.initialize(width, height))
    }

    /// Renders one offline frame (time-driven).
    pub fn render_frame(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        with_style!(self, s => s.render_frame(canvas, input))
    }

    /// Renders one live frame (cursor-driven).
    pub fn render_live(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        with_style!(self, s => s.render_live(canvas, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_resolves_to_its_kind() {
        for kind in StyleKind::ALL {
            for alias in kind.aliases() {
                assert_eq!(StyleKind::from_name(alias), Some(kind), "alias {}", alias);
            }
        }
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(StyleKind::from_name("SYNTHWAVE"), Some(StyleKind::Racer));
        assert_eq!(StyleKind::from_name("Terminal"), Some(StyleKind::Hacker));
        assert_eq!(StyleKind::from_name("no_such_style"), None);
    }

    #[test]
    fn next_cycles_through_all_kinds() {
        let mut kind = StyleKind::Bars;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..StyleKind::ALL.len() {
            assert!(seen.insert(kind), "kind {:?} repeated early", kind);
            kind = kind.next();
        }
        assert_eq!(kind, StyleKind::Bars);
        assert_eq!(seen.len(), StyleKind::ALL.len());
    }

    #[test]
    fn every_kind_instantiates() {
        for kind in StyleKind::ALL {
            let style = Style::new(kind, 1024, 44_100);
            assert_eq!(style.kind(), kind);
        }
    }
}
