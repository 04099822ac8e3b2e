//! Hacker terminal: scrolling code, alerts, status bars, scanlines.
//!
//! Text is simulated, not typeset: every non-space character becomes a
//! small filled block, so the layout reads as a terminal without any
//! font machinery.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::draw::{Canvas, Color};
use crate::input::FrameInput;

const TEXT_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const DIM_TEXT_COLOR: Color = Color::rgb(0.0, 0.5, 0.0);
const HEADER_COLOR: Color = Color::rgb(0.0, 0.8, 0.4);
const SUCCESS_COLOR: Color = Color::rgb(0.2, 1.0, 0.2);
const WARNING_COLOR: Color = Color::rgb(1.0, 0.8, 0.0);
const ALERT_COLOR: Color = Color::rgb(1.0, 0.2, 0.2);

const SCROLL_SPEED: f32 = 1.0;
const ALERT_THRESHOLD: f32 = 0.5;
const MAX_LINES: usize = 40;
const MAX_ALERTS: usize = 8;
const RNG_SEED: u64 = 0x7e21;

const CODE_TEMPLATES: [&str; 14] = [
    "import neural_defense as nd",
    "from quantum_encrypt import QuantumCipher",
    "class ThreatAnalyzer:",
    "    def __init__(self, threshold=0.85):",
    "        self.neural_net = nd.NeuralDefense()",
    "    def analyze_packet(self, data):",
    "        if signature.threat_score > self.threshold:",
    "            self.escalate_countermeasures()",
    "def deploy_honeypot():",
    "    honeypot.mimic_vulnerable_service()",
    "encrypted_payload = cipher.encrypt(sensitive_data)",
    "if intrusion_detected:",
    "    firewall.adaptive_block(source_ip)",
    "quantum_key = generate_quantum_key(256)",
];

const SYSTEM_MESSAGES: [&str; 10] = [
    "Initializing quantum-resistant encryption protocols...",
    "Neural defense network: 47 nodes active, learning rate: 0.03",
    "Detected coordinated attack from botnet: 192.168.0.0/16",
    "Honeypot triggered: Attacker attempting SQL injection",
    "Adaptive firewall deployed: Blocking 23 malicious IPs",
    "Pattern recognition confidence: 94% - Threat signature matched",
    "Quantum tunnel established: 256-bit key exchange complete",
    "Self-healing initiated on nodes 7, 12, 15",
    "Vulnerability scan complete: 2 critical, 5 high, 12 medium",
    "Behavioral analysis: Anomalous traffic pattern detected",
];

const ALERT_MESSAGES: [&str; 8] = [
    "CRITICAL: Advanced Persistent Threat detected in segment 10.0.1.0/24",
    "WARNING: Brute force attack on SSH service - 247 failed attempts",
    "ALERT: Suspicious PowerShell execution on WORKSTATION-07",
    "URGENT: Lateral movement detected through domain controller",
    "THREAT: Ransomware signature matched in email attachment",
    "BREACH: Unauthorized privilege escalation on database server",
    "EXPLOIT: Buffer overflow attempt on web framework",
    "ATTACK: DNS tunneling detected - possible exfiltration",
];

struct TerminalLine {
    text: String,
    color: Color,
    age: f32,
    intensity: f32,
}

struct SystemAlert {
    message: String,
    time_remaining: f32,
    urgent: bool,
    color: Color,
}

/// Cyberpunk terminal dashboard paced by the audio amplitude.
pub struct HackerTerminal {
    rng: StdRng,
    audio_amplitude: f32,
    scroll_position: f32,
    elapsed: f32,
    code_timer: f32,
    alert_timer: f32,
    message_timer: f32,
    lines: Vec<TerminalLine>,
    alerts: Vec<SystemAlert>,
    status_values: [f32; 4],
}

impl HackerTerminal {
    /// Creates an empty terminal; content generates as audio plays.
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(RNG_SEED),
            audio_amplitude: 0.0,
            scroll_position: 0.0,
            elapsed: 0.0,
            code_timer: 0.0,
            alert_timer: 0.0,
            message_timer: 0.0,
            lines: Vec::new(),
            alerts: Vec::new(),
            status_values: [0.0; 4],
        }
    }

    /// No per-resolution state.
    pub fn initialize(&mut self, _width: u32, _height: u32) {}

    /// Offline entry point.
    pub fn render_frame(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    /// Live entry point.
    pub fn render_live(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        self.render(canvas, input);
    }

    fn render(&mut self, canvas: &mut Canvas, input: &FrameInput) {
        canvas.begin_frame(Color::BLACK);

        self.audio_amplitude = (input.primary().amplitude * 8.0).min(1.0);
        self.update(input.dt.max(1.0 / 240.0));

        let clock = clock_text(input.time);
        self.draw_header(canvas, &clock);
        self.draw_terminal_lines(canvas);
        self.draw_console(canvas, &clock);
        self.draw_status_bars(canvas);
        self.draw_scanlines(canvas);
    }

    fn update(&mut self, dt: f32) {
        self.scroll_position += dt * SCROLL_SPEED * (1.0 + self.audio_amplitude);
        self.elapsed += dt;
        self.code_timer += dt;
        self.alert_timer += dt;
        self.message_timer += dt;

        // Each generator runs on its own cadence; louder music types
        // faster and trips more alerts.
        if self.audio_amplitude > 0.2 && self.code_timer > 0.5 {
            self.push_code_line();
            self.code_timer = 0.0;
        }
        if self.audio_amplitude > ALERT_THRESHOLD && self.alert_timer > 1.0 {
            self.push_alert();
            self.alert_timer = 0.0;
        }
        if self.message_timer > 2.0 {
            self.push_system_message();
            self.message_timer = 0.0;
        }

        for line in self.lines.iter_mut() {
            line.age += dt;
        }
        self.lines.retain(|line| line.age <= 30.0);
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
        }

        for alert in self.alerts.iter_mut() {
            alert.time_remaining -= dt;
        }
        self.alerts.retain(|alert| alert.time_remaining > 0.0);
        if self.alerts.len() > MAX_ALERTS {
            let excess = self.alerts.len() - MAX_ALERTS;
            self.alerts.drain(..excess);
        }

        self.status_values[0] = (self.status_values[0] + self.audio_amplitude * 20.0).min(100.0);
        self.status_values[1] = 80.0 + self.audio_amplitude * 20.0;
        self.status_values[2] = 60.0 + self.audio_amplitude * 40.0;
        self.status_values[3] = self.audio_amplitude * 100.0;
    }

    fn push_code_line(&mut self) {
        let mut text = CODE_TEMPLATES[self.rng.random_range(0..CODE_TEMPLATES.len())].to_string();
        if self.rng.random_range(0..10) < 3 {
            const PREFIXES: [&str; 5] = [">>> ", "$ ", "root@defender:~# ", "[DEBUG] ", "[INFO] "];
            text = format!("{}{}", PREFIXES[self.rng.random_range(0..PREFIXES.len())], text);
        }
        self.lines.push(TerminalLine {
            text,
            color: TEXT_COLOR,
            age: 0.0,
            intensity: self.audio_amplitude,
        });
    }

    fn push_system_message(&mut self) {
        let message = SYSTEM_MESSAGES[self.rng.random_range(0..SYSTEM_MESSAGES.len())];
        self.lines.push(TerminalLine {
            text: message.to_string(),
            color: DIM_TEXT_COLOR,
            age: 0.0,
            intensity: self.audio_amplitude,
        });
    }

    fn push_alert(&mut self) {
        let urgent = self.rng.random_bool(0.5) || self.audio_amplitude > 0.7;
        self.alerts.push(SystemAlert {
            message: ALERT_MESSAGES[self.rng.random_range(0..ALERT_MESSAGES.len())].to_string(),
            time_remaining: 5.0 + self.audio_amplitude * 5.0,
            urgent,
            color: if urgent { ALERT_COLOR } else { WARNING_COLOR },
        });
    }

    fn draw_header(&self, canvas: &mut Canvas, clock: &str) {
        canvas.fill_rect(Vec2::new(-1.0, 0.92), Vec2::new(1.0, 1.0), HEADER_COLOR);

        let y = 0.96;
        draw_block_text(canvas, "CODER: SURVIVOR-03", -0.95, y, 0.015, 0.03, Color::BLACK);
        draw_block_text(canvas, clock, -0.15, y, 0.015, 0.03, Color::BLACK);
        draw_block_text(canvas, "STATUS: SECURING", 0.5, y, 0.015, 0.03, SUCCESS_COLOR);

        // Editor tabs below the header.
        const TABS: [&str; 3] = ["countermeasure.js", "survival_protocol.ts", "neural_defense.py"];
        let tab_y = 0.87;
        let mut x = -0.95;
        for tab in TABS {
            let width = tab.len() as f32 * 0.012;
            canvas.fill_rect(
                Vec2::new(x, tab_y - 0.02),
                Vec2::new(x + width, tab_y + 0.02),
                HEADER_COLOR.scaled(0.8),
            );
            draw_block_text(canvas, tab, x + 0.01, tab_y, 0.01, 0.02, Color::BLACK);
            x += width + 0.05;
        }
    }

    fn draw_terminal_lines(&self, canvas: &mut Canvas) {
        let line_height = 0.04;
        let start_y = 0.8;

        for (index, line) in self.lines.iter().rev().enumerate() {
            let y = start_y - index as f32 * line_height;
            if !(-1.0..=1.0).contains(&y) {
                continue;
            }
            let intensity = 0.3 + line.intensity * 0.7;
            draw_block_text_clipped(
                canvas,
                &line.text,
                -0.95,
                y,
                0.012,
                line_height * 0.6,
                line.color.scaled(intensity),
                0.2,
            );
        }
    }

    fn draw_console(&self, canvas: &mut Canvas, clock: &str) {
        canvas.fill_rect(
            Vec2::new(0.25, -0.4),
            Vec2::new(0.98, 0.85),
            Color::rgb(0.0, 0.2, 0.0),
        );
        draw_block_text(canvas, "COMMAND CONSOLE", 0.3, 0.8, 0.012, 0.02, HEADER_COLOR);
        draw_block_text(canvas, "THREAT LEVEL: ELEVATED", 0.62, 0.8, 0.01, 0.02, ALERT_COLOR);

        let mut y = 0.7;
        for alert in &self.alerts {
            if y < -0.3 {
                break;
            }
            let stamp = format!("[{}]", clock);
            draw_block_text(canvas, &stamp, 0.3, y, 0.009, 0.016, DIM_TEXT_COLOR);

            // Urgent alerts blink.
            let intensity = if alert.urgent {
                0.5 + 0.5 * (self.elapsed * 8.0).sin()
            } else {
                1.0
            };
            draw_block_text_clipped(
                canvas,
                &alert.message,
                0.42,
                y,
                0.009,
                0.016,
                alert.color.scaled(intensity),
                0.95,
            );
            y -= 0.06;
        }
    }

    fn draw_status_bars(&self, canvas: &mut Canvas) {
        canvas.fill_rect(
            Vec2::new(0.25, -0.98),
            Vec2::new(0.98, -0.45),
            Color::rgb(0.0, 0.15, 0.0),
        );
        draw_block_text(canvas, "SYSTEM MONITOR", 0.3, -0.5, 0.012, 0.02, HEADER_COLOR);

        const LABELS: [&str; 4] = ["QUANTUM-ENCRYPTED", "DEFENSE", "CPU", "THREAT"];
        const BAR_COLORS: [Color; 4] = [HEADER_COLOR, SUCCESS_COLOR, WARNING_COLOR, ALERT_COLOR];

        for (i, (&label, &color)) in LABELS.iter().zip(BAR_COLORS.iter()).enumerate() {
            let y = -0.6 - i as f32 * 0.08;
            draw_block_text(canvas, label, 0.3, y, 0.008, 0.016, DIM_TEXT_COLOR);

            let bar_x = 0.65;
            let bar_width = 0.25;
            canvas.fill_rect(
                Vec2::new(bar_x, y - 0.02),
                Vec2::new(bar_x + bar_width, y + 0.02),
                Color::rgb(0.1, 0.1, 0.1),
            );

            let fill = bar_width * (self.status_values[i] / 100.0).clamp(0.0, 1.0);
            let pulse = 1.0 + self.audio_amplitude * 0.3 * (self.elapsed * 5.0).sin();
            canvas.fill_rect(
                Vec2::new(bar_x, y - 0.02),
                Vec2::new(bar_x + fill, y + 0.02),
                color.scaled(pulse),
            );

            let percent = format!("{}%", self.status_values[i] as u32);
            draw_block_text(canvas, &percent, bar_x + bar_width + 0.02, y, 0.007, 0.014, color);
        }
    }

    fn draw_scanlines(&mut self, canvas: &mut Canvas) {
        let mut lines: Vec<(Vec2, Vec2)> = Vec::new();
        let mut y = -1.0;
        while y <= 1.0 {
            lines.push((Vec2::new(-1.0, y), Vec2::new(1.0, y)));
            y += 0.02;
        }
        canvas.lines(&lines, Color::rgba(0.0, 1.0, 0.0, 0.05), 1.0);

        // Digital noise only when the music is loud.
        if self.audio_amplitude > 0.3 {
            let count = (self.audio_amplitude * 50.0) as usize;
            let noise: Vec<Vec2> = (0..count)
                .map(|_| {
                    Vec2::new(
                        self.rng.random_range(-1.0f32..1.0),
                        self.rng.random_range(-1.0f32..1.0),
                    )
                })
                .collect();
            canvas.points(&noise, Color::rgba(0.0, 1.0, 0.0, 0.3), 2.0);
        }
    }
}

impl Default for HackerTerminal {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_text(time: f32) -> String {
    let total = time.max(0.0);
    let minutes = (total / 60.0) as u32;
    let seconds = (total % 60.0) as u32;
    let centis = ((total * 100.0) % 100.0) as u32;
    format!("{:02}:{:02}:{:02}", minutes, seconds, centis)
}

fn draw_block_text(
    canvas: &mut Canvas,
    text: &str,
    x: f32,
    y: f32,
    char_width: f32,
    char_height: f32,
    color: Color,
) {
    draw_block_text_clipped(canvas, text, x, y, char_width, char_height, color, 1.0);
}

#[allow(clippy::too_many_arguments)]
fn draw_block_text_clipped(
    canvas: &mut Canvas,
    text: &str,
    x: f32,
    y: f32,
    char_width: f32,
    char_height: f32,
    color: Color,
    clip_x: f32,
) {
    let mut cursor = x;
    for ch in text.chars() {
        if cursor >= clip_x {
            break;
        }
        if ch != ' ' {
            canvas.fill_rect(
                Vec2::new(cursor, y - char_height * 0.5),
                Vec2::new(cursor + char_width * 0.7, y + char_height * 0.5),
                color,
            );
        }
        cursor += char_width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceAnalysis;
    use tonescope_core::SpectralFrame;

    fn loud_input() -> Vec<SourceAnalysis> {
        vec![SourceAnalysis {
            spectrum: SpectralFrame::silent(1024, 44_100),
            window: vec![0.5; 1024],
            amplitude: 0.5,
        }]
    }

    #[test]
    fn loud_audio_generates_terminal_content() {
        let sources = loud_input();
        let mut style = HackerTerminal::new();
        let mut canvas = Canvas::new(800, 600);

        for frame in 0..120 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &sources,
                    time: frame as f32 / 30.0,
                    dt: 1.0 / 30.0,
                    cursor: 0,
                },
            );
        }
        assert!(!style.lines.is_empty(), "no code lines generated");
        assert!(!style.alerts.is_empty(), "no alerts generated");
    }

    #[test]
    fn line_and_alert_counts_stay_bounded() {
        let sources = loud_input();
        let mut style = HackerTerminal::new();
        let mut canvas = Canvas::new(800, 600);
        for frame in 0..2000 {
            style.render_frame(
                &mut canvas,
                &FrameInput {
                    sources: &sources,
                    time: frame as f32 / 30.0,
                    dt: 1.0 / 30.0,
                    cursor: 0,
                },
            );
        }
        assert!(style.lines.len() <= MAX_LINES);
        assert!(style.alerts.len() <= MAX_ALERTS);
    }

    #[test]
    fn clock_formats_minutes_seconds_centis() {
        assert_eq!(clock_text(0.0), "00:00:00");
        assert_eq!(clock_text(61.25), "01:01:25");
    }
}
