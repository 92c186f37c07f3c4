//! Terminal output for simulation frames.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::simulation::Particle;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Receives each frame after it has been read back from the GPU.
pub trait FrameSink {
    fn present(&mut self, frame: u64, particles: &[Particle]) -> io::Result<()>;
}

/// Visible region in simulation units and how it maps onto terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    pub width: u32,
    pub height: u32,
    /// Terminal columns per simulation unit along x.
    pub column_scale: u32,
    pub glyph: char,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            width: 106,
            height: 56,
            column_scale: 2,
            glyph: '.',
        }
    }
}

impl TerminalConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_glyph(mut self, glyph: char) -> Self {
        self.glyph = glyph;
        self
    }

    /// 1-based `(row, column)` for a particle, or `None` when it falls outside
    /// `[0, width) x [0, height)` or its column does not fit in a `u32`. Rows
    /// count down from the top, so y grows upwards on screen.
    pub fn cell_for(&self, particle: &Particle) -> Option<(u32, u32)> {
        let x = particle.position[0].floor();
        let y = particle.position[1].floor();
        if !(x >= 0.0 && x < self.width as f32 && y >= 0.0 && y < self.height as f32) {
            return None;
        }

        let (x, y) = (x as u32, y as u32);
        let col = self.column_scale.checked_mul(x)?.checked_add(1)?;
        Some((self.height - y, col))
    }
}

/// Paints particles with ANSI cursor addressing.
pub struct TerminalRenderer<W: Write> {
    out: W,
    config: TerminalConfig,
    frame: String,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(config: TerminalConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, config: TerminalConfig) -> Self {
        Self {
            out,
            config,
            frame: String::new(),
        }
    }

    /// Builds the escape sequence for one frame without writing it.
    pub fn compose(&mut self, particles: &[Particle]) -> &str {
        self.frame.clear();
        self.frame.push_str(CLEAR_SCREEN);

        for particle in particles {
            if let Some((row, col)) = self.config.cell_for(particle) {
                // Writing to a String cannot fail
                let _ = write!(self.frame, "\x1B[{};{}H{}", row, col, self.config.glyph);
            }
        }
        &self.frame
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalRenderer<W> {
    fn present(&mut self, _frame: u64, particles: &[Particle]) -> io::Result<()> {
        self.compose(particles);
        self.out.write_all(self.frame.as_bytes())?;
        self.out.flush()
    }
}

/// Sink for runs without a terminal: logs the particle centroid every
/// `interval` frames.
pub struct HeadlessSink {
    interval: u64,
    presented: u64,
}

impl HeadlessSink {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl FrameSink for HeadlessSink {
    fn present(&mut self, frame: u64, particles: &[Particle]) -> io::Result<()> {
        self.presented += 1;
        if frame % self.interval == 0 && !particles.is_empty() {
            let n = particles.len() as f32;
            let (sx, sy) = particles
                .iter()
                .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.position[0], sy + p.position[1]));
            log::debug!("Frame {}: centroid ({:.2}, {:.2})", frame, sx / n, sy / n);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Particle {
        Particle::new([x, y], [0.0, 0.0])
    }

    #[test]
    fn test_origin_maps_to_bottom_left() {
        let config = TerminalConfig::default();
        assert_eq!(config.cell_for(&at(0.0, 0.0)), Some((56, 1)));
        assert_eq!(config.cell_for(&at(0.9, 0.9)), Some((56, 1)));
    }

    #[test]
    fn test_top_right_cell() {
        let config = TerminalConfig::default();
        assert_eq!(config.cell_for(&at(105.5, 55.5)), Some((1, 211)));
    }

    #[test]
    fn test_negative_fraction_is_clipped() {
        let config = TerminalConfig::default();
        assert_eq!(config.cell_for(&at(-0.5, 3.0)), None);
        assert_eq!(config.cell_for(&at(3.0, -0.01)), None);
    }

    #[test]
    fn test_non_finite_is_clipped() {
        let config = TerminalConfig::default();
        assert_eq!(config.cell_for(&at(f32::NAN, 1.0)), None);
        assert_eq!(config.cell_for(&at(1.0, f32::INFINITY)), None);
    }

    #[test]
    fn test_wide_region_column_overflow_is_clipped() {
        let config = TerminalConfig::default().with_size(3_000_000_000, 56);
        assert_eq!(config.cell_for(&at(2.5e9, 1.0)), None);
        assert_eq!(config.cell_for(&at(1.0e9, 1.0)), Some((55, 2_000_000_001)));
    }

    #[test]
    fn test_frame_starts_with_clear() {
        let mut renderer = TerminalRenderer::new(Vec::new(), TerminalConfig::default());
        let frame = renderer.compose(&[]).to_string();
        assert_eq!(frame, CLEAR_SCREEN);
    }

    #[test]
    fn test_headless_counts_frames() {
        let mut sink = HeadlessSink::new(10);
        for frame in 0..25 {
            sink.present(frame, &[at(1.0, 1.0)]).unwrap();
        }
        assert_eq!(sink.presented(), 25);
    }
}
