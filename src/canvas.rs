//! Raster `meters` surface and its projection onto terminal cells
//!
//! The canvas stores one pixel per meter unit. Projection samples it at
//! 5 units per column and 5 units per row, so a 15 unit bar becomes three
//! columns and the 80 unit range becomes 16 rows with 1/8 block resolution
//! at the bar tip.

use crate::colors::{level_color, peak_color, ColorState};
use crate::meter::{Surface, BASELINE, GUTTER, SURFACE_HEIGHT};
use crate::terminal::Terminal;

pub const UNITS_PER_COLUMN: usize = 5;
pub const UNITS_PER_ROW: usize = 5;

/// Vertical partial blocks, 1/8 increments filling from the bottom
pub const VBLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const TICK_CHAR: char = '─';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pixel {
    #[default]
    Empty,
    Bar,
    Tick,
}

/// Fixed-height raster in meter units, sized horizontally by its host
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::Empty; width * height],
        }
    }

    /// Canvas wide enough for `columns` terminal columns at full meter height
    pub fn for_columns(columns: u16) -> Self {
        Self::new(columns as usize * UNITS_PER_COLUMN, SURFACE_HEIGHT as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Pixel {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Pixel::Empty
        }
    }

    /// Terminal rows the projection occupies
    pub fn rows(&self) -> usize {
        self.height() / UNITS_PER_ROW
    }

    pub fn columns(&self) -> usize {
        self.width() / UNITS_PER_COLUMN
    }

    fn span(&self, start: f64, end: f64, limit: usize) -> std::ops::Range<usize> {
        let lo = start.round().clamp(0.0, limit as f64) as usize;
        let hi = end.round().clamp(0.0, limit as f64) as usize;
        lo..hi.max(lo)
    }

    fn paint(&mut self, xs: std::ops::Range<usize>, ys: std::ops::Range<usize>, pixel: Pixel) {
        for y in ys {
            let row = y * self.width;
            for x in xs.clone() {
                self.pixels[row + x] = pixel;
            }
        }
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.pixels.fill(Pixel::Empty);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let xs = self.span(x, x + width, self.width);
        let ys = self.span(y, y + height, self.height);
        self.paint(xs, ys, Pixel::Bar);
    }

    fn hline(&mut self, x0: f64, x1: f64, y: f64) {
        let row = y.round();
        if row < 0.0 || row >= self.height as f64 {
            return;
        }
        let row = row as usize;
        let xs = self.span(x0.min(x1), x0.max(x1), self.width);
        self.paint(xs, row..row + 1, Pixel::Tick);
    }
}

/// Draw the canvas into the terminal buffer with its top-left at (`x`, `y`).
///
/// Bars are coloured by their height above the baseline, ticks use the
/// scheme's peak colour.
pub fn project(canvas: &Canvas, term: &mut Terminal, x: i32, y: i32, colors: &ColorState) {
    let rows = canvas.rows();
    let span = (BASELINE - GUTTER) / UNITS_PER_ROW as f64;

    for col in 0..canvas.columns() {
        let ux = col * UNITS_PER_COLUMN + UNITS_PER_COLUMN / 2;
        for row in 0..rows {
            let mut filled = 0;
            let mut tick = false;
            for uy in row * UNITS_PER_ROW..(row + 1) * UNITS_PER_ROW {
                match canvas.get(ux, uy) {
                    Pixel::Bar => filled += 1,
                    Pixel::Tick => tick = true,
                    Pixel::Empty => {}
                }
            }

            let cx = x + col as i32;
            let cy = y + row as i32;
            if tick {
                term.set(cx, cy, TICK_CHAR, Some(peak_color(colors)), true);
            } else if filled > 0 {
                let idx = ((filled * 8 + UNITS_PER_ROW / 2) / UNITS_PER_ROW).min(8);
                let rows_above_base = BASELINE / UNITS_PER_ROW as f64 - row as f64;
                let percent = (100.0 * rows_above_base / span).clamp(0.0, 100.0) as f32;
                term.set(cx, cy, VBLOCKS[idx], Some(level_color(percent, colors)), false);
            }
        }
    }
}
