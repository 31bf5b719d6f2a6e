//! Renders lookup tables into images for visual inspection.
//!
//! One PNG per waveshape, showing a single period on a light grid. The plots
//! are a debugging aid only; nothing reads them back.

use super::{Float, LutError, Wavetable};

use image::{Rgb, RgbImage};
use log::{debug, info};

use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const AXIS: Rgb<u8> = Rgb([120, 120, 120]);
const TRACE: Rgb<u8> = Rgb([31, 119, 180]);

const GRID_COLUMNS: u32 = 8;
const GRID_ROWS: u32 = 4;
const Y_RANGE: Float = 1.1; // Visible amplitude range is [-Y_RANGE, Y_RANGE]

pub struct Plotter {
    width: u32,
    height: u32,
    margin: u32,
}

impl Default for Plotter {
    fn default() -> Self {
        Plotter::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Plotter {
    pub fn new(width: u32, height: u32) -> Plotter {
        let margin = width.min(height) / 12;
        Plotter { width, height, margin }
    }

    /// Draw a single table.
    ///
    /// ```
    /// use lutgen::Plotter;
    ///
    /// let table: Vec<f64> = (0..64).map(|i| i as f64 / 32.0 - 1.0).collect();
    /// let img = Plotter::new(320, 240).render(&table);
    /// assert_eq!(img.dimensions(), (320, 240));
    /// ```
    pub fn render(&self, table: &[Float]) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        if self.plot_width() < 2 || self.plot_height() < 2 {
            return img;
        }
        self.draw_grid(&mut img);

        let points: Vec<(i64, i64)> = table.iter()
            .enumerate()
            .map(|(i, v)| (self.x_pos(i as Float / table.len() as Float), self.y_pos(*v)))
            .collect();
        if points.len() == 1 {
            Plotter::draw_line(&mut img, points[0], points[0], TRACE);
        }
        for pair in points.windows(2) {
            Plotter::draw_line(&mut img, pair[0], pair[1], TRACE);
        }
        img
    }

    /// Render every table of the Wavetable into `<dir>/<name>.png`.
    ///
    /// The directory is created if it doesn't exist.
    pub fn plot_all(&self, wt: &Wavetable, dir: &Path) -> Result<Vec<PathBuf>, LutError> {
        fs::create_dir_all(dir).map_err(|e| LutError::io(dir, e))?;
        let mut files = Vec::with_capacity(wt.num_tables());
        for (wave, table) in wt.iter() {
            let path = dir.join(format!("{}.png", wave.name()));
            self.render(table).save(&path)?;
            info!("Generated plot [{}]", path.display());
            files.push(path);
        }
        Ok(files)
    }

    fn plot_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin)
    }

    fn plot_height(&self) -> u32 {
        self.height.saturating_sub(2 * self.margin)
    }

    // Phase [0, 1] to pixel column.
    fn x_pos(&self, phase: Float) -> i64 {
        let w = (self.plot_width() - 1) as Float;
        self.margin as i64 + (phase * w).round() as i64
    }

    // Amplitude to pixel row, positive values on top.
    fn y_pos(&self, value: Float) -> i64 {
        let h = (self.plot_height() - 1) as Float;
        let v = value.max(-Y_RANGE).min(Y_RANGE);
        let rel = (Y_RANGE - v) / (2.0 * Y_RANGE);
        self.margin as i64 + (rel * h).round() as i64
    }

    fn draw_grid(&self, img: &mut RgbImage) {
        debug!("Drawing grid {}x{}", GRID_COLUMNS, GRID_ROWS);
        let top = self.y_pos(Y_RANGE);
        let bottom = self.y_pos(-Y_RANGE);
        let left = self.x_pos(0.0);
        let right = self.x_pos(1.0);
        for i in 0..=GRID_COLUMNS {
            let x = self.x_pos(i as Float / GRID_COLUMNS as Float);
            Plotter::draw_line(img, (x, top), (x, bottom), GRID);
        }
        for i in 0..=GRID_ROWS {
            let value = 1.0 - 2.0 * i as Float / GRID_ROWS as Float;
            let y = self.y_pos(value);
            let color = if i == GRID_ROWS / 2 { AXIS } else { GRID };
            Plotter::draw_line(img, (left, y), (right, y), color);
        }
    }

    // Bresenham, clipped to the image.
    fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::{TableBuilder, Waveform};

#[test]
fn square_wave_is_drawn_high_then_low() {
    let plotter = Plotter::default();
    let wt = TableBuilder::new(256).unwrap().build(&[Waveform::Square]).unwrap();
    let img = plotter.render(wt.get_table(Waveform::Square).unwrap());

    let x_high = plotter.x_pos(0.25) as u32;
    let x_low = plotter.x_pos(0.75) as u32;
    assert_eq!(*img.get_pixel(x_high, plotter.y_pos(1.0) as u32), TRACE);
    assert_eq!(*img.get_pixel(x_low, plotter.y_pos(-1.0) as u32), TRACE);
    assert_ne!(*img.get_pixel(x_low, plotter.y_pos(1.0) as u32), TRACE);
}

#[test]
fn zero_line_is_axis_colored() {
    let plotter = Plotter::default();
    let img = plotter.render(&[1.0; 16]);
    let y = plotter.y_pos(0.0) as u32;
    assert_eq!(*img.get_pixel(plotter.x_pos(0.3) as u32, y), AXIS);
}

#[test]
fn tiny_image_is_blank() {
    let img = Plotter::new(1, 1).render(&[0.0, 1.0]);
    assert!(img.pixels().all(|p| *p == BACKGROUND));
}

#[test]
fn one_file_per_table() {
    let dir = std::env::temp_dir().join(format!("lutgen-plots-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let wt = TableBuilder::new(128).unwrap().build(&Waveform::ALL).unwrap();
    let files = Plotter::new(160, 120).plot_all(&wt, &dir).unwrap();
    assert_eq!(files.len(), 8);
    for (file, wave) in files.iter().zip(Waveform::ALL.iter()) {
        assert_eq!(file, &dir.join(format!("{}.png", wave.name())));
        let img = image::open(file).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (160, 120));
    }
}
