// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-threshold binarization and bounding-box cropping

use crate::capture::LumaFrame;
use crate::config::DetectionConfig;
use crate::errors::{AnalysisError, AnalysisResult};
use tracing::trace;

/// Binary white/black bitmap derived from one frame
///
/// Every cell is exactly lit or unlit; there are no intermediate values.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryBitmap {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl BinaryBitmap {
    /// Build a bitmap from raw cells (mainly for tests and synthetic input)
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> AnalysisResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidFrame(format!(
                "zero-area bitmap {}x{}",
                width, height
            )));
        }
        if cells.len() != width as usize * height as usize {
            return Err(AnalysisError::InvalidFrame(format!(
                "bitmap has {} cells, expected {}",
                cells.len(),
                width as usize * height as usize
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total cell count
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Whether the cell at (x, y) is lit
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Number of lit cells (the white histogram bucket)
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Number of unlit cells (the black histogram bucket)
    pub fn unlit_count(&self) -> usize {
        self.area() - self.lit_count()
    }

    /// Crop to the bounding box of lit cells
    ///
    /// Only applied when the box covers at least `min_ratio` of the full
    /// area; a tiny box would mean cropping to a speck that is itself noise.
    /// Returns the bitmap unchanged when there are no lit cells or the box
    /// is too small.
    pub fn cropped_to_lit(self, min_ratio: f64) -> Self {
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut any = false;

        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_lit(x, y) {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        if !any {
            return self;
        }

        let box_w = max_x - min_x + 1;
        let box_h = max_y - min_y + 1;
        let box_area = box_w as usize * box_h as usize;
        let ratio = box_area as f64 / self.area() as f64;
        if ratio < min_ratio {
            trace!(ratio, min_ratio, "Bounding box too small, keeping full frame");
            return self;
        }

        let mut cells = Vec::with_capacity(box_area);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                cells.push(self.is_lit(x, y));
            }
        }

        trace!(box_w, box_h, ratio, "Cropped to lit bounding box");
        Self {
            width: box_w,
            height: box_h,
            cells,
        }
    }
}

/// Fixed-threshold frame binarizer
///
/// Pure function over well-formed frames: a pixel is lit iff its luminance
/// exceeds the configured threshold. Optionally blurs the plane first to
/// suppress single-pixel sensor noise.
#[derive(Debug, Clone)]
pub struct Binarizer {
    threshold: u8,
    blur: bool,
}

impl Binarizer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            threshold: config.mono_threshold,
            blur: config.blur,
        }
    }

    /// Threshold a frame into a binary bitmap
    pub fn binarize(&self, frame: &LumaFrame) -> AnalysisResult<BinaryBitmap> {
        if frame.width == 0 || frame.height == 0 {
            return Err(AnalysisError::InvalidFrame(format!(
                "zero-area region {}x{}",
                frame.width, frame.height
            )));
        }

        let blurred;
        let plane: &[u8] = if self.blur {
            blurred = box_blur_3x3(frame.data(), frame.width, frame.height);
            &blurred
        } else {
            frame.data()
        };

        let cells = plane.iter().map(|&p| p > self.threshold).collect();
        BinaryBitmap::from_cells(frame.width, frame.height, cells)
    }
}

/// 3x3 box blur over a packed luminance plane
///
/// Edge pixels average only the neighbors that exist, so the output plane
/// has the same dimensions as the input.
fn box_blur_3x3(plane: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let mut out = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            let mut count = 0u32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let ny = y as i64 + dy;
                    let nx = x as i64 + dx;
                    if ny >= 0 && ny < h as i64 && nx >= 0 && nx < w as i64 {
                        sum += plane[ny as usize * w + nx as usize] as u32;
                        count += 1;
                    }
                }
            }
            out.push((sum / count) as u8);
        }
    }

    out
}
