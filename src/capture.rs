// SPDX-License-Identifier: GPL-3.0-only

//! Frame model and capture pacing
//!
//! The capture collaborator (camera widget, file source, test harness)
//! produces one [`LumaFrame`] per tick. Frames carry a capture index and the
//! elapsed time since the previous frame; the analysis pipeline consumes
//! them exactly once and discards them.

use crate::constants::pacing;
use crate::errors::{AnalysisError, AnalysisResult};
use std::sync::Arc;

/// A single luminance frame from the capture collaborator
///
/// The pixel plane is shared behind an `Arc` so a frame can be handed to a
/// blocking analysis worker without copying.
#[derive(Debug, Clone)]
pub struct LumaFrame {
    pub width: u32,
    pub height: u32,
    /// 8-bit luminance plane, row-major, no stride padding
    data: Arc<[u8]>,
    /// Monotonic capture index assigned by the source
    pub index: u64,
    /// Elapsed seconds since the previous frame (nominal period for the
    /// first frame)
    pub delta: f64,
}

impl LumaFrame {
    /// Create a frame from a packed luminance plane
    pub fn from_luma(
        width: u32,
        height: u32,
        data: Vec<u8>,
        index: u64,
        delta: f64,
    ) -> AnalysisResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidFrame(format!(
                "zero-area region {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(AnalysisError::InvalidFrame(format!(
                "luma plane is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::from(data),
            index,
            delta,
        })
    }

    /// Create a frame from RGBA pixel data with row stride
    ///
    /// Strips stride padding and converts each pixel to Rec.601 luma. This
    /// is the path taken by frames arriving from real capture backends,
    /// whose buffers are usually padded to an alignment boundary.
    pub fn from_rgba(
        width: u32,
        height: u32,
        stride: u32,
        rgba: &[u8],
        index: u64,
        delta: f64,
    ) -> AnalysisResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidFrame(format!(
                "zero-area region {}x{}",
                width, height
            )));
        }
        let w = width as usize;
        let stride = stride as usize;
        let mut luma = Vec::with_capacity(w * height as usize);

        for y in 0..height as usize {
            let row_start = y * stride;
            let row_end = row_start + w * 4;
            if row_end > rgba.len() {
                return Err(AnalysisError::Decode(format!(
                    "RGBA buffer truncated at row {}",
                    y
                )));
            }
            for pixel in rgba[row_start..row_end].chunks_exact(4) {
                let r = pixel[0] as f32;
                let g = pixel[1] as f32;
                let b = pixel[2] as f32;
                luma.push((0.299 * r + 0.587 * g + 0.114 * b) as u8);
            }
        }

        Ok(Self {
            width,
            height,
            data: Arc::from(luma),
            index,
            delta,
        })
    }

    /// Borrow the luminance plane
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total pixel count
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Frame receiver type for capture streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<LumaFrame>;

/// Frame sender type for capture streams
pub type FrameSender = futures::channel::mpsc::Sender<LumaFrame>;

/// Capture frame rate for a given Morse unit duration
///
/// Requests `FPS_FACTOR` samples per unit so that even a single-unit dot is
/// observed by multiple frames, capped at the maximum rate the capture
/// backends support.
pub fn morse_frame_rate(unit_secs: f64) -> f64 {
    let unit = if unit_secs > 0.0 {
        unit_secs
    } else {
        pacing::DEFAULT_UNIT_SECS
    };
    (pacing::FPS_FACTOR / unit).min(pacing::MAX_FPS)
}
