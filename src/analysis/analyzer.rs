// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame signal decision
//!
//! Orchestrates binarization, cropping, the histogram ratio test and, only
//! on ambiguous frames, flood-fill spot analysis. Produces one
//! [`SignalEvent`] per frame.

use crate::analysis::binarize::Binarizer;
use crate::analysis::spots::SpotDetector;
use crate::capture::LumaFrame;
use crate::config::DetectionConfig;
use crate::errors::AnalysisResult;
use crate::translate::SignalEvent;
use std::time::Instant;
use tracing::trace;

/// Frame-to-signal decision function
#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    config: DetectionConfig,
    binarizer: Binarizer,
    spots: SpotDetector,
}

impl FrameAnalyzer {
    pub fn new(config: DetectionConfig) -> Self {
        let binarizer = Binarizer::new(&config);
        let spots = SpotDetector::new(&config);
        Self {
            config,
            binarizer,
            spots,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Analyze one frame into a signal decision plus its time delta
    ///
    /// Decision order:
    /// 1. No unlit cells at all: the whole frame is lit.
    /// 2. Lit/unlit ratio above the configured threshold: lit (cheap path,
    ///    no flood fill).
    /// 3. Ratio of zero: dark.
    /// 4. Anything in between is ambiguous and goes to the spot detector.
    pub fn analyze(&self, frame: &LumaFrame) -> AnalysisResult<SignalEvent> {
        let start = Instant::now();

        let mut bitmap = self.binarizer.binarize(frame)?;
        if self.config.bounding_box {
            bitmap = bitmap.cropped_to_lit(self.config.box_min_ratio);
        }

        let lit = bitmap.lit_count();
        let unlit = bitmap.unlit_count();

        let signal = if unlit == 0 {
            true
        } else {
            let light_dark = lit as f64 / unlit as f64;
            if light_dark > self.config.light_dark_ratio {
                true
            } else if light_dark > 0.0 {
                self.spots.is_signal(&bitmap)
            } else {
                false
            }
        };

        trace!(
            index = frame.index,
            signal,
            lit,
            unlit,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Frame analyzed"
        );

        Ok(SignalEvent {
            signal,
            duration: frame.delta * self.config.second_scale,
        })
    }
}
