// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::detection;
use serde::{Deserialize, Serialize};

/// Detection and timing configuration for the transceiver core
///
/// Immutable once constructed; every component receives a copy (or a shared
/// reference) at construction time rather than reading mutable globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Luminance threshold: pixels above this are considered lit
    pub mono_threshold: u8,
    /// Minimum lit/unlit histogram ratio for the fast-path signal decision
    pub light_dark_ratio: f64,
    /// Apply a 3x3 box blur before thresholding to suppress sensor noise
    pub blur: bool,
    /// Crop to the bounding box of lit pixels before the histogram
    pub bounding_box: bool,
    /// Minimum box/frame area ratio for the crop to be applied
    pub box_min_ratio: f64,
    /// Secondary/main spot area ratio above which a pattern is ambiguous
    pub spot_noise_ratio: f64,
    /// Minimum main-spot/frame area ratio for a genuine signal
    pub spot_min_ratio: f64,
    /// Multiplier converting frame deltas into Translator-facing seconds
    pub second_scale: f64,
    /// Seed the encoder with timing learned from observed signals
    pub adaptive: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mono_threshold: detection::MONO_THRESHOLD,
            light_dark_ratio: detection::LIGHT_DARK_RATIO,
            blur: false, // Off by default; most sensors are clean enough
            bounding_box: true,
            box_min_ratio: detection::BOX_MIN_RATIO,
            spot_noise_ratio: detection::SPOT_NOISE_RATIO,
            spot_min_ratio: detection::SPOT_MIN_RATIO,
            second_scale: detection::SECOND_SCALE,
            adaptive: false,
        }
    }
}
