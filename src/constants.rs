// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Capture pacing constants
///
/// The capture collaborator samples the light source at a rate derived from
/// the Morse time unit, so that even the shortest element (one unit) is seen
/// by several frames.
pub mod pacing {
    /// Maximum supported capture rate in frames per second
    pub const MAX_FPS: f64 = 30.0;

    /// Frames sampled per Morse unit
    pub const FPS_FACTOR: f64 = 3.0;

    /// Default Morse unit duration in seconds when none has been learned
    pub const DEFAULT_UNIT_SECS: f64 = 0.2;
}

/// Default detection thresholds
///
/// These seed [`DetectionConfig::default`](crate::config::DetectionConfig);
/// the embedding application supplies its own values at construction.
pub mod detection {
    /// Luminance above this is considered lit (0-255 scale)
    pub const MONO_THRESHOLD: u8 = 250;

    /// Minimum lit vs. unlit quantity for the histogram fast path
    pub const LIGHT_DARK_RATIO: f64 = 1.0;

    /// Minimum area ratio between the lit bounding box and the full frame
    /// for the crop to be applied
    pub const BOX_MIN_RATIO: f64 = 0.2;

    /// Secondary spots above this fraction of the main spot's area make the
    /// pattern ambiguous rather than noise
    pub const SPOT_NOISE_RATIO: f64 = 0.1;

    /// Minimum main-spot area as a fraction of the whole frame
    pub const SPOT_MIN_RATIO: f64 = 0.05;

    /// Multiplier applied to frame deltas to express durations in seconds
    pub const SECOND_SCALE: f64 = 1.0;
}
