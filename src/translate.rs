// SPDX-License-Identifier: GPL-3.0-only

//! Boundary types and traits for the external Morse translator
//!
//! The translator owns the timing/alphabet state machine and lives outside
//! this crate. The core only feeds it `(signal, duration)` events in strict
//! capture order (decode) or drains a fully timed playback plan from it
//! (encode).

use crate::errors::TranslatorFault;

/// One light/dark observation produced by frame analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalEvent {
    /// Whether the light source was lit during this sampling interval
    pub signal: bool,
    /// Interval duration in seconds
    pub duration: f64,
}

/// One timed transmission step produced by the encode translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSegment {
    /// Desired transmitter state for this segment
    pub signal: bool,
    /// How long to hold the state, in seconds
    pub duration: f64,
}

/// Morse element durations expressed as multiples of the base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioConfig {
    /// Dot duration (units)
    pub dot: f64,
    /// Dash duration (units)
    pub dash: f64,
    /// Gap between elements of one letter (units)
    pub intra_gap: f64,
    /// Gap between letters (units)
    pub letter_gap: f64,
    /// Gap between words (units)
    pub word_gap: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        // Standard international Morse ratios
        Self {
            dot: 1.0,
            dash: 3.0,
            intra_gap: 1.0,
            letter_gap: 3.0,
            word_gap: 7.0,
        }
    }
}

/// Timing parameters a decoder has learned from live signals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LearnedTiming {
    /// Learned base unit in seconds, if the decoder has converged on one
    pub unit: Option<f64>,
    /// Learned element ratios, if the decoder tracks them
    pub ratios: Option<RatioConfig>,
}

/// Decode direction of the external translator
///
/// Stateful and order-sensitive: events must arrive in true temporal order.
pub trait DecodeTranslator: Send {
    /// Feed one observation; returns any letters decoded so far
    fn feed(&mut self, signal: bool, duration: f64) -> Result<Vec<char>, TranslatorFault>;

    /// Flush pending timing state and release resources; returns trailing
    /// letters
    fn finalize(&mut self) -> Result<Vec<char>, TranslatorFault>;

    /// Timing parameters learned from the observed signals, for adaptive
    /// encoding
    fn learned_timing(&self) -> LearnedTiming {
        LearnedTiming::default()
    }
}

/// Encode direction of the external translator
pub trait EncodeTranslator {
    /// Apply externally supplied timing overrides before enqueueing text
    fn set_timing(&mut self, timing: &LearnedTiming);

    /// Queue one character for translation
    fn enqueue(&mut self, ch: char);

    /// Translate everything queued so far into a timed playback plan,
    /// blocking until the plan is complete
    fn flush(&mut self) -> Vec<PlaybackSegment>;
}
