// SPDX-License-Identifier: GPL-3.0-only

//! morsecam - blinking-light Morse transceiver core
//!
//! Converts a stream of camera frames into an ordered boolean light/dark
//! signal sequence for Morse decoding, and replays pre-timed signal
//! sequences as real-time pulses for transmission.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`capture`]: Frame model and capture-rate pacing
//! - [`analysis`]: Binarization, flood-fill spot detection and the
//!   per-frame signal decision
//! - [`sequencer`]: Ordered hand-off of analysis results to the external
//!   translator, plus the decoded letter queue
//! - [`encoder`]: Real-time, cancellable playback of a timed plan
//! - [`translate`]: Boundary types and traits for the external translator
//! - [`config`]: Detection and timing configuration
//!
//! The Morse timing/alphabet algorithm itself lives outside this crate; the
//! core only feeds it observations in strict capture order and drains its
//! output.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod errors;
pub mod sequencer;
pub mod translate;

// Re-export commonly used types
pub use analysis::FrameAnalyzer;
pub use capture::{LumaFrame, morse_frame_rate};
pub use config::DetectionConfig;
pub use encoder::{Encoder, PlaybackController};
pub use errors::{AnalysisError, SequenceError, TranslatorFault};
pub use sequencer::SignalSequencer;
pub use translate::{
    DecodeTranslator, EncodeTranslator, LearnedTiming, PlaybackSegment, RatioConfig, SignalEvent,
};
