// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the transceiver core

use std::fmt;

/// Result type alias for frame analysis
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors produced while turning a frame into a signal decision
///
/// Both variants are recoverable: the frame is dropped and the pipeline
/// continues with the next capture tick.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Zero-area or otherwise malformed image region
    InvalidFrame(String),
    /// Binarization or crop failure while decoding the frame
    Decode(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            AnalysisError::Decode(msg) => write!(f, "Frame decode failed: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// The external translator rejected an event or entered an error state
///
/// The sequencer does not recover from this; the embedding application
/// should close the session and create a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorFault(pub String);

impl fmt::Display for TranslatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Translator fault: {}", self.0)
    }
}

impl std::error::Error for TranslatorFault {}

/// Errors surfaced by the signal sequencer
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// The sequencer was closed and no longer accepts frames
    Closed,
    /// A translator fault latched by an earlier analysis unit
    Translator(TranslatorFault),
    /// An analysis worker failed without producing a result
    Worker(String),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Closed => write!(f, "Sequencer is closed"),
            SequenceError::Translator(fault) => write!(f, "{}", fault),
            SequenceError::Worker(msg) => write!(f, "Analysis worker failed: {}", msg),
        }
    }
}

impl std::error::Error for SequenceError {}

impl From<TranslatorFault> for SequenceError {
    fn from(fault: TranslatorFault) -> Self {
        SequenceError::Translator(fault)
    }
}
