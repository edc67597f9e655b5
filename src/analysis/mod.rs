// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame image analysis
//!
//! Turns one captured frame into a single boolean light/dark decision:
//! binarization and cropping in [`binarize`], flood-fill spot separation in
//! [`spots`], and the orchestrating decision function in [`analyzer`].

pub mod analyzer;
pub mod binarize;
pub mod spots;

pub use analyzer::FrameAnalyzer;
pub use binarize::{Binarizer, BinaryBitmap};
pub use spots::SpotDetector;
