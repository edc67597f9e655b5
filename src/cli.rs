// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for offline analysis
//!
//! This module provides command-line functionality for:
//! - Classifying a still image as lit/unlit with spot diagnostics
//! - Printing the capture frame rate derived from a Morse unit

use morsecam::analysis::{Binarizer, SpotDetector};
use morsecam::{DetectionConfig, FrameAnalyzer, LumaFrame, morse_frame_rate};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a detection config from a JSON file, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<DetectionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(DetectionConfig::default()),
    }
}

/// Classify a still image as a lit or unlit signal frame
pub fn analyze_image(
    path: PathBuf,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path.as_deref())?;

    let gray = image::open(&path)?.to_luma8();
    let (width, height) = gray.dimensions();
    let frame = LumaFrame::from_luma(width, height, gray.into_raw(), 0, 0.0)?;

    let analyzer = FrameAnalyzer::new(config.clone());
    let event = analyzer.analyze(&frame)?;

    println!(
        "{}: {} ({}x{})",
        path.display(),
        if event.signal { "lit" } else { "unlit" },
        width,
        height
    );

    if verbose {
        let bitmap = Binarizer::new(&config).binarize(&frame)?;
        let lit = bitmap.lit_count();
        let unlit = bitmap.unlit_count();
        println!("  threshold:  {}", config.mono_threshold);
        println!("  lit cells:  {}", lit);
        println!("  unlit cells: {}", unlit);
        if unlit > 0 {
            println!("  light/dark: {:.4}", lit as f64 / unlit as f64);
        }

        let mut areas = SpotDetector::new(&config).spot_areas(&bitmap);
        areas.sort_unstable_by(|a, b| b.cmp(a));
        println!("  spots:      {}", areas.len());
        for (i, area) in areas.iter().take(8).enumerate() {
            let share = *area as f64 / bitmap.area() as f64;
            println!("    [{}] area {} ({:.2}% of frame)", i, area, share * 100.0);
        }
    }

    Ok(())
}

/// Print the capture frame rate for a given Morse unit duration
pub fn print_rate(unit_secs: f64) -> Result<(), Box<dyn std::error::Error>> {
    let rate = morse_frame_rate(unit_secs);
    println!(
        "unit {:.3}s -> request {:.1} fps (frame period {:.1} ms)",
        unit_secs,
        rate,
        1000.0 / rate
    );
    Ok(())
}
