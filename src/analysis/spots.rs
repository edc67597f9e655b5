// SPDX-License-Identifier: GPL-3.0-only

//! Flood-fill spot separation and noise classification
//!
//! A spot is a maximal 4-connected region of lit cells. Separating the main
//! spot from stray lit pixels is the expensive disambiguation step; the
//! analyzer only invokes it when the cheap histogram test is inconclusive.

use crate::analysis::binarize::BinaryBitmap;
use crate::config::DetectionConfig;
use tracing::trace;

/// Connected-component spot detector
#[derive(Debug, Clone)]
pub struct SpotDetector {
    noise_ratio: f64,
    min_ratio: f64,
}

impl SpotDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            noise_ratio: config.spot_noise_ratio,
            min_ratio: config.spot_min_ratio,
        }
    }

    /// Partition all lit cells into 4-connected spots, returning their areas
    ///
    /// Iterative flood fill with an explicit stack; recursion depth would be
    /// unbounded on large frames.
    pub fn spot_areas(&self, bitmap: &BinaryBitmap) -> Vec<usize> {
        let width = bitmap.width() as usize;
        let height = bitmap.height() as usize;
        let mut visited = vec![false; width * height];
        let mut areas = Vec::new();
        let mut stack: Vec<(u32, u32)> = Vec::new();

        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                let idx = y as usize * width + x as usize;
                if visited[idx] || !bitmap.is_lit(x, y) {
                    continue;
                }

                // New spot: fill from this seed
                let mut area = 0usize;
                visited[idx] = true;
                stack.push((x, y));

                while let Some((cx, cy)) = stack.pop() {
                    area += 1;
                    let neighbors = [
                        (cx.wrapping_sub(1), cy),
                        (cx + 1, cy),
                        (cx, cy.wrapping_sub(1)),
                        (cx, cy + 1),
                    ];
                    for (nx, ny) in neighbors {
                        if nx >= bitmap.width() || ny >= height as u32 {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if !visited[nidx] && bitmap.is_lit(nx, ny) {
                            visited[nidx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }

                areas.push(area);
            }
        }

        trace!(spots = areas.len(), "Flood fill complete");
        areas
    }

    /// Decide whether a spot pattern is a genuine lit signal
    ///
    /// The largest spot is the candidate signal. Every other spot must be
    /// small enough relative to it to count as noise, and the candidate
    /// itself must cover enough of the frame to rule out a stray speck.
    pub fn classify(&self, mut areas: Vec<usize>, total_area: usize) -> bool {
        if areas.is_empty() || total_area == 0 {
            return false;
        }

        let main_idx = areas
            .iter()
            .enumerate()
            .max_by_key(|&(_, &a)| a)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let main = areas.swap_remove(main_idx);

        let noise_only = areas
            .iter()
            .all(|&a| (a as f64 / main as f64) <= self.noise_ratio);
        let large_enough = (main as f64 / total_area as f64) > self.min_ratio;

        trace!(
            main,
            secondary = areas.len(),
            noise_only,
            large_enough,
            "Spot classification"
        );
        noise_only && large_enough
    }

    /// Convenience wrapper: flood fill and classify in one step
    pub fn is_signal(&self, bitmap: &BinaryBitmap) -> bool {
        let areas = self.spot_areas(bitmap);
        self.classify(areas, bitmap.area())
    }
}
