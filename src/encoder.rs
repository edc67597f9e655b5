// SPDX-License-Identifier: GPL-3.0-only

//! Real-time signal playback
//!
//! Turns input text into a timed plan via the external encode translator and
//! replays it as light pulses. Playback is blocking and runs on a dedicated
//! worker; cancellation is cooperative and checked at segment boundaries.

use crate::config::DetectionConfig;
use crate::translate::{EncodeTranslator, LearnedTiming};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Text-to-pulse encoder
#[derive(Debug, Clone)]
pub struct Encoder {
    adaptive: bool,
}

impl Encoder {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            adaptive: config.adaptive,
        }
    }

    /// Transmit `text` as real-time pulses through `sink`
    ///
    /// Learned ratios from `timing_source` are always applied on top of the
    /// built-in baseline, so transmissions stay compatible with standard
    /// timing; the learned unit overrides the default only in adaptive mode.
    ///
    /// The full playback plan is obtained eagerly before the first pulse,
    /// since pacing needs the complete, already-timed sequence. For each
    /// segment the sink is invoked, the segment duration elapses, and the
    /// cancellation flag is checked; worst-case cancellation latency is one
    /// segment's duration. On completion or cancellation the sink is always
    /// invoked once more with `false` so the transmitter ends dark.
    ///
    /// Blocking; callers run this on a dedicated worker (see
    /// [`PlaybackController`]) and join it during shutdown. Returns `false`
    /// if playback was cancelled.
    pub fn transmit<T, F>(
        &self,
        text: &str,
        translator: &mut T,
        sink: &mut F,
        cancel: &AtomicBool,
        timing_source: LearnedTiming,
    ) -> bool
    where
        T: EncodeTranslator,
        F: FnMut(bool),
    {
        let timing = LearnedTiming {
            unit: if self.adaptive {
                timing_source.unit
            } else {
                None
            },
            ratios: timing_source.ratios,
        };
        translator.set_timing(&timing);

        for ch in text.to_uppercase().chars() {
            translator.enqueue(ch);
        }
        let plan = translator.flush();
        info!(segments = plan.len(), adaptive = self.adaptive, "Starting playback");

        let mut completed = true;
        for segment in &plan {
            sink(segment.signal);
            thread::sleep(Duration::from_secs_f64(segment.duration.max(0.0)));
            if cancel.load(Ordering::SeqCst) {
                debug!("Playback cancelled at segment boundary");
                completed = false;
                break;
            }
        }

        // The transmitter must end in the off state no matter how the loop
        // exited
        sink(false);
        completed
    }
}

/// Runs one transmission on a dedicated worker thread
///
/// Owns the cancellation flag and the thread handle; dropping the controller
/// cancels the transmission and joins the worker.
pub struct PlaybackController {
    handle: Option<JoinHandle<bool>>,
    cancel: Arc<AtomicBool>,
}

impl PlaybackController {
    /// Start transmitting `text` on a new worker thread
    pub fn start<T, F>(
        encoder: Encoder,
        text: String,
        mut translator: T,
        mut sink: F,
        timing_source: LearnedTiming,
    ) -> Self
    where
        T: EncodeTranslator + Send + 'static,
        F: FnMut(bool) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            encoder.transmit(&text, &mut translator, &mut sink, &cancel_flag, timing_source)
        });

        Self {
            handle: Some(handle),
            cancel,
        }
    }

    /// Whether the worker is still transmitting
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Shared cancellation flag, for callers that cancel from elsewhere
    pub fn cancel_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Request cancellation without waiting for the worker
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Cancel and wait for the worker to finish
    ///
    /// Returns whether the transmission ran to completion, or `None` if the
    /// worker panicked or was already joined.
    pub fn stop(&mut self) -> Option<bool> {
        self.request_stop();
        self.join()
    }

    /// Wait for the worker without cancelling it
    pub fn join(&mut self) -> Option<bool> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(completed) => Some(completed),
            Err(err) => {
                warn!("Playback worker panicked: {:?}", err);
                None
            }
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if self.handle.is_some() {
            debug!("PlaybackController dropped, stopping transmission");
            self.stop();
        }
    }
}
