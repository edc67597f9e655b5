// SPDX-License-Identifier: GPL-3.0-only

//! Ordered frame-to-letter sequencing
//!
//! Frames are analyzed on independent blocking workers, but the external
//! translator is stateful and order-sensitive: events must arrive in capture
//! order. Each submitted frame records a one-shot completion signal from its
//! predecessor and waits on it before touching the translator, so analysis
//! overlaps freely while the hand-off stays strictly serialized.

use crate::analysis::FrameAnalyzer;
use crate::capture::{FrameReceiver, LumaFrame};
use crate::config::DetectionConfig;
use crate::errors::{SequenceError, TranslatorFault};
use crate::translate::{DecodeTranslator, LearnedTiming};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sends the completion signal on drop
///
/// Every analysis unit must signal its successor on all exit paths,
/// including dropped frames and panics; otherwise the chain would stall
/// forever on a crashed predecessor.
struct CompletionGuard(Option<oneshot::Sender<()>>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.0.take() {
            // The successor may already be gone; that is fine
            let _ = tx.send(());
        }
    }
}

/// Decoding session: accepts frames, guarantees ordered translator hand-off,
/// buffers decoded letters
pub struct SignalSequencer<T: DecodeTranslator + 'static> {
    analyzer: Arc<FrameAnalyzer>,
    translator: Arc<tokio::sync::Mutex<T>>,
    letters: Arc<Mutex<VecDeque<String>>>,
    fault: Arc<Mutex<Option<TranslatorFault>>>,
    prev_done: Option<oneshot::Receiver<()>>,
    last_task: Option<JoinHandle<()>>,
    closed: bool,
}

impl<T: DecodeTranslator + 'static> SignalSequencer<T> {
    pub fn new(config: DetectionConfig, translator: T) -> Self {
        Self {
            analyzer: Arc::new(FrameAnalyzer::new(config)),
            translator: Arc::new(tokio::sync::Mutex::new(translator)),
            letters: Arc::new(Mutex::new(VecDeque::new())),
            fault: Arc::new(Mutex::new(None)),
            prev_done: None,
            last_task: None,
            closed: false,
        }
    }

    /// Schedule analysis of one frame
    ///
    /// Returns immediately; the frame is analyzed on a blocking worker and
    /// its result is handed to the translator once the previous submission
    /// has completed its own hand-off.
    pub fn submit(&mut self, frame: LumaFrame) -> Result<(), SequenceError> {
        if self.closed {
            return Err(SequenceError::Closed);
        }
        if let Some(fault) = self.latched_fault() {
            return Err(fault.into());
        }

        let (done_tx, done_rx) = oneshot::channel();
        let prev_done = self.prev_done.replace(done_rx);

        let analyzer = Arc::clone(&self.analyzer);
        let translator = Arc::clone(&self.translator);
        let letters = Arc::clone(&self.letters);
        let fault = Arc::clone(&self.fault);

        let handle = tokio::spawn(async move {
            // Dropped last, so the successor is released on every exit path
            let _done = CompletionGuard(Some(done_tx));

            // CPU-bound work runs off the async runtime and may overlap
            // with earlier frames still waiting for their hand-off
            let index = frame.index;
            let analyzed =
                tokio::task::spawn_blocking(move || analyzer.analyze(&frame)).await;

            // Strict ordering: wait for the predecessor before the hand-off
            if let Some(prev) = prev_done {
                let _ = prev.await;
            }

            let event = match analyzed {
                Ok(Ok(event)) => event,
                Ok(Err(err)) => {
                    // Malformed frame: drop it, the pipeline keeps going
                    debug!(index, error = %err, "Dropping frame");
                    return;
                }
                Err(err) => {
                    warn!(index, error = %err, "Analysis worker panicked");
                    return;
                }
            };

            // The lock spans feed and letter collection; defense in depth
            // on top of the ordering chain
            let mut translator = translator.lock().await;
            match translator.feed(event.signal, event.duration) {
                Ok(batch) => {
                    if !batch.is_empty() {
                        lock_unpoisoned(&letters).push_back(batch.into_iter().collect());
                    }
                }
                Err(err) => {
                    warn!(index, error = %err, "Translator rejected event");
                    lock_unpoisoned(&fault).get_or_insert(err);
                }
            }
        });

        self.last_task = Some(handle);
        Ok(())
    }

    /// Submit every frame arriving on a capture stream until it closes
    pub async fn pump(&mut self, mut frames: FrameReceiver) -> Result<(), SequenceError> {
        while let Some(frame) = frames.next().await {
            self.submit(frame)?;
        }
        Ok(())
    }

    /// Dequeue and concatenate all letters decoded so far
    ///
    /// Non-blocking; returns an empty string when nothing is pending.
    pub fn drain_letters(&self) -> Result<String, SequenceError> {
        if let Some(fault) = self.latched_fault() {
            return Err(fault.into());
        }
        let mut queue = lock_unpoisoned(&self.letters);
        Ok(queue.drain(..).collect())
    }

    /// Timing parameters the translator has learned from live signals
    pub async fn learned_timing(&self) -> LearnedTiming {
        self.translator.lock().await.learned_timing()
    }

    /// Terminate the session deterministically
    ///
    /// Waits for the last outstanding analysis unit (bounded by one frame's
    /// analysis cost), finalizes the translator and returns any trailing
    /// letters. Not cancellable by design. No frames are accepted afterward.
    pub async fn close(&mut self) -> Result<String, SequenceError> {
        if self.closed {
            return Ok(String::new());
        }
        self.closed = true;

        if let Some(handle) = self.last_task.take() {
            if let Err(err) = handle.await {
                return Err(SequenceError::Worker(err.to_string()));
            }
        }

        let trailing = {
            let mut translator = self.translator.lock().await;
            translator.finalize().map_err(SequenceError::from)?
        };
        if !trailing.is_empty() {
            lock_unpoisoned(&self.letters).push_back(trailing.into_iter().collect());
        }

        if let Some(fault) = self.latched_fault() {
            return Err(fault.into());
        }
        let mut queue = lock_unpoisoned(&self.letters);
        Ok(queue.drain(..).collect())
    }

    fn latched_fault(&self) -> Option<TranslatorFault> {
        lock_unpoisoned(&self.fault).clone()
    }
}

/// Lock a mutex, recovering the data from a poisoned lock
///
/// Queue and fault slots stay usable even if a worker panicked while
/// holding them.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::SignalEvent;

    /// Records every event it is fed and emits one marker letter per event
    struct RecordingTranslator {
        events: Arc<Mutex<Vec<SignalEvent>>>,
        fail_feed: bool,
    }

    impl RecordingTranslator {
        fn new(events: Arc<Mutex<Vec<SignalEvent>>>) -> Self {
            Self {
                events,
                fail_feed: false,
            }
        }
    }

    impl DecodeTranslator for RecordingTranslator {
        fn feed(&mut self, signal: bool, duration: f64) -> Result<Vec<char>, TranslatorFault> {
            if self.fail_feed {
                return Err(TranslatorFault("rejected".into()));
            }
            let mut events = self.events.lock().unwrap();
            events.push(SignalEvent { signal, duration });
            let marker = (b'a' + ((events.len() - 1) % 26) as u8) as char;
            Ok(vec![marker])
        }

        fn finalize(&mut self) -> Result<Vec<char>, TranslatorFault> {
            Ok(vec!['!'])
        }
    }

    /// Frame whose delta encodes its submission order
    fn tagged_frame(index: u64, large: bool) -> LumaFrame {
        // Large blurred frames take visibly longer to analyze than tiny
        // ones, so completion order diverges from submission order
        let side = if large { 256 } else { 2 };
        let data = vec![255u8; (side * side) as usize];
        LumaFrame::from_luma(side, side, data, index, index as f64 + 1.0).expect("frame")
    }

    fn test_config() -> DetectionConfig {
        DetectionConfig {
            blur: true,
            bounding_box: false,
            ..DetectionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_events_reach_translator_in_submission_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(Arc::clone(&events));
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        // Alternate slow and fast frames so analysis finishes out of order
        for i in 0..16u64 {
            sequencer.submit(tagged_frame(i, i % 2 == 0)).expect("submit");
        }
        sequencer.close().await.expect("close");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 16);
        for (i, event) in events.iter().enumerate() {
            assert!(
                (event.duration - (i as f64 + 1.0)).abs() < 1e-9,
                "event {} arrived out of order",
                i
            );
        }
    }

    #[tokio::test]
    async fn test_single_frame_sequence() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(Arc::clone(&events));
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        sequencer.submit(tagged_frame(0, false)).expect("submit");
        let trailing = sequencer.close().await.expect("close");
        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(trailing, "a!");
    }

    #[tokio::test]
    async fn test_letters_drain_in_fifo_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(Arc::clone(&events));
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        for i in 0..6u64 {
            sequencer.submit(tagged_frame(i, i % 2 == 0)).expect("submit");
        }
        let trailing = sequencer.close().await.expect("close");
        // One marker per event, in feed order, plus the finalize marker
        assert_eq!(trailing, "abcdef!");
    }

    #[tokio::test]
    async fn test_drain_is_non_blocking_and_empty_when_idle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(events);
        let sequencer = SignalSequencer::new(test_config(), translator);
        assert_eq!(sequencer.drain_letters().expect("drain"), "");
    }

    #[tokio::test]
    async fn test_close_waits_for_outstanding_work() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(Arc::clone(&events));
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        // Close immediately after submitting a slow frame; the hand-off
        // must still happen before finalize
        sequencer.submit(tagged_frame(0, true)).expect("submit");
        let trailing = sequencer.close().await.expect("close");
        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(trailing, "a!");
    }

    #[tokio::test]
    async fn test_translator_fault_latches() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut translator = RecordingTranslator::new(events);
        translator.fail_feed = true;
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        sequencer.submit(tagged_frame(0, false)).expect("submit");
        // Give the worker time to hit the fault
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert!(matches!(
            sequencer.drain_letters(),
            Err(SequenceError::Translator(_))
        ));
        assert!(matches!(
            sequencer.submit(tagged_frame(1, false)),
            Err(SequenceError::Translator(_))
        ));
    }

    #[tokio::test]
    async fn test_pump_submits_whole_stream() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(Arc::clone(&events));
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        let (mut tx, rx) = futures::channel::mpsc::channel(8);
        for i in 0..4u64 {
            tx.try_send(tagged_frame(i, false)).expect("send");
        }
        drop(tx);

        sequencer.pump(rx).await.expect("pump");
        sequencer.close().await.expect("close");
        assert_eq!(events.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_submit_after_close_rejected() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let translator = RecordingTranslator::new(events);
        let mut sequencer = SignalSequencer::new(test_config(), translator);

        sequencer.close().await.expect("close");
        assert!(matches!(
            sequencer.submit(tagged_frame(0, false)),
            Err(SequenceError::Closed)
        ));
    }
}
