//! Presentation sinks: the UI-side capability that shows a message to the user

use crate::message::HardwareMessage;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// Renders relayed messages.
///
/// Only ever called from the UI-owning context that drives the
/// [`UiDispatcher`](super::UiDispatcher), so implementations get `&mut self`
/// and need not be `Sync`.
pub trait PresentationSink {
    fn present(&mut self, message: HardwareMessage);
}

impl<F> PresentationSink for F
where
    F: FnMut(HardwareMessage),
{
    fn present(&mut self, message: HardwareMessage) {
        self(message)
    }
}

/// A message as it reached the sink
#[derive(Debug, Clone)]
pub struct Presented {
    pub message: HardwareMessage,
    /// Thread the sink was running on when the message arrived
    pub thread: ThreadId,
}

/// Sink that remembers everything it was shown.
///
/// Clones share the same record, so one clone can be handed to the
/// dispatcher while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Presented>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Presented> {
        self.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|p| p.message.text().to_string())
            .collect()
    }

    /// How many times `text` was presented
    pub fn count_of(&self, text: &str) -> usize {
        self.lock()
            .iter()
            .filter(|p| p.message.text() == text)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Presented>> {
        // A panicking sink on another thread must not hide what was recorded.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PresentationSink for RecordingSink {
    fn present(&mut self, message: HardwareMessage) {
        self.lock().push(Presented {
            message,
            thread: thread::current().id(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |message: HardwareMessage| seen.push(message.into_text());
            sink.present(HardwareMessage::new("Connected"));
            sink.present(HardwareMessage::new("Services ready"));
        }
        assert_eq!(seen, vec!["Connected", "Services ready"]);
    }

    #[test]
    fn test_recording_sink_clones_share_records() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();

        sink.present(HardwareMessage::new("A"));
        sink.present(HardwareMessage::new("A"));
        sink.present(HardwareMessage::new("B"));

        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.count_of("A"), 2);
        assert_eq!(recorder.texts(), vec!["A", "A", "B"]);
        assert_eq!(recorder.records()[0].thread, thread::current().id());
    }
}
