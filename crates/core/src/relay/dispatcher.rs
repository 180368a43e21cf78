//! UI-side end of the relay channel

use super::manager::RelayInner;
use super::sink::PresentationSink;
use crate::message::HardwareMessage;
use std::sync::Weak;
use tokio::sync::mpsc;
use tracing::debug;

/// Drains relayed messages into a [`PresentationSink`].
///
/// Owned by the UI execution context. Pick the driver that matches it:
/// [`pump`](Self::pump) from a frame loop, [`run`](Self::run) on a UI task,
/// or [`run_blocking`](Self::run_blocking) on a dedicated UI thread.
///
/// The dispatcher stops receiving once its consumer slot is released, either
/// by [`MessageRelay::detach`](super::MessageRelay::detach) or by attaching a
/// newer sink. Messages already queued at that point are still presented.
/// Dropping a dispatcher that is still the current consumer detaches it.
pub struct UiDispatcher<S> {
    receiver: mpsc::Receiver<HardwareMessage>,
    sink: S,
    presented: u64,
    generation: u64,
    relay: Weak<RelayInner>,
}

impl<S> UiDispatcher<S> {
    pub(crate) fn new(
        receiver: mpsc::Receiver<HardwareMessage>,
        sink: S,
        generation: u64,
        relay: Weak<RelayInner>,
    ) -> Self {
        Self {
            receiver,
            sink,
            presented: 0,
            generation,
            relay,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Messages handed to the sink so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Whether producers are still routed to this dispatcher
    pub fn is_current(&self) -> bool {
        self.relay
            .upgrade()
            .map_or(false, |inner| inner.current_generation() == Some(self.generation))
    }
}

impl<S: PresentationSink> UiDispatcher<S> {
    /// Present everything queued right now without waiting. Returns the count.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.present(message);
            count += 1;
        }
        count
    }

    /// Present messages until the consumer slot is released.
    pub async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            self.present(message);
        }
        debug!(
            "UI dispatcher {} finished after {} messages",
            self.generation, self.presented
        );
    }

    /// Like [`run`](Self::run) but parks the current thread between messages.
    ///
    /// Panics if called from inside an async runtime.
    pub fn run_blocking(mut self) {
        while let Some(message) = self.receiver.blocking_recv() {
            self.present(message);
        }
        debug!(
            "UI dispatcher {} finished after {} messages",
            self.generation, self.presented
        );
    }

    fn present(&mut self, message: HardwareMessage) {
        self.presented += 1;
        self.sink.present(message);
    }
}

impl<S> Drop for UiDispatcher<S> {
    fn drop(&mut self) {
        if let Some(inner) = self.relay.upgrade() {
            inner.release(self.generation);
        }
    }
}
