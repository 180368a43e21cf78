//! Message relay - process-wide delivery point for hardware status text

use super::dispatcher::UiDispatcher;
use crate::config::{RelayConfig, MAX_QUEUE_CAPACITY};
use crate::error::{RelayError, Result};
use crate::message::HardwareMessage;
use arc_swap::ArcSwapOption;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, trace, warn};

/// Hook run after each successful hand-off, typically a UI repaint request
pub type Waker = Arc<dyn Fn() + Send + Sync>;

static SHARED: OnceCell<MessageRelay> = OnceCell::new();

/// The route from producers to the currently attached dispatcher
struct ConsumerLink {
    generation: u64,
    sender: mpsc::Sender<HardwareMessage>,
    waker: Option<Waker>,
}

pub(crate) struct RelayInner {
    config: RelayConfig,
    consumer: ArcSwapOption<ConsumerLink>,
    next_generation: AtomicU64,

    enqueued: AtomicU64,
    dropped_no_consumer: AtomicU64,
    dropped_queue_full: AtomicU64,
    dropped_closed: AtomicU64,
}

impl RelayInner {
    pub(crate) fn current_generation(&self) -> Option<u64> {
        self.consumer.load_full().map(|link| link.generation)
    }

    /// Clear the consumer slot if it still belongs to `generation`.
    pub(crate) fn release(&self, generation: u64) {
        let previous = self.consumer.rcu(|current| match current {
            Some(link) if link.generation == generation => None,
            other => other.clone(),
        });

        if matches!(previous, Some(ref link) if link.generation == generation) {
            info!("Presentation sink {} released", generation);
        }
    }
}

/// Counters describing what happened to delivered messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    /// Handed to a dispatcher's queue
    pub enqueued: u64,
    /// Dropped because no sink was attached
    pub dropped_no_consumer: u64,
    /// Dropped because the UI context had fallen behind
    pub dropped_queue_full: u64,
    /// Dropped because the dispatcher went away mid-delivery
    pub dropped_closed: u64,
}

impl RelayStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_no_consumer + self.dropped_queue_full + self.dropped_closed
    }
}

/// Delivers hardware status messages to a single presentation sink.
///
/// Cloning yields another handle to the same relay. Producers on any thread
/// call [`deliver`](Self::deliver); the UI context obtains a
/// [`UiDispatcher`] through [`attach`](Self::attach) and drives it.
#[derive(Clone)]
pub struct MessageRelay {
    inner: Arc<RelayInner>,
}

impl MessageRelay {
    /// Create a standalone relay. Nothing is registered globally.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                config,
                consumer: ArcSwapOption::empty(),
                next_generation: AtomicU64::new(0),
                enqueued: AtomicU64::new(0),
                dropped_no_consumer: AtomicU64::new(0),
                dropped_queue_full: AtomicU64::new(0),
                dropped_closed: AtomicU64::new(0),
            }),
        }
    }

    /// The process-wide relay.
    ///
    /// Returns the instance registered with [`install_shared`](Self::install_shared),
    /// or creates one with default settings on first access.
    pub fn shared() -> &'static MessageRelay {
        SHARED.get_or_init(|| {
            info!("Creating shared message relay with default configuration");
            MessageRelay::new(RelayConfig::default())
        })
    }

    /// Register `relay` as the process-wide instance.
    ///
    /// Must happen before anything calls [`shared`](Self::shared).
    pub fn install_shared(relay: MessageRelay) -> Result<&'static MessageRelay> {
        let mut installed = false;
        let shared = SHARED.get_or_init(|| {
            installed = true;
            relay
        });

        if installed {
            info!("Installed shared message relay");
            Ok(shared)
        } else {
            Err(RelayError::AlreadyInstalled)
        }
    }

    /// Hand `message` to the presentation sink.
    ///
    /// Never blocks and never fails: the message is queued for the UI context
    /// and this returns immediately. Without an attached sink, or when the UI
    /// queue is full, the message is dropped.
    pub fn deliver(&self, message: impl Into<HardwareMessage>) {
        let message = message.into();

        let Some(link) = self.inner.consumer.load_full() else {
            self.inner.dropped_no_consumer.fetch_add(1, Ordering::Relaxed);
            debug!("No presentation sink attached, dropping: {}", message);
            return;
        };

        match link.sender.try_send(message) {
            Ok(()) => {
                self.inner.enqueued.fetch_add(1, Ordering::Relaxed);
                if self.inner.config.verbose_logging {
                    trace!("Queued hardware message for sink {}", link.generation);
                }
                if let Some(waker) = &link.waker {
                    waker();
                }
            }
            Err(TrySendError::Full(message)) => {
                self.inner.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "UI queue full ({} pending), dropping: {}",
                    link.sender.max_capacity(),
                    message
                );
            }
            Err(TrySendError::Closed(message)) => {
                self.inner.dropped_closed.fetch_add(1, Ordering::Relaxed);
                debug!("Presentation sink {} went away, dropping: {}", link.generation, message);
            }
        }
    }

    /// Register `sink` as the consumer, replacing any previous one.
    pub fn attach<S>(&self, sink: S) -> UiDispatcher<S> {
        self.attach_link(sink, None)
    }

    /// Like [`attach`](Self::attach), and call `waker` after every queued message.
    pub fn attach_with_waker<S, W>(&self, sink: S, waker: W) -> UiDispatcher<S>
    where
        W: Fn() + Send + Sync + 'static,
    {
        self.attach_link(sink, Some(Arc::new(waker)))
    }

    fn attach_link<S>(&self, sink: S, waker: Option<Waker>) -> UiDispatcher<S> {
        let (sender, receiver) = mpsc::channel(self.queue_capacity());
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed) + 1;

        let previous = self.inner.consumer.swap(Some(Arc::new(ConsumerLink {
            generation,
            sender,
            waker,
        })));

        match previous {
            Some(old) => info!(
                "Presentation sink {} replaced by {}",
                old.generation, generation
            ),
            None => info!("Presentation sink {} attached", generation),
        }

        UiDispatcher::new(receiver, sink, generation, Arc::downgrade(&self.inner))
    }

    /// Remove the current consumer. Returns whether one was attached.
    pub fn detach(&self) -> bool {
        match self.inner.consumer.swap(None) {
            Some(old) => {
                info!("Presentation sink {} detached", old.generation);
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.consumer.load().is_some()
    }

    /// Messages a dispatcher can hold before deliveries are dropped.
    ///
    /// The configured value clamped to `1..=MAX_QUEUE_CAPACITY`.
    pub fn queue_capacity(&self) -> usize {
        self.inner.config.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY)
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            enqueued: self.inner.enqueued.load(Ordering::Relaxed),
            dropped_no_consumer: self.inner.dropped_no_consumer.load(Ordering::Relaxed),
            dropped_queue_full: self.inner.dropped_queue_full.load(Ordering::Relaxed),
            dropped_closed: self.inner.dropped_closed.load(Ordering::Relaxed),
        }
    }

    /// Whether both handles refer to the same relay
    pub fn ptr_eq(&self, other: &MessageRelay) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn debug_info(&self) -> String {
        let stats = self.stats();
        let sink = match self.inner.current_generation() {
            Some(generation) => format!("attached (#{})", generation),
            None => "none".to_string(),
        };

        format!(
            "Message Relay:\n\
            Sink: {}\n\
            Queue capacity: {}\n\
            Enqueued: {}\n\
            Dropped (no sink): {}\n\
            Dropped (queue full): {}\n\
            Dropped (sink closed): {}",
            sink,
            self.queue_capacity(),
            stats.enqueued,
            stats.dropped_no_consumer,
            stats.dropped_queue_full,
            stats.dropped_closed
        )
    }
}

impl std::fmt::Debug for MessageRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRelay")
            .field("config", &self.inner.config)
            .field("attached", &self.is_attached())
            .field("stats", &self.stats())
            .finish()
    }
}
