//! Relay between hardware producers and the UI presentation sink

pub mod dispatcher;
pub mod manager;
pub mod sink;

pub use dispatcher::UiDispatcher;
pub use manager::{MessageRelay, RelayStats, Waker};
pub use sink::{PresentationSink, Presented, RecordingSink};
