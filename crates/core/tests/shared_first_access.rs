//! Concurrent first access to the shared relay in a fresh process.

use hwrelay_core::{MessageRelay, RelayConfig, RelayError};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_access_constructs_once() {
    let barrier = Arc::new(Barrier::new(10));
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..1000)
                    .map(|_| MessageRelay::shared() as *const MessageRelay as usize)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut addresses: Vec<usize> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(addresses.len(), 10_000);

    addresses.dedup();
    assert_eq!(addresses.len(), 1);

    // The racing threads settled on one instance and nothing can replace it.
    let late = MessageRelay::install_shared(MessageRelay::new(RelayConfig::default()));
    assert!(matches!(late, Err(RelayError::AlreadyInstalled)));
    assert_eq!(MessageRelay::shared() as *const MessageRelay as usize, addresses[0]);
}
