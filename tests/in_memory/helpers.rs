//! Shared test helpers for in-memory adapter integration tests.

use cursorlog::broker::{
    adapters::memory::{InMemoryCursorStore, InMemoryMessageLog},
    domain::{ChannelName, Message, MessageIndex, Payload},
    services::BrokerService,
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::json;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Boxed error type for fallible tests.
pub type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Broker service wired to in-memory adapters.
pub type MemoryBroker = BrokerService<InMemoryMessageLog, InMemoryCursorStore, DefaultClock>;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a fresh in-memory message log for each test.
#[fixture]
pub fn log() -> InMemoryMessageLog {
    InMemoryMessageLog::new()
}

/// Provides a fresh in-memory cursor store for each test.
#[fixture]
pub fn cursors() -> InMemoryCursorStore {
    InMemoryCursorStore::new()
}

/// Provides a clock for message creation.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Provides a channel name for tests.
///
/// # Panics
///
/// Panics if the fixed channel name stops being valid.
#[fixture]
pub fn channel() -> ChannelName {
    ChannelName::new("chan1").expect("valid channel")
}

/// Provides a broker service over empty in-memory adapters.
#[fixture]
pub fn broker() -> MemoryBroker {
    BrokerService::new(
        Arc::new(InMemoryMessageLog::new()),
        Arc::new(InMemoryCursorStore::new()),
        Arc::new(DefaultClock),
    )
}

/// Builds a payload carrying `n`.
///
/// # Panics
///
/// Panics if payload validation rejects a single-key object.
#[must_use]
pub fn numbered(n: u64) -> Payload {
    Payload::try_from(json!({"n": n})).expect("object payload")
}

/// Builds a message at `index` without storing it.
#[must_use]
pub fn message_at(channel: &ChannelName, index: u64, clock: &DefaultClock) -> Message {
    Message::new(channel.clone(), MessageIndex::new(index), numbered(index), clock)
}

/// Returns the raw indices of `messages`.
#[must_use]
pub fn indices(messages: &[Message]) -> Vec<u64> {
    messages.iter().map(|message| message.index().value()).collect()
}
