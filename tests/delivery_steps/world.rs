//! Shared world state for message delivery BDD scenarios.

use std::sync::Arc;

use cursorlog::broker::{
    adapters::memory::{InMemoryCursorStore, InMemoryMessageLog},
    domain::{ChannelName, Message, Payload},
    ports::MessageLogResult,
    services::{BrokerResult, BrokerService},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::json;

/// Service type used by the BDD world.
pub type TestBroker = BrokerService<InMemoryMessageLog, InMemoryCursorStore, DefaultClock>;

/// Scenario world for message delivery behaviour tests.
pub struct DeliveryWorld {
    pub log: Arc<InMemoryMessageLog>,
    pub broker: TestBroker,
    pub published: Vec<Message>,
    pub last_fetch: Option<BrokerResult<Vec<Message>>>,
    pub last_lookup: Option<BrokerResult<Option<Message>>>,
    pub store_results: Vec<MessageLogResult<()>>,
}

impl DeliveryWorld {
    /// Creates a world over empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        let log = Arc::new(InMemoryMessageLog::new());
        let broker = BrokerService::new(
            Arc::clone(&log),
            Arc::new(InMemoryCursorStore::new()),
            Arc::new(DefaultClock),
        );
        Self {
            log,
            broker,
            published: Vec::new(),
            last_fetch: None,
            last_lookup: None,
            store_results: Vec::new(),
        }
    }
}

impl Default for DeliveryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DeliveryWorld {
    DeliveryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a channel name from step text.
///
/// # Errors
///
/// Returns an error if the name is not a valid channel.
pub fn channel(name: &str) -> Result<ChannelName, eyre::Report> {
    ChannelName::new(name).map_err(|err| eyre::eyre!("invalid channel {name:?}: {err}"))
}

/// Builds the `{"msg": text}` payload used throughout the scenarios.
///
/// # Errors
///
/// Returns an error if the payload is rejected.
pub fn text_payload(text: &str) -> Result<Payload, eyre::Report> {
    Payload::try_from(json!({ "msg": text })).map_err(|err| eyre::eyre!("invalid payload: {err}"))
}

/// Extracts the `msg` text of a message.
#[must_use]
pub fn message_text(message: &Message) -> Option<&str> {
    message.payload().get("msg").and_then(serde_json::Value::as_str)
}
