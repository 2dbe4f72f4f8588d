//! Cursorlog: a durable message log with per-receiver read cursors.
//!
//! Producers append JSON payloads to named channels. Each message receives a
//! strictly increasing, gapless, zero-based index within its channel.
//! Receivers poll for messages they have not seen yet; the broker remembers,
//! per (receiver, channel), the highest index already delivered, so
//! successive polls walk forward through the channel.
//!
//! # Architecture
//!
//! Cursorlog follows hexagonal architecture principles:
//!
//! - **Domain**: validated identifiers, messages and cursors
//! - **Ports**: async repository traits for messages and cursors
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the ports
//! - **Services**: append with per-channel serialisation, cursor-driven fetch
//!
//! # Modules
//!
//! - [`broker`]: message log, receiver cursors and the query service
//! - [`config`]: TOML and environment configuration

pub mod broker;
pub mod config;
