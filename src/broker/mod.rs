//! Durable message log with per-receiver read cursors.
//!
//! Producers append payloads to named channels; every message receives the
//! next gapless, zero-based index of its channel. Receivers pull the messages
//! they have not seen yet, and the broker remembers the highest index it has
//! handed to each (receiver, channel) pair. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
