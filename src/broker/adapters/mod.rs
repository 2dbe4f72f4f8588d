//! Persistence adapters for the broker ports.
//!
//! - [`memory`]: thread-safe in-memory storage for tests and embedding
//! - [`postgres`]: durable `PostgreSQL` storage using Diesel

pub mod memory;
pub mod postgres;
