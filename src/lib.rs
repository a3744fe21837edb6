//! pokedex-client library: catalog fetching, response cache, search and favorites.

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod transport;

pub use client::{DexClient, FetchPhase, FetchProgress};
pub use config::ClientConfig;
pub use error::{DecodeError, FetchError, TransportError};
pub use model::{Entity, ListIndexEntry};
