//! Arweave network access
//!
//! This module holds the uploader configuration and the network API the
//! price oracle and the transaction pipeline are built on.

pub mod client;
pub mod config;

pub use client::StorageNetwork;
#[cfg(feature = "http")]
pub use client::HttpNetwork;
pub use config::{LogLevel, NetworkConfig, Protocol};
