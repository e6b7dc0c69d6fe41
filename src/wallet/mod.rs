//! Wallet providers
//!
//! This module detects injected wallet providers, runs their connect
//! sequences, and exposes the signing capability of the network wallet.

pub mod adapter;
pub mod environment;
pub mod provider;
pub mod types;

pub use adapter::{ConnectedWallet, WalletAdapter};
pub use environment::{InjectedProviders, ProviderEnvironment};
pub use provider::{
    ArweaveWallet, EthereumProvider, KeplrWallet, ProviderError, ProviderResult, SolanaWallet,
};
pub use types::{Permission, ProviderKind, UPLOAD_PERMISSIONS};
