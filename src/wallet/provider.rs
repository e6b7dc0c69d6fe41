//! Capabilities exposed by injected wallet providers
//!
//! Each trait mirrors the part of a provider's injected object the uploader
//! calls. Host glue (a wasm bridge, or a fake in tests) implements them.

use crate::transaction::types::{SignedTransaction, Transaction};
use crate::wallet::types::Permission;
use async_trait::async_trait;
use thiserror::Error;

/// EIP-1193 error code for a request the user declined
pub const EIP1193_USER_REJECTED: i64 = 4001;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Failure reported by a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The user declined the provider's consent prompt
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    /// Classifies an EIP-1193 style `{ code, message }` error
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == EIP1193_USER_REJECTED {
            ProviderError::Rejected(message.into())
        } else {
            ProviderError::Failed(message.into())
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::Rejected(msg) | ProviderError::Failed(msg) => msg,
        }
    }
}

/// The `window.arweaveWallet` object
#[async_trait]
pub trait ArweaveWallet: Send + Sync {
    async fn connect(&self, permissions: &[Permission]) -> ProviderResult<()>;

    async fn active_address(&self) -> ProviderResult<String>;

    /// Signs `transaction`, returning it with owner, signature and id set
    ///
    /// `transaction` already carries its `data_root` (see
    /// [`Transaction::data_root`]); the signature covers it and the returned
    /// [`SignedTransaction`] must wrap the same data.
    async fn sign(&self, transaction: Transaction) -> ProviderResult<SignedTransaction>;
}

/// The `window.solana` object
#[async_trait]
pub trait SolanaWallet: Send + Sync {
    fn is_phantom(&self) -> bool;

    async fn connect(&self) -> ProviderResult<()>;

    /// Base58 public key, available once connected
    fn public_key(&self) -> Option<String>;
}

/// The `window.keplr` object
#[async_trait]
pub trait KeplrWallet: Send + Sync {
    async fn enable(&self, chain_id: &str) -> ProviderResult<()>;

    /// Account addresses of `getOfflineSigner(chain_id).getAccounts()`
    async fn accounts(&self, chain_id: &str) -> ProviderResult<Vec<String>>;
}

/// The `window.ethereum` EIP-1193 object
#[async_trait]
pub trait EthereumProvider: Send + Sync {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ProviderResult<serde_json::Value>;
}
