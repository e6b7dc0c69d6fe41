//! Wallet connection
//!
//! [`WalletAdapter::connect`] runs the provider-specific connect sequence
//! and returns a [`ConnectedWallet`]. Only the [`ConnectedWallet::Network`]
//! arm carries a signer, so code that needs to sign has to match on it.

use crate::error::{Result, UploadError};
use crate::types::Address;
use crate::wallet::environment::ProviderEnvironment;
use crate::wallet::provider::{ArweaveWallet, ProviderError};
use crate::wallet::types::{ProviderKind, UPLOAD_PERMISSIONS};
use log::{debug, info, warn};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// A wallet that completed its connect sequence
#[derive(Clone)]
pub enum ConnectedWallet {
    /// The network-native wallet; can sign uploads
    Network {
        address: Address,
        wallet: Arc<dyn ArweaveWallet>,
    },
    /// A chain wallet; address discovery only
    Chain { kind: ProviderKind, address: Address },
}

impl ConnectedWallet {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ConnectedWallet::Network { .. } => ProviderKind::ArConnect,
            ConnectedWallet::Chain { kind, .. } => *kind,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            ConnectedWallet::Network { address, .. } | ConnectedWallet::Chain { address, .. } => {
                address
            }
        }
    }

    pub fn can_sign(&self) -> bool {
        matches!(self, ConnectedWallet::Network { .. })
    }

    /// The signer, or `UnsupportedSigner` for chain wallets
    pub fn signer(&self) -> Result<&Arc<dyn ArweaveWallet>> {
        match self {
            ConnectedWallet::Network { wallet, .. } => Ok(wallet),
            ConnectedWallet::Chain { kind, .. } => Err(UploadError::unsupported_signer(*kind)),
        }
    }
}

impl fmt::Debug for ConnectedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedWallet")
            .field("kind", &self.kind())
            .field("address", self.address())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

/// Connects to wallet providers found in a [`ProviderEnvironment`]
#[derive(Clone)]
pub struct WalletAdapter {
    environment: Arc<dyn ProviderEnvironment>,
    keplr_chain_id: String,
    connect_timeout: Option<Duration>,
}

impl WalletAdapter {
    pub fn new(environment: Arc<dyn ProviderEnvironment>) -> Self {
        Self {
            environment,
            keplr_chain_id: "cosmoshub-4".to_string(),
            connect_timeout: None,
        }
    }

    pub fn keplr_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.keplr_chain_id = chain_id.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn environment(&self) -> &Arc<dyn ProviderEnvironment> {
        &self.environment
    }

    /// Runs the connect sequence of `kind`
    pub async fn connect(&self, kind: ProviderKind) -> Result<ConnectedWallet> {
        info!("Connecting to {}", kind);

        let wallet = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, self.connect_provider(kind))
                .await
                .map_err(|_| {
                    UploadError::provider_failed(
                        kind,
                        format!("No response within {}s", limit.as_secs()),
                    )
                })??,
            None => self.connect_provider(kind).await?,
        };

        info!("Connected to {} as {}", kind, wallet.address().abbreviated());
        Ok(wallet)
    }

    async fn connect_provider(&self, kind: ProviderKind) -> Result<ConnectedWallet> {
        match kind {
            ProviderKind::ArConnect => {
                let wallet = self
                    .environment
                    .arweave_wallet()
                    .ok_or_else(|| UploadError::provider_not_installed(kind))?;

                wallet
                    .connect(&UPLOAD_PERMISSIONS)
                    .await
                    .map_err(|e| classify(kind, e))?;
                let address = wallet
                    .active_address()
                    .await
                    .map_err(|e| classify(kind, e))?;

                Ok(ConnectedWallet::Network {
                    address: parse_address(kind, &address)?,
                    wallet,
                })
            }
            ProviderKind::Phantom => {
                let wallet = self
                    .environment
                    .solana()
                    .filter(|solana| solana.is_phantom())
                    .ok_or_else(|| UploadError::provider_not_installed(kind))?;

                wallet.connect().await.map_err(|e| classify(kind, e))?;
                let public_key = wallet.public_key().ok_or_else(|| {
                    UploadError::provider_failed(kind, "No public key after connect")
                })?;

                Ok(ConnectedWallet::Chain {
                    kind,
                    address: parse_address(kind, &public_key)?,
                })
            }
            ProviderKind::Keplr => {
                let wallet = self
                    .environment
                    .keplr()
                    .ok_or_else(|| UploadError::provider_not_installed(kind))?;

                debug!("Enabling {} on Keplr", self.keplr_chain_id);
                wallet
                    .enable(&self.keplr_chain_id)
                    .await
                    .map_err(|e| classify(kind, e))?;
                let accounts = wallet
                    .accounts(&self.keplr_chain_id)
                    .await
                    .map_err(|e| classify(kind, e))?;
                let first = accounts
                    .first()
                    .ok_or_else(|| UploadError::provider_failed(kind, "No accounts returned"))?;

                Ok(ConnectedWallet::Chain {
                    kind,
                    address: parse_address(kind, first)?,
                })
            }
            ProviderKind::MetaMask => {
                let provider = self
                    .environment
                    .ethereum()
                    .ok_or_else(|| UploadError::provider_not_installed(kind))?;

                let accounts = provider
                    .request("eth_requestAccounts", serde_json::Value::Array(Vec::new()))
                    .await
                    .map_err(|e| classify(kind, e))?;
                let first = accounts
                    .as_array()
                    .and_then(|accounts| accounts.first())
                    .and_then(|account| account.as_str())
                    .ok_or_else(|| UploadError::provider_failed(kind, "No accounts returned"))?;

                Ok(ConnectedWallet::Chain {
                    kind,
                    address: parse_address(kind, first)?,
                })
            }
        }
    }
}

fn classify(kind: ProviderKind, err: ProviderError) -> UploadError {
    warn!("{} connect failed: {}", kind, err);
    match err {
        ProviderError::Rejected(msg) => UploadError::user_rejected(kind, msg),
        ProviderError::Failed(msg) => UploadError::provider_failed(kind, msg),
    }
}

fn parse_address(kind: ProviderKind, raw: &str) -> Result<Address> {
    Address::from_str(raw).map_err(|e| UploadError::provider_failed(kind, e.to_string()))
}
