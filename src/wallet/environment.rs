//! Access to injected wallet providers
//!
//! The adapter never looks providers up globally; it asks a
//! [`ProviderEnvironment`]. [`InjectedProviders`] is a registry the host
//! fills as providers announce themselves.

use crate::wallet::provider::{ArweaveWallet, EthereumProvider, KeplrWallet, SolanaWallet};
use crate::wallet::types::ProviderKind;
use std::sync::{Arc, PoisonError, RwLock};

/// Lookup of the provider objects present in the page
pub trait ProviderEnvironment: Send + Sync {
    fn arweave_wallet(&self) -> Option<Arc<dyn ArweaveWallet>>;

    fn solana(&self) -> Option<Arc<dyn SolanaWallet>>;

    fn keplr(&self) -> Option<Arc<dyn KeplrWallet>>;

    fn ethereum(&self) -> Option<Arc<dyn EthereumProvider>>;

    /// Whether the global for `kind` is present
    fn is_installed(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::ArConnect => self.arweave_wallet().is_some(),
            ProviderKind::Phantom => self.solana().is_some(),
            ProviderKind::Keplr => self.keplr().is_some(),
            ProviderKind::MetaMask => self.ethereum().is_some(),
        }
    }
}

#[derive(Default)]
struct Slots {
    arweave_wallet: Option<Arc<dyn ArweaveWallet>>,
    solana: Option<Arc<dyn SolanaWallet>>,
    keplr: Option<Arc<dyn KeplrWallet>>,
    ethereum: Option<Arc<dyn EthereumProvider>>,
}

/// Registry of injected providers
///
/// Providers may be installed after the controller is created, the way
/// browser extensions inject their globals after page load.
#[derive(Default)]
pub struct InjectedProviders {
    slots: RwLock<Slots>,
}

impl InjectedProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_arweave_wallet(&self, wallet: Arc<dyn ArweaveWallet>) {
        self.write().arweave_wallet = Some(wallet);
    }

    pub fn install_solana(&self, wallet: Arc<dyn SolanaWallet>) {
        self.write().solana = Some(wallet);
    }

    pub fn install_keplr(&self, wallet: Arc<dyn KeplrWallet>) {
        self.write().keplr = Some(wallet);
    }

    pub fn install_ethereum(&self, provider: Arc<dyn EthereumProvider>) {
        self.write().ethereum = Some(provider);
    }

    /// Removes the provider for `kind`, if present
    pub fn uninstall(&self, kind: ProviderKind) {
        let mut slots = self.write();
        match kind {
            ProviderKind::ArConnect => slots.arweave_wallet = None,
            ProviderKind::Phantom => slots.solana = None,
            ProviderKind::Keplr => slots.keplr = None,
            ProviderKind::MetaMask => slots.ethereum = None,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProviderEnvironment for InjectedProviders {
    fn arweave_wallet(&self) -> Option<Arc<dyn ArweaveWallet>> {
        self.read().arweave_wallet.clone()
    }

    fn solana(&self) -> Option<Arc<dyn SolanaWallet>> {
        self.read().solana.clone()
    }

    fn keplr(&self) -> Option<Arc<dyn KeplrWallet>> {
        self.read().keplr.clone()
    }

    fn ethereum(&self) -> Option<Arc<dyn EthereumProvider>> {
        self.read().ethereum.clone()
    }
}

impl std::fmt::Debug for InjectedProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.read();
        f.debug_struct("InjectedProviders")
            .field("arweave_wallet", &slots.arweave_wallet.is_some())
            .field("solana", &slots.solana.is_some())
            .field("keplr", &slots.keplr.is_some())
            .field("ethereum", &slots.ethereum.is_some())
            .finish()
    }
}
