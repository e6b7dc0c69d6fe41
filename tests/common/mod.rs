//! Fakes shared by the integration tests
//!
//! `FakeNetwork` stands in for an Arweave node; the provider fakes stand in
//! for the objects browser extensions inject into the page.

#![allow(dead_code)]

use arweave_upload::{
    Address, ArweaveWallet, EthereumProvider, FileRef, InjectedProviders, KeplrWallet,
    NetworkConfig, Permission, ProviderError, ProviderResult, Result, SignedTransaction,
    SolanaWallet, StorageNetwork, Transaction, TxId, UploadError, UploadSessionController,
    Winston,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const ARCONNECT_ADDRESS: &str = "abc123arweavewalletaddressxyz";
pub const PHANTOM_KEY: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const KEPLR_ADDRESS: &str = "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu";
pub const METAMASK_ADDRESS: &str = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";

/// 123,000,000 winston, shown as 0.000123 AR
pub const PRICE_WINSTON: u128 = 123_000_000;

/// An in-memory Arweave node
pub struct FakeNetwork {
    price: Mutex<Option<u128>>,
    price_delay: Mutex<Option<Duration>>,
    failing_submits: AtomicUsize,
    submit_delay: Mutex<Option<Duration>>,
    price_calls: AtomicUsize,
    submitted: Mutex<Vec<TxId>>,
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self {
            price: Mutex::new(Some(PRICE_WINSTON)),
            price_delay: Mutex::new(None),
            failing_submits: AtomicUsize::new(0),
            submit_delay: Mutex::new(None),
            price_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `None` makes every price read fail
    pub fn set_price(&self, winston: Option<u128>) {
        *self.price.lock().unwrap() = winston;
    }

    pub fn delay_price(&self, delay: Duration) {
        *self.price_delay.lock().unwrap() = Some(delay);
    }

    /// The next `count` submissions answer 502
    pub fn fail_submits(&self, count: usize) {
        self.failing_submits.store(count, Ordering::SeqCst);
    }

    pub fn delay_submit(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<TxId> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageNetwork for FakeNetwork {
    async fn price(&self, _size_bytes: u64) -> Result<Winston> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.price_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let price = *self.price.lock().unwrap();
        price
            .map(Winston::new)
            .ok_or_else(|| UploadError::price_unavailable("503 Service Unavailable"))
    }

    async fn tx_anchor(&self) -> Result<String> {
        Ok("fake-anchor".to_string())
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<()> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing_submits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(UploadError::broadcast_failed("502 Bad Gateway", Some(502)));
        }
        self.submitted.lock().unwrap().push(transaction.id().clone());
        Ok(())
    }
}

/// The network wallet, signing deterministically
#[derive(Default)]
pub struct FakeArConnect {
    pub reject_connect: bool,
    pub reject_sign: bool,
    /// When set, `sign` waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
    sign_calls: AtomicUsize,
    granted: Mutex<Vec<Permission>>,
}

impl FakeArConnect {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Default::default()
        })
    }

    pub fn rejecting_connect() -> Arc<Self> {
        Arc::new(Self {
            reject_connect: true,
            ..Default::default()
        })
    }

    pub fn rejecting_sign() -> Arc<Self> {
        Arc::new(Self {
            reject_sign: true,
            ..Default::default()
        })
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn granted(&self) -> Vec<Permission> {
        self.granted.lock().unwrap().clone()
    }

    /// The signature this wallet produces for `transaction`
    pub fn signature_for(transaction: &Transaction) -> Vec<u8> {
        format!(
            "{}:{}:{}",
            ARCONNECT_ADDRESS,
            transaction.last_tx(),
            transaction.data_size()
        )
        .into_bytes()
    }
}

#[async_trait]
impl ArweaveWallet for FakeArConnect {
    async fn connect(&self, permissions: &[Permission]) -> ProviderResult<()> {
        if self.reject_connect {
            return Err(ProviderError::Rejected(
                "User cancelled the AuthRequest".into(),
            ));
        }
        self.granted.lock().unwrap().extend_from_slice(permissions);
        Ok(())
    }

    async fn active_address(&self) -> ProviderResult<String> {
        Ok(ARCONNECT_ADDRESS.to_string())
    }

    async fn sign(&self, transaction: Transaction) -> ProviderResult<SignedTransaction> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.reject_sign {
            return Err(ProviderError::Rejected("User rejected the signature".into()));
        }
        let signature = Self::signature_for(&transaction);
        Ok(SignedTransaction::new(transaction, "fake-owner", signature))
    }
}

pub struct FakePhantom {
    pub is_phantom: bool,
    connected: Mutex<bool>,
}

impl FakePhantom {
    pub fn new(is_phantom: bool) -> Arc<Self> {
        Arc::new(Self {
            is_phantom,
            connected: Mutex::new(false),
        })
    }
}

#[async_trait]
impl SolanaWallet for FakePhantom {
    fn is_phantom(&self) -> bool {
        self.is_phantom
    }

    async fn connect(&self) -> ProviderResult<()> {
        *self.connected.lock().unwrap() = true;
        Ok(())
    }

    fn public_key(&self) -> Option<String> {
        if *self.connected.lock().unwrap() {
            Some(PHANTOM_KEY.to_string())
        } else {
            None
        }
    }
}

pub struct FakeKeplr {
    pub accounts: Vec<String>,
    pub reject: bool,
    enabled: Mutex<Vec<String>>,
}

impl FakeKeplr {
    pub fn new(accounts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            reject: false,
            enabled: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            accounts: Vec::new(),
            reject: true,
            enabled: Mutex::new(Vec::new()),
        })
    }

    pub fn enabled_chains(&self) -> Vec<String> {
        self.enabled.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeplrWallet for FakeKeplr {
    async fn enable(&self, chain_id: &str) -> ProviderResult<()> {
        if self.reject {
            return Err(ProviderError::Rejected("Request rejected".into()));
        }
        self.enabled.lock().unwrap().push(chain_id.to_string());
        Ok(())
    }

    async fn accounts(&self, _chain_id: &str) -> ProviderResult<Vec<String>> {
        Ok(self.accounts.clone())
    }
}

/// An EIP-1193 provider answering `eth_requestAccounts`
pub struct FakeMetaMask {
    pub accounts: Value,
    /// RPC error code returned instead of the accounts
    pub error_code: Option<i64>,
}

impl FakeMetaMask {
    pub fn new(accounts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            accounts: json!(accounts),
            error_code: None,
        })
    }

    pub fn failing(code: i64) -> Arc<Self> {
        Arc::new(Self {
            accounts: json!([]),
            error_code: Some(code),
        })
    }
}

#[async_trait]
impl EthereumProvider for FakeMetaMask {
    async fn request(&self, method: &str, _params: Value) -> ProviderResult<Value> {
        if method != "eth_requestAccounts" {
            return Err(ProviderError::from_rpc(-32601, "Method not found"));
        }
        match self.error_code {
            Some(code) => Err(ProviderError::from_rpc(code, "MetaMask error")),
            None => Ok(self.accounts.clone()),
        }
    }
}

pub fn controller(
    network: &Arc<FakeNetwork>,
    providers: &Arc<InjectedProviders>,
) -> UploadSessionController {
    controller_with(NetworkConfig::default(), network, providers)
}

pub fn controller_with(
    config: NetworkConfig,
    network: &Arc<FakeNetwork>,
    providers: &Arc<InjectedProviders>,
) -> UploadSessionController {
    UploadSessionController::new(config, network.clone(), providers.clone())
        .expect("valid configuration")
}

pub fn mib_file() -> FileRef {
    FileRef::new("photo.png", "image/png", vec![7u8; 1_048_576])
}

pub fn text_file(contents: &str) -> FileRef {
    FileRef::new("notes.txt", "text/plain", contents.as_bytes().to_vec())
}

pub fn address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}
