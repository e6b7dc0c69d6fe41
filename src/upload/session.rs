//! Upload session state
//!
//! [`UploadSession`] is the aggregate the controller mutates;
//! [`SessionState`] is the read-only snapshot handed to presentation.

use crate::error::ErrorInfo;
use crate::transaction::types::SignedTransaction;
use crate::types::{Address, ArAmount, TxId};
use crate::upload::file::FileRef;
use crate::wallet::adapter::ConnectedWallet;
use crate::wallet::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of an upload session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Priced,
    Connecting,
    Connected,
    Uploading,
    Complete,
    Failed,
}

impl Phase {
    /// Whether an external call owned by the session is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Connecting | Phase::Uploading)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Priced => "priced",
            Phase::Connecting => "connecting",
            Phase::Connected => "connected",
            Phase::Uploading => "uploading",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A signed transaction whose broadcast failed, kept for retry
#[derive(Debug, Clone)]
pub(crate) struct PendingBroadcast {
    pub(crate) selection: u64,
    pub(crate) address: Address,
    pub(crate) transaction: SignedTransaction,
}

/// The state of one user's upload interaction
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    pub(crate) selected_file: Option<FileRef>,
    pub(crate) estimated_cost: Option<ArAmount>,
    pub(crate) provider: ProviderKind,
    pub(crate) connected: Option<ConnectedWallet>,
    pub(crate) phase: Phase,
    pub(crate) result_tx_id: Option<TxId>,
    pub(crate) last_error: Option<ErrorInfo>,
    /// Bumped on every file selection; stale price results are dropped
    pub(crate) selection: u64,
    pub(crate) pending: Option<PendingBroadcast>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&FileRef> {
        self.selected_file.as_ref()
    }

    pub fn estimated_cost(&self) -> Option<&ArAmount> {
        self.estimated_cost.as_ref()
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn connected_wallet(&self) -> Option<&ConnectedWallet> {
        self.connected.as_ref()
    }

    pub fn connected_address(&self) -> Option<&Address> {
        self.connected.as_ref().map(ConnectedWallet::address)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result_tx_id(&self) -> Option<&TxId> {
        self.result_tx_id.as_ref()
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.last_error.as_ref()
    }

    /// Snapshot for presentation
    pub fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            provider: self.provider,
            file_name: self.selected_file.as_ref().map(|f| f.name().to_string()),
            file_size: self.selected_file.as_ref().map(FileRef::size_bytes),
            estimated_cost: self.estimated_cost.clone(),
            connected_address: self.connected_address().cloned(),
            result_tx_id: self.result_tx_id.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Observable session state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub provider: ProviderKind,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub estimated_cost: Option<ArAmount>,
    pub connected_address: Option<Address>,
    pub result_tx_id: Option<TxId>,
    pub last_error: Option<ErrorInfo>,
}
