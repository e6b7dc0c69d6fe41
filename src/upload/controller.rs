//! Upload session controller
//!
//! [`UploadSessionController`] is the only writer of an [`UploadSession`].
//! Every command checks and advances the phase under the session lock, runs
//! its external call with the lock released, then applies the outcome under
//! the lock again. Observers receive a [`SessionState`] snapshot after every
//! visible change through a `tokio::sync::watch` channel.

use crate::error::{ErrorInfo, Result, UploadError};
use crate::network::client::StorageNetwork;
use crate::network::config::NetworkConfig;
use crate::price::PriceOracle;
use crate::transaction::pipeline::{TransactionPipeline, UploadReceipt};
use crate::types::{Address, ArAmount};
use crate::upload::file::FileRef;
use crate::upload::session::{PendingBroadcast, Phase, SessionState, UploadSession};
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::environment::ProviderEnvironment;
use crate::wallet::types::ProviderKind;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

struct Inner {
    session: Mutex<UploadSession>,
    state_tx: watch::Sender<SessionState>,
    oracle: PriceOracle,
    wallets: WalletAdapter,
    pipeline: TransactionPipeline,
    config: NetworkConfig,
}

/// Handle to one upload session
///
/// Cloning the handle shares the session.
#[derive(Clone)]
pub struct UploadSessionController {
    inner: Arc<Inner>,
}

impl UploadSessionController {
    pub fn new(
        config: NetworkConfig,
        network: Arc<dyn StorageNetwork>,
        environment: Arc<dyn ProviderEnvironment>,
    ) -> Result<Self> {
        config.validate()?;

        let oracle = PriceOracle::new(Arc::clone(&network), config.read_timeout());
        let wallets = WalletAdapter::new(environment)
            .keplr_chain_id(config.keplr_chain_id.clone())
            .connect_timeout(config.connect_timeout());
        let pipeline = TransactionPipeline::new(network, config.clone());

        let session = UploadSession::new();
        let (state_tx, _) = watch::channel(session.state());

        Ok(Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                state_tx,
                oracle,
                wallets,
                pipeline,
                config,
            }),
        })
    }

    /// A controller talking to the node described by `config` over HTTP
    #[cfg(feature = "http")]
    pub fn with_http(
        config: NetworkConfig,
        environment: Arc<dyn ProviderEnvironment>,
    ) -> Result<Self> {
        let network = Arc::new(crate::network::client::HttpNetwork::new(&config)?);
        Self::new(config, network, environment)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.inner.config
    }

    /// Current snapshot of the session
    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receives a new snapshot after every visible change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Gateway URL of the last completed upload
    pub fn result_url(&self) -> Option<String> {
        self.lock()
            .result_tx_id()
            .map(|id| self.inner.config.gateway_url(id))
    }

    /// Replaces the selected file and prices it
    ///
    /// Returns `Ok(None)` when pricing failed (the error is kept in
    /// `last_error`) or when a newer selection superseded this one.
    pub async fn select_file(&self, file: FileRef) -> Result<Option<ArAmount>> {
        let size = file.size_bytes();
        let selection = self.update(|s| {
            if s.phase == Phase::Uploading {
                return Err(UploadError::invalid_state("select a file", s.phase));
            }

            info!("Selected {} ({})", file.name(), file.size_string());
            s.selected_file = Some(file);
            s.estimated_cost = None;
            s.result_tx_id = None;
            s.last_error = None;
            s.pending = None;
            s.selection += 1;
            if matches!(s.phase, Phase::Complete | Phase::Failed) {
                s.phase = Phase::Idle;
            }
            Ok(s.selection)
        })?;

        let estimate = self.inner.oracle.estimate(size).await;

        Ok(self.update(|s| {
            if s.selection != selection {
                debug!("Discarding price for superseded selection {}", selection);
                return None;
            }
            match estimate {
                Ok(amount) => {
                    s.estimated_cost = Some(amount.clone());
                    if s.phase == Phase::Idle {
                        s.phase = Phase::Priced;
                    }
                    Some(amount)
                }
                Err(err) => {
                    s.last_error = Some(ErrorInfo::from(&err));
                    None
                }
            }
        }))
    }

    /// Records which wallet `connect` will use
    pub fn choose_provider(&self, kind: ProviderKind) -> Result<()> {
        self.update(|s| {
            if s.provider == kind {
                return Ok(());
            }
            if s.phase.is_busy() {
                return Err(UploadError::invalid_state("change wallet", s.phase));
            }
            debug!("Wallet provider set to {}", kind);
            s.provider = kind;
            Ok(())
        })
    }

    /// Connects the chosen wallet
    pub async fn connect(&self) -> Result<Address> {
        let kind = self.update(|s| {
            if s.phase.is_busy() {
                return Err(UploadError::invalid_state("connect", s.phase));
            }
            s.phase = Phase::Connecting;
            s.last_error = None;
            Ok(s.provider)
        })?;

        let mut flight = Flight::new(self, "connect");
        let outcome = self.inner.wallets.connect(kind).await;
        flight.land();

        self.update(|s| match outcome {
            Ok(wallet) => {
                let address = wallet.address().clone();
                s.connected = Some(wallet);
                s.phase = Phase::Connected;
                Ok(address)
            }
            Err(err) => {
                warn!("Connecting {} failed: {}", kind, err);
                s.connected = None;
                s.phase = Phase::Failed;
                s.last_error = Some(ErrorInfo::from(&err));
                Err(err)
            }
        })
    }

    /// Signs and broadcasts the selected file with the connected wallet
    ///
    /// After a `BroadcastFailed`, reconnecting the same address and calling
    /// `upload` again resubmits the already signed transaction.
    pub async fn upload(&self) -> Result<UploadReceipt> {
        let (file, wallet, selection, retry) = self.update(|s| {
            if s.phase != Phase::Connected {
                return Err(UploadError::invalid_state("upload", s.phase));
            }
            let wallet = s
                .connected
                .clone()
                .ok_or_else(|| UploadError::invalid_parameter("wallet", "No wallet connected"))?;

            // Signer support is checked before the file
            if !wallet.can_sign() {
                let err = UploadError::unsupported_signer(wallet.kind());
                s.last_error = Some(ErrorInfo::from(&err));
                return Err(err);
            }
            let Some(file) = s.selected_file.clone() else {
                let err = UploadError::invalid_parameter("file", "No file selected");
                s.last_error = Some(ErrorInfo::from(&err));
                return Err(err);
            };

            let selection = s.selection;
            let retry = s
                .pending
                .take()
                .filter(|p| p.selection == selection && &p.address == wallet.address())
                .map(|p| p.transaction);

            s.phase = Phase::Uploading;
            s.last_error = None;
            s.result_tx_id = None;
            Ok((file, wallet, selection, retry))
        })?;

        let mut flight = Flight::new(self, "upload");
        let start = Instant::now();
        let pipeline = &self.inner.pipeline;

        let signed = match retry {
            Some(signed) => {
                info!("Resubmitting signed transaction {}", signed.id());
                Ok(signed)
            }
            None => pipeline.sign_file(&file, &wallet).await,
        };
        let outcome = match signed {
            Ok(signed) => match pipeline.broadcast(&signed).await {
                Ok(()) => Ok(pipeline
                    .receipt(&signed)
                    .duration_ms(start.elapsed().as_millis() as u64)),
                Err(err) => Err((err, Some(signed))),
            },
            Err(err) => Err((err, None)),
        };
        flight.land();

        self.update(|s| match outcome {
            Ok(receipt) => {
                info!("Uploaded {} as {}", file.name(), receipt.tx_id);
                s.result_tx_id = Some(receipt.tx_id.clone());
                s.phase = Phase::Complete;
                Ok(receipt)
            }
            Err((err, signed)) => {
                warn!("Upload of {} failed: {}", file.name(), err);
                s.pending = signed.map(|transaction| PendingBroadcast {
                    selection,
                    address: wallet.address().clone(),
                    transaction,
                });
                s.last_error = Some(ErrorInfo::from(&err));
                s.phase = Phase::Failed;
                Err(err)
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, UploadSession> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutates the session under its lock and publishes the new snapshot
    /// if anything observable changed
    fn update<R>(&self, f: impl FnOnce(&mut UploadSession) -> R) -> R {
        let mut session = self.lock();
        let out = f(&mut session);
        let next = session.state();
        self.inner.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        out
    }
}

impl std::fmt::Debug for UploadSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSessionController")
            .field("state", &self.state())
            .finish()
    }
}

/// Moves the session to `Failed` if a command's future is dropped while
/// its external call is in flight
struct Flight<'a> {
    controller: &'a UploadSessionController,
    operation: &'static str,
    landed: bool,
}

impl<'a> Flight<'a> {
    fn new(controller: &'a UploadSessionController, operation: &'static str) -> Self {
        Self {
            controller,
            operation,
            landed: false,
        }
    }

    fn land(&mut self) {
        self.landed = true;
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if self.landed {
            return;
        }
        warn!("{} abandoned while in flight", self.operation);
        let err = UploadError::cancelled(self.operation);
        self.controller.update(|s| {
            if s.phase.is_busy() {
                s.phase = Phase::Failed;
                s.last_error = Some(ErrorInfo::from(&err));
            }
        });
    }
}
