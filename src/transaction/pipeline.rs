//! Upload transaction pipeline
//!
//! Builds a data transaction from a file, tags it with the file's content
//! type, has the connected wallet sign it, and submits it. There is no
//! rollback: each step is final once it succeeds.

use crate::error::{Result, UploadError};
use crate::network::client::StorageNetwork;
use crate::network::config::NetworkConfig;
use crate::transaction::types::{SignedTransaction, Transaction};
use crate::types::TxId;
use crate::upload::file::FileRef;
use crate::wallet::adapter::ConnectedWallet;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const CONTENT_TYPE_TAG: &str = "Content-Type";

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub tx_id: TxId,
    pub size: u64,
    pub content_type: String,
    pub url: String,
    pub duration_ms: u64,
    pub submitted_at: DateTime<Utc>,
}

impl UploadReceipt {
    pub fn new(tx_id: TxId, size: u64) -> Self {
        Self {
            tx_id,
            size,
            content_type: String::new(),
            url: String::new(),
            duration_ms: 0,
            submitted_at: Utc::now(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Turns files into submitted transactions
#[derive(Clone)]
pub struct TransactionPipeline {
    network: Arc<dyn StorageNetwork>,
    config: NetworkConfig,
}

impl TransactionPipeline {
    pub fn new(network: Arc<dyn StorageNetwork>, config: NetworkConfig) -> Self {
        Self { network, config }
    }

    pub fn max_payload_bytes(&self) -> u64 {
        self.config.max_payload_bytes
    }

    /// Builds, signs and submits `file`, returning its receipt
    pub async fn build_and_submit(
        &self,
        file: &FileRef,
        wallet: &ConnectedWallet,
    ) -> Result<UploadReceipt> {
        let start = Instant::now();
        let signed = self.sign_file(file, wallet).await?;
        self.broadcast(&signed).await?;

        Ok(self
            .receipt(&signed)
            .duration_ms(start.elapsed().as_millis() as u64))
    }

    /// Steps 1 to 4: read, build, tag and sign
    pub async fn sign_file(
        &self,
        file: &FileRef,
        wallet: &ConnectedWallet,
    ) -> Result<SignedTransaction> {
        let signer = wallet.signer()?;
        let transaction = self.build(file).await?;
        let data_root = transaction.data_root();

        debug!(
            "Requesting signature for {} ({}) from {}",
            file.name(),
            file.size_string(),
            wallet.address().abbreviated()
        );
        let signed = signer.sign(transaction).await.map_err(|e| {
            warn!("Signing failed: {}", e);
            UploadError::signing_failed(e.message())
        })?;

        if signed.transaction().data_size() != file.size_bytes()
            || signed.transaction().data_root() != data_root
        {
            return Err(UploadError::signing_failed(
                "Signed transaction does not carry the selected file",
            ));
        }

        info!("Signed transaction {}", signed.id());
        Ok(signed)
    }

    /// Steps 1 to 3: an unsigned, tagged transaction carrying the file bytes
    pub async fn build(&self, file: &FileRef) -> Result<Transaction> {
        let size = file.size_bytes();
        if size > self.config.max_payload_bytes {
            return Err(UploadError::payload_too_large(
                size,
                self.config.max_payload_bytes,
            ));
        }

        let limit = self.config.read_timeout();
        let (anchor, reward) = futures::try_join!(
            with_read_timeout(limit, "tx_anchor", self.network.tx_anchor()),
            with_read_timeout(limit, "price", async {
                self.network
                    .price(size)
                    .await
                    .map_err(|e| UploadError::network("price", e.to_string()))
            }),
        )?;

        let mut transaction = Transaction::new(file.data().clone(), anchor, reward);
        transaction.add_tag(CONTENT_TYPE_TAG, file.mime_type());
        debug!(
            "Built transaction: {} bytes, reward {} winston",
            size, reward
        );
        Ok(transaction)
    }

    /// Step 5: submit a signed transaction
    ///
    /// Safe to call again with the same transaction after a `BroadcastFailed`.
    /// The timeout applies per request, so chunked uploads get one budget
    /// for the header and one for each chunk.
    pub async fn broadcast(&self, signed: &SignedTransaction) -> Result<()> {
        let requests = signed.request_count();
        let limit = self.config.broadcast_timeout() * requests;
        info!("Broadcasting {} ({} requests)", signed.id(), requests);

        match tokio::time::timeout(limit, self.network.submit(signed)).await {
            Ok(Ok(())) => {
                info!("Broadcast {} accepted", signed.id());
                Ok(())
            }
            Ok(Err(err)) => {
                warn!("Broadcast {} failed: {}", signed.id(), err);
                Err(match err {
                    UploadError::BroadcastFailed { .. } => err,
                    other => UploadError::broadcast_failed(other.to_string(), None),
                })
            }
            Err(_) => {
                warn!("Broadcast {} timed out", signed.id());
                Err(UploadError::broadcast_failed(
                    format!("No response within {}s", limit.as_secs()),
                    None,
                ))
            }
        }
    }

    /// Step 6: the receipt for a submitted transaction
    pub fn receipt(&self, signed: &SignedTransaction) -> UploadReceipt {
        let tx = signed.transaction();
        UploadReceipt::new(signed.id().clone(), tx.data_size())
            .content_type(tx.tag(CONTENT_TYPE_TAG).unwrap_or_default())
            .url(self.config.gateway_url(signed.id()))
    }
}

async fn with_read_timeout<T, F>(limit: Duration, operation: &str, read: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, read)
        .await
        .map_err(|_| UploadError::network(operation, format!("No response within {}s", limit.as_secs())))?
}
