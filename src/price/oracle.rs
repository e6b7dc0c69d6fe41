use crate::error::{Result, UploadError};
use crate::network::client::StorageNetwork;
use crate::types::ArAmount;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Estimates the cost of storing data permanently
#[derive(Clone)]
pub struct PriceOracle {
    network: Arc<dyn StorageNetwork>,
    timeout: Duration,
}

impl PriceOracle {
    pub fn new(network: Arc<dyn StorageNetwork>, timeout: Duration) -> Self {
        Self { network, timeout }
    }

    /// Cost of storing `size_bytes` bytes, in AR
    ///
    /// Any failure, including a timeout, is reported as `PriceUnavailable`.
    pub async fn estimate(&self, size_bytes: u64) -> Result<ArAmount> {
        let price = match tokio::time::timeout(self.timeout, self.network.price(size_bytes)).await
        {
            Ok(Ok(winston)) => winston,
            Ok(Err(err)) => {
                warn!("Price lookup for {} bytes failed: {}", size_bytes, err);
                return Err(match err {
                    UploadError::PriceUnavailable { .. } => err,
                    other => UploadError::price_unavailable(other.to_string()),
                });
            }
            Err(_) => {
                warn!("Price lookup for {} bytes timed out", size_bytes);
                return Err(UploadError::price_unavailable(format!(
                    "No response within {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        let amount = price.to_ar();
        debug!("{} bytes cost {} winston ({} AR)", size_bytes, price, amount);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::SignedTransaction;
    use crate::types::Winston;
    use async_trait::async_trait;

    enum Behaviour {
        Fixed(u128),
        Fail,
        Hang,
    }

    struct Network(Behaviour);

    #[async_trait]
    impl StorageNetwork for Network {
        async fn price(&self, _size_bytes: u64) -> Result<Winston> {
            match self.0 {
                Behaviour::Fixed(amount) => Ok(Winston::new(amount)),
                Behaviour::Fail => Err(UploadError::network("price", "connection refused")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Winston::new(1))
                }
            }
        }

        async fn tx_anchor(&self) -> Result<String> {
            Ok("anchor".into())
        }

        async fn submit(&self, _transaction: &SignedTransaction) -> Result<()> {
            Ok(())
        }
    }

    fn oracle(behaviour: Behaviour) -> PriceOracle {
        PriceOracle::new(Arc::new(Network(behaviour)), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_estimate_converts_to_ar() {
        let amount = oracle(Behaviour::Fixed(123_000_000))
            .estimate(1_048_576)
            .await
            .unwrap();
        assert_eq!(amount.as_str(), "0.000123");
    }

    #[tokio::test]
    async fn test_zero_bytes_is_valid() {
        let amount = oracle(Behaviour::Fixed(0)).estimate(0).await.unwrap();
        assert_eq!(amount.as_str(), "0");
    }

    #[tokio::test]
    async fn test_failure_is_price_unavailable() {
        let err = oracle(Behaviour::Fail).estimate(10).await.unwrap_err();
        assert!(matches!(err, UploadError::PriceUnavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_price_unavailable() {
        let err = oracle(Behaviour::Hang).estimate(10).await.unwrap_err();
        assert!(matches!(err, UploadError::PriceUnavailable { .. }));
        assert!(err.to_string().contains("30s"));
    }
}
