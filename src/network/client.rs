//! Storage network API
//!
//! [`StorageNetwork`] is the seam between the uploader and the Arweave node
//! API; [`HttpNetwork`] implements it over HTTP.

use crate::error::Result;
use crate::transaction::types::SignedTransaction;
use crate::types::Winston;
use async_trait::async_trait;

/// The subset of the Arweave node API the uploader needs
#[async_trait]
pub trait StorageNetwork: Send + Sync {
    /// Storage price of `size_bytes` of data, in winston
    async fn price(&self, size_bytes: u64) -> Result<Winston>;

    /// Anchor to use as `last_tx` for a new transaction
    async fn tx_anchor(&self) -> Result<String>;

    /// Submit a signed transaction
    async fn submit(&self, transaction: &SignedTransaction) -> Result<()>;
}

#[cfg(feature = "http")]
pub use http::HttpNetwork;

#[cfg(feature = "http")]
mod http {
    use super::StorageNetwork;
    use crate::error::{Result, UploadError};
    use crate::network::config::NetworkConfig;
    use crate::transaction::types::SignedTransaction;
    use crate::types::Winston;
    use async_trait::async_trait;
    use log::debug;
    use reqwest::StatusCode;
    use serde::Serialize;
    use std::time::Duration;

    /// [`StorageNetwork`] backed by an Arweave node or gateway over HTTP
    #[derive(Debug, Clone)]
    pub struct HttpNetwork {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpNetwork {
        pub fn new(config: &NetworkConfig) -> Result<Self> {
            let client = reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| {
                    UploadError::config_error(format!("Failed to build HTTP client: {}", e))
                })?;
            Self::with_client(config, client)
        }

        /// Uses a caller-configured client (proxies, TLS roots, ...)
        pub fn with_client(config: &NetworkConfig, client: reqwest::Client) -> Result<Self> {
            config.validate()?;
            Ok(Self {
                client,
                base_url: config.base_url(),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        async fn get_text(&self, path: &str) -> std::result::Result<String, String> {
            let url = format!("{}/{}", self.base_url, path);
            debug!("GET {}", url);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| e.to_string())?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("{} returned {}", url, status));
            }

            response.text().await.map_err(|e| e.to_string())
        }

        async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
            let url = format!("{}/{}", self.base_url, path);

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| UploadError::broadcast_failed(e.to_string(), None))?;

            let status = response.status();
            // 208: the node already holds this transaction
            if status.is_success() || status == StatusCode::ALREADY_REPORTED {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(UploadError::broadcast_failed(
                format!("POST /{}: {} {}", path, status, body.trim()),
                Some(status.as_u16()),
            ))
        }
    }

    #[async_trait]
    impl StorageNetwork for HttpNetwork {
        async fn price(&self, size_bytes: u64) -> Result<Winston> {
            let body = self
                .get_text(&format!("price/{}", size_bytes))
                .await
                .map_err(UploadError::price_unavailable)?;

            body.trim()
                .parse::<Winston>()
                .map_err(|e| UploadError::price_unavailable(e.to_string()))
        }

        async fn tx_anchor(&self) -> Result<String> {
            let anchor = self
                .get_text("tx_anchor")
                .await
                .map_err(|e| UploadError::network("tx_anchor", e))?;

            let anchor = anchor.trim();
            if anchor.is_empty() {
                return Err(UploadError::network("tx_anchor", "Empty anchor"));
            }
            Ok(anchor.to_string())
        }

        /// Posts the header, then each chunk when the data is too large to
        /// travel inline. Nodes accept chunks they already hold, so a failed
        /// submission can be repeated as a whole.
        async fn submit(&self, transaction: &SignedTransaction) -> Result<()> {
            debug!("POST {}/tx ({})", self.base_url, transaction.id());
            self.post_json("tx", &transaction.to_wire()).await?;

            let total = transaction.request_count() - 1;
            for (index, chunk) in transaction.chunk_uploads().enumerate() {
                debug!(
                    "POST {}/chunk ({} of {}, offset {})",
                    self.base_url,
                    index + 1,
                    total,
                    chunk.offset
                );
                self.post_json("chunk", &chunk).await?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::network::config::Protocol;
        use crate::transaction::merkle::MAX_CHUNK_SIZE;
        use crate::transaction::types::{Transaction, WireChunk, WireTransaction};
        use bytes::Bytes;
        use std::sync::{Arc, Mutex};
        use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpListener;

        type Requests = Arc<Mutex<Vec<(String, String)>>>;

        /// Answers each incoming request with the next canned
        /// `(status, body)` and records its request line and body
        async fn serve(replies: Vec<(u16, &'static str)>) -> (HttpNetwork, Requests) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let requests: Requests = Arc::new(Mutex::new(Vec::new()));

            let seen = requests.clone();
            tokio::spawn(async move {
                for (status, reply) in replies {
                    let (stream, _) = listener.accept().await.unwrap();
                    let mut reader = BufReader::new(stream);

                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).await.unwrap();
                    let mut length = 0;
                    loop {
                        let mut header = String::new();
                        reader.read_line(&mut header).await.unwrap();
                        if header.trim().is_empty() {
                            break;
                        }
                        if let Some((name, value)) = header.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                length = value.trim().parse().unwrap();
                            }
                        }
                    }
                    let mut body = vec![0u8; length];
                    reader.read_exact(&mut body).await.unwrap();
                    seen.lock().unwrap().push((
                        request_line.trim_end().to_string(),
                        String::from_utf8(body).unwrap(),
                    ));

                    let response = format!(
                        "HTTP/1.1 {} Canned\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        reply.len(),
                        reply
                    );
                    let mut stream = reader.into_inner();
                    stream.write_all(response.as_bytes()).await.unwrap();
                    stream.shutdown().await.unwrap();
                }
            });

            let config = NetworkConfig::new()
                .host("127.0.0.1")
                .port(port)
                .protocol(Protocol::Http);
            let client = reqwest::Client::builder().no_proxy().build().unwrap();
            let network = HttpNetwork::with_client(&config, client).unwrap();
            (network, requests)
        }

        fn signed(len: usize) -> SignedTransaction {
            let tx = Transaction::new(Bytes::from(vec![3u8; len]), "anchor", Winston::new(5));
            SignedTransaction::new(tx, "owner", b"sig".to_vec())
        }

        #[test]
        fn test_http_network_base_url() {
            let config = NetworkConfig::new()
                .host("localhost")
                .port(1984)
                .protocol(Protocol::Http);
            let network = HttpNetwork::new(&config).unwrap();
            assert_eq!(network.base_url(), "http://localhost:1984");
        }

        #[test]
        fn test_http_network_rejects_invalid_config() {
            let config = NetworkConfig::new().host("");
            assert!(HttpNetwork::new(&config).is_err());
        }

        #[tokio::test]
        async fn test_price_parses_winston() {
            let (network, requests) = serve(vec![(200, "123000000\n")]).await;

            let price = network.price(1_048_576).await.unwrap();
            assert_eq!(price, Winston::new(123_000_000));
            assert_eq!(requests.lock().unwrap()[0].0, "GET /price/1048576 HTTP/1.1");
        }

        #[tokio::test]
        async fn test_price_rejects_bad_replies() {
            let (network, _) = serve(vec![(200, "not a number"), (500, "")]).await;

            let err = network.price(10).await.unwrap_err();
            assert!(matches!(err, UploadError::PriceUnavailable { .. }));
            let err = network.price(10).await.unwrap_err();
            assert!(matches!(err, UploadError::PriceUnavailable { .. }));
        }

        #[tokio::test]
        async fn test_tx_anchor() {
            let (network, _) = serve(vec![(200, "anchor123\n"), (200, "")]).await;

            assert_eq!(network.tx_anchor().await.unwrap(), "anchor123");
            let err = network.tx_anchor().await.unwrap_err();
            assert!(matches!(err, UploadError::Network { .. }));
        }

        #[tokio::test]
        async fn test_submit_accepts_already_processed() {
            let (network, requests) = serve(vec![(208, "Transaction already processed.")]).await;

            let transaction = signed(5);
            network.submit(&transaction).await.unwrap();

            let requests = requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].0, "POST /tx HTTP/1.1");
            let wire: WireTransaction = serde_json::from_str(&requests[0].1).unwrap();
            assert_eq!(wire, transaction.to_wire());
            assert_eq!(wire.data, "AwMDAwM");
        }

        #[tokio::test]
        async fn test_submit_rejection_keeps_status() {
            let (network, _) = serve(vec![(400, "Transaction verification failed.")]).await;

            let err = network.submit(&signed(5)).await.unwrap_err();
            match err {
                UploadError::BroadcastFailed { message, status } => {
                    assert_eq!(status, Some(400));
                    assert!(message.contains("Transaction verification failed."));
                }
                other => panic!("Expected BroadcastFailed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_submit_uploads_chunks() {
            let (network, requests) = serve(vec![(200, ""), (200, ""), (200, "")]).await;

            let transaction = signed(MAX_CHUNK_SIZE + 64 * 1024);
            network.submit(&transaction).await.unwrap();

            let requests = requests.lock().unwrap();
            let lines: Vec<&str> = requests.iter().map(|(line, _)| line.as_str()).collect();
            assert_eq!(
                lines,
                vec!["POST /tx HTTP/1.1", "POST /chunk HTTP/1.1", "POST /chunk HTTP/1.1"]
            );

            let header: WireTransaction = serde_json::from_str(&requests[0].1).unwrap();
            assert!(header.data.is_empty());
            let chunks: Vec<WireChunk> = requests[1..]
                .iter()
                .map(|(_, body)| serde_json::from_str(body).unwrap())
                .collect();
            assert_eq!(chunks[0].offset, (MAX_CHUNK_SIZE - 1).to_string());
            assert_eq!(chunks[1].offset, (MAX_CHUNK_SIZE + 64 * 1024 - 1).to_string());
            assert!(chunks.iter().all(|c| c.data_root == header.data_root));
        }

        #[tokio::test]
        async fn test_failed_chunk_fails_submit() {
            let (network, _) = serve(vec![(200, ""), (500, "")]).await;

            let err = network
                .submit(&signed(2 * MAX_CHUNK_SIZE))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                UploadError::BroadcastFailed {
                    status: Some(500),
                    ..
                }
            ));
        }
    }
}
