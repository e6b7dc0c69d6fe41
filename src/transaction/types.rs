use crate::transaction::merkle::TransactionChunks;
use crate::types::{TxId, Winston};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Transaction format used for data uploads
pub const TRANSACTION_FORMAT: u8 = 2;

/// Transactions with more chunks than this send their data through `POST /chunk`
pub const MAX_CHUNKS_IN_BODY: usize = 1;

/// A name/value metadata tag attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An unsigned data transaction
///
/// There is no way to submit a `Transaction` directly: the network API only
/// accepts a [`SignedTransaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    last_tx: String,
    reward: Winston,
    data: Bytes,
    chunks: TransactionChunks,
    tags: Vec<Tag>,
}

impl Transaction {
    /// Chunks `data` and computes its `data_root`, which signers sign over
    pub fn new(data: Bytes, last_tx: impl Into<String>, reward: Winston) -> Self {
        let chunks = TransactionChunks::generate(&data);
        Self {
            last_tx: last_tx.into(),
            reward,
            data,
            chunks,
            tags: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.push(Tag::new(name, value));
    }

    pub fn format(&self) -> u8 {
        TRANSACTION_FORMAT
    }

    pub fn last_tx(&self) -> &str {
        &self.last_tx
    }

    pub fn reward(&self) -> Winston {
        self.reward
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn data_size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn chunks(&self) -> &TransactionChunks {
        &self.chunks
    }

    /// Base64url merkle root of the data; empty without data
    pub fn data_root(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.chunks.data_root)
    }

    /// Whether the data travels inside the `POST /tx` body
    pub fn uploads_in_body(&self) -> bool {
        self.chunks.len() <= MAX_CHUNKS_IN_BODY
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Value of the first tag named `name`
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.value.as_str())
    }
}

/// A transaction signed by a wallet, ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    id: TxId,
    owner: String,
    signature: Vec<u8>,
    transaction: Transaction,
}

impl SignedTransaction {
    /// Wraps `transaction` with the signer's public key (`owner`, base64url
    /// modulus) and signature; the id is derived from the signature.
    pub fn new(transaction: Transaction, owner: impl Into<String>, signature: Vec<u8>) -> Self {
        Self {
            id: TxId::from_signature(&signature),
            owner: owner.into(),
            signature,
            transaction,
        }
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Number of HTTP requests needed to submit this transaction
    pub fn request_count(&self) -> u32 {
        if self.transaction.uploads_in_body() {
            1
        } else {
            1 + self.transaction.chunks.len() as u32
        }
    }

    /// JSON body accepted by `POST /tx`
    ///
    /// `data` is left empty when the data goes through [`Self::chunk_uploads`].
    pub fn to_wire(&self) -> WireTransaction {
        let tx = &self.transaction;
        let data = if tx.uploads_in_body() {
            URL_SAFE_NO_PAD.encode(&tx.data)
        } else {
            String::new()
        };
        WireTransaction {
            format: tx.format(),
            id: self.id.to_string(),
            last_tx: tx.last_tx.clone(),
            owner: self.owner.clone(),
            tags: tx
                .tags
                .iter()
                .map(|tag| Tag {
                    name: URL_SAFE_NO_PAD.encode(tag.name.as_bytes()),
                    value: URL_SAFE_NO_PAD.encode(tag.value.as_bytes()),
                })
                .collect(),
            target: String::new(),
            quantity: "0".to_string(),
            data,
            data_size: tx.data_size().to_string(),
            data_root: tx.data_root(),
            reward: tx.reward.to_string(),
            signature: URL_SAFE_NO_PAD.encode(&self.signature),
        }
    }

    /// Bodies for `POST /chunk`, in order; empty when the data is sent inline
    pub fn chunk_uploads(&self) -> impl Iterator<Item = WireChunk> + '_ {
        let tx = &self.transaction;
        let in_body = tx.uploads_in_body();
        let data_root = tx.data_root();
        let data_size = tx.data_size().to_string();

        tx.chunks
            .chunks
            .iter()
            .zip(&tx.chunks.proofs)
            .filter(move |_| !in_body)
            .map(move |(chunk, proof)| WireChunk {
                data_root: data_root.clone(),
                data_size: data_size.clone(),
                data_path: URL_SAFE_NO_PAD.encode(&proof.proof),
                offset: proof.offset.to_string(),
                chunk: URL_SAFE_NO_PAD
                    .encode(&tx.data[chunk.min_byte_range..chunk.max_byte_range]),
            })
    }
}

/// Wire representation of a signed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub format: u8,
    pub id: String,
    pub last_tx: String,
    pub owner: String,
    pub tags: Vec<Tag>,
    pub target: String,
    pub quantity: String,
    pub data: String,
    pub data_size: String,
    pub data_root: String,
    pub reward: String,
    pub signature: String,
}

/// Wire representation of one chunk with its merkle path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChunk {
    pub data_root: String,
    pub data_size: String,
    pub data_path: String,
    pub offset: String,
    pub chunk: String,
}
