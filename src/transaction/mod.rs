//! Arweave data transactions
//!
//! This module defines unsigned and signed transactions, the chunking and
//! merkle proofs behind their `data_root`, and the pipeline that builds,
//! signs and broadcasts them.

pub mod merkle;
pub mod pipeline;
pub mod types;

pub use pipeline::{TransactionPipeline, UploadReceipt, CONTENT_TYPE_TAG};
pub use merkle::{TransactionChunks, MAX_CHUNK_SIZE};
pub use types::{SignedTransaction, Tag, Transaction, WireChunk, WireTransaction};
