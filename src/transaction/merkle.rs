//! Data chunking and merkle proofs for format 2 transactions
//!
//! Data is split into chunks of at most 256 KiB, rebalancing the last two so
//! that neither falls under 32 KiB. Each chunk is a leaf of a binary merkle
//! tree whose root is the transaction's `data_root`; the path from the root
//! to a leaf is the proof submitted alongside that chunk.

use sha2::{Digest, Sha256};

pub const MAX_CHUNK_SIZE: usize = 256 * 1024;
pub const MIN_CHUNK_SIZE: usize = 32 * 1024;

const NOTE_SIZE: usize = 32;

type Hash = [u8; 32];

/// Byte range of one chunk and the hash of its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data_hash: Hash,
    pub min_byte_range: usize,
    pub max_byte_range: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.max_byte_range - self.min_byte_range
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merkle path of one chunk; `offset` is the chunk's last byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub offset: usize,
    pub proof: Vec<u8>,
}

/// Chunks, proofs and root of a transaction's data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionChunks {
    /// Empty when the transaction carries no data
    pub data_root: Vec<u8>,
    pub chunks: Vec<Chunk>,
    pub proofs: Vec<Proof>,
}

impl TransactionChunks {
    pub fn generate(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::default();
        }

        let mut chunks = chunk_data(data);
        let leaves = chunks.iter().map(leaf).collect();
        let Some(root) = build_layers(leaves) else {
            return Self::default();
        };

        let mut proofs = Vec::with_capacity(chunks.len());
        resolve_proofs(&root, Vec::new(), &mut proofs);

        // A size that is a multiple of MAX_CHUNK_SIZE leaves a trailing empty
        // chunk; it is part of the root but never uploaded.
        if chunks.last().is_some_and(Chunk::is_empty) {
            chunks.pop();
            proofs.pop();
        }

        Self {
            data_root: root.id().to_vec(),
            chunks,
            proofs,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

enum Node {
    Leaf {
        id: Hash,
        data_hash: Hash,
        max_byte_range: usize,
    },
    Branch {
        id: Hash,
        byte_range: usize,
        max_byte_range: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn id(&self) -> Hash {
        match self {
            Node::Leaf { id, .. } | Node::Branch { id, .. } => *id,
        }
    }

    fn max_byte_range(&self) -> usize {
        match self {
            Node::Leaf { max_byte_range, .. } | Node::Branch { max_byte_range, .. } => {
                *max_byte_range
            }
        }
    }
}

fn sha256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// 32-byte big-endian encoding of an offset
fn note(value: usize) -> [u8; NOTE_SIZE] {
    let mut buffer = [0u8; NOTE_SIZE];
    buffer[NOTE_SIZE - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    buffer
}

fn chunk_data(data: &[u8]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = data;
    let mut cursor = 0;

    while rest.len() >= MAX_CHUNK_SIZE {
        let mut size = MAX_CHUNK_SIZE;
        let next = rest.len() - MAX_CHUNK_SIZE;
        if next > 0 && next < MIN_CHUNK_SIZE {
            size = rest.len().div_ceil(2);
        }

        let (chunk, tail) = rest.split_at(size);
        chunks.push(Chunk {
            data_hash: sha256(&[chunk]),
            min_byte_range: cursor,
            max_byte_range: cursor + size,
        });
        cursor += size;
        rest = tail;
    }

    chunks.push(Chunk {
        data_hash: sha256(&[rest]),
        min_byte_range: cursor,
        max_byte_range: cursor + rest.len(),
    });
    chunks
}

fn leaf(chunk: &Chunk) -> Node {
    Node::Leaf {
        id: sha256(&[
            &sha256(&[&chunk.data_hash]),
            &sha256(&[&note(chunk.max_byte_range)]),
        ]),
        data_hash: chunk.data_hash,
        max_byte_range: chunk.max_byte_range,
    }
}

fn branch(left: Node, right: Node) -> Node {
    let byte_range = left.max_byte_range();
    Node::Branch {
        id: sha256(&[
            &sha256(&[&left.id()]),
            &sha256(&[&right.id()]),
            &sha256(&[&note(byte_range)]),
        ]),
        byte_range,
        max_byte_range: right.max_byte_range(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Pairs nodes level by level; an odd node out is promoted unchanged
fn build_layers(mut nodes: Vec<Node>) -> Option<Node> {
    while nodes.len() > 1 {
        let mut next = Vec::with_capacity(nodes.len().div_ceil(2));
        let mut iter = nodes.into_iter();
        while let Some(left) = iter.next() {
            match iter.next() {
                Some(right) => next.push(branch(left, right)),
                None => next.push(left),
            }
        }
        nodes = next;
    }
    nodes.pop()
}

fn resolve_proofs(node: &Node, path: Vec<u8>, proofs: &mut Vec<Proof>) {
    match node {
        Node::Leaf {
            data_hash,
            max_byte_range,
            ..
        } => {
            let mut proof = path;
            proof.extend_from_slice(data_hash);
            proof.extend_from_slice(&note(*max_byte_range));
            proofs.push(Proof {
                offset: max_byte_range.saturating_sub(1),
                proof,
            });
        }
        Node::Branch {
            byte_range,
            left,
            right,
            ..
        } => {
            let mut partial = path;
            partial.extend_from_slice(&left.id());
            partial.extend_from_slice(&right.id());
            partial.extend_from_slice(&note(*byte_range));
            resolve_proofs(left, partial.clone(), proofs);
            resolve_proofs(right, partial, proofs);
        }
    }
}
