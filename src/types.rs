//! Type-safe wrappers for Arweave identifiers and amounts

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of winston in one AR
pub const WINSTON_PER_AR: u128 = 1_000_000_000_000;

/// Decimal places of the AR display unit
pub const AR_DECIMALS: usize = 12;

/// Account identifier returned by a wallet provider
///
/// Addresses are opaque: an Arweave address, a Solana public key, a bech32
/// Cosmos address or a hex Ethereum account all fit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address and returns the inner String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Shortened form for display, e.g. `abc123...wxyz`
    pub fn abbreviated(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(AddressError::InvalidFormat(
                "Address cannot contain whitespace".into(),
            ));
        }
        Ok(Address(s.to_string()))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

/// Transaction identifier, the permanent content address of an upload
///
/// An Arweave transaction id is the unpadded base64url encoding of the
/// SHA-256 digest of the transaction signature, always 43 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    /// The length of an encoded transaction id
    pub const LENGTH: usize = 43;

    /// Derives the id assigned to a transaction carrying `signature`
    pub fn from_signature(signature: &[u8]) -> Self {
        let digest = Sha256::digest(signature);
        Self(URL_SAFE_NO_PAD.encode(digest))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for TxId {
    type Err = TxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LENGTH {
            return Err(TxIdError::InvalidLength(s.len()));
        }

        let mut digest = [0u8; 32];
        match URL_SAFE_NO_PAD.decode_slice(s, &mut digest) {
            Ok(32) => Ok(TxId(s.to_string())),
            _ => Err(TxIdError::InvalidEncoding(
                "Invalid base64url encoding".into(),
            )),
        }
    }
}

impl Display for TxId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TxId> for String {
    fn from(id: TxId) -> Self {
        id.0
    }
}

/// An amount in winston, the network's indivisible unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Winston(u128);

impl Winston {
    pub fn new(amount: u128) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> u128 {
        self.0
    }

    /// Converts to the AR display unit
    pub fn to_ar(self) -> ArAmount {
        let whole = self.0 / WINSTON_PER_AR;
        let frac = self.0 % WINSTON_PER_AR;
        if frac == 0 {
            return ArAmount(whole.to_string());
        }

        let frac = format!("{:0width$}", frac, width = AR_DECIMALS);
        ArAmount(format!("{}.{}", whole, frac.trim_end_matches('0')))
    }
}

impl FromStr for Winston {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidFormat(format!(
                "'{}' is not a winston amount",
                s
            )));
        }
        s.parse::<u128>()
            .map(Winston)
            .map_err(|e| AmountError::InvalidFormat(e.to_string()))
    }
}

impl Display for Winston {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Winston {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Winston {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A non-negative decimal amount of AR, e.g. `"0.000123"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArAmount(String);

impl ArAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ArAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Winston> for ArAmount {
    fn from(winston: Winston) -> Self {
        winston.to_ar()
    }
}

// Error types

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Empty => write!(f, "Address is empty"),
            AddressError::InvalidFormat(msg) => write!(f, "Invalid address format: {}", msg),
        }
    }
}

impl std::error::Error for AddressError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxIdError {
    InvalidLength(usize),
    InvalidEncoding(String),
}

impl fmt::Display for TxIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TxIdError::InvalidLength(len) => write!(
                f,
                "Invalid transaction id length: expected {}, got {}",
                TxId::LENGTH,
                len
            ),
            TxIdError::InvalidEncoding(msg) => write!(f, "Invalid transaction id: {}", msg),
        }
    }
}

impl std::error::Error for TxIdError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    InvalidFormat(String),
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::InvalidFormat(msg) => write!(f, "Invalid amount: {}", msg),
        }
    }
}

impl std::error::Error for AmountError {}
