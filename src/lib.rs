pub mod error;
pub mod network;
pub mod price;
pub mod transaction;
pub mod types;
pub mod upload;
pub mod wallet;

pub use error::{ErrorInfo, ErrorKind, Result, UploadError};

pub use types::{Address, ArAmount, TxId, Winston, AR_DECIMALS, WINSTON_PER_AR};

#[cfg(feature = "http")]
pub use network::HttpNetwork;
pub use network::{LogLevel, NetworkConfig, Protocol, StorageNetwork};

pub use price::PriceOracle;

pub use transaction::{
    SignedTransaction, Tag, Transaction, TransactionPipeline, UploadReceipt, CONTENT_TYPE_TAG,
};

pub use upload::{FileRef, Phase, SessionState, UploadSession, UploadSessionController};

pub use wallet::{
    ArweaveWallet, ConnectedWallet, EthereumProvider, InjectedProviders, KeplrWallet, Permission,
    ProviderEnvironment, ProviderError, ProviderKind, ProviderResult, SolanaWallet, WalletAdapter,
};
