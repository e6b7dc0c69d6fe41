use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wallet provider variants the uploader can connect to
///
/// ArConnect is the network-native wallet and the only one able to sign
/// Arweave transactions; the others are chain wallets used for address
/// discovery only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// ArConnect, injected as `window.arweaveWallet`
    ArConnect,
    /// Phantom, injected as `window.solana`
    Phantom,
    /// Keplr, injected as `window.keplr`
    Keplr,
    /// MetaMask, injected as `window.ethereum`
    MetaMask,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::ArConnect
    }
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::ArConnect,
        ProviderKind::Phantom,
        ProviderKind::Keplr,
        ProviderKind::MetaMask,
    ];

    /// Name of the global the provider injects into the page
    pub fn global_name(self) -> &'static str {
        match self {
            ProviderKind::ArConnect => "arweaveWallet",
            ProviderKind::Phantom => "solana",
            ProviderKind::Keplr => "keplr",
            ProviderKind::MetaMask => "ethereum",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::ArConnect => "ArConnect",
            ProviderKind::Phantom => "Phantom",
            ProviderKind::Keplr => "Keplr",
            ProviderKind::MetaMask => "MetaMask",
        }
    }

    /// Whether wallets of this kind can sign Arweave transactions
    pub fn can_sign(self) -> bool {
        matches!(self, ProviderKind::ArConnect)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arconnect" => Ok(ProviderKind::ArConnect),
            "phantom" => Ok(ProviderKind::Phantom),
            "keplr" => Ok(ProviderKind::Keplr),
            "metamask" => Ok(ProviderKind::MetaMask),
            other => Err(format!("Unsupported wallet: {}", other)),
        }
    }
}

/// Permissions requested from ArConnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    AccessAddress,
    SignTransaction,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::AccessAddress => "ACCESS_ADDRESS",
            Permission::SignTransaction => "SIGN_TRANSACTION",
        }
    }
}

/// Permissions needed to discover the address and sign uploads
pub const UPLOAD_PERMISSIONS: [Permission; 2] =
    [Permission::AccessAddress, Permission::SignTransaction];
