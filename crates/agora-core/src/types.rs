use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Account identity in the Agora marketplace.
/// Format: `acct:<namespace>:<identifier>` (e.g. `acct:user:alice`,
/// `acct:token:usdc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create a new account id from a full URI string.
    pub fn new(uri: String) -> Result<Self, CoreError> {
        if !uri.starts_with("acct:") {
            return Err(CoreError::InvalidAccountId(format!(
                "account id must start with 'acct:', got: {}",
                uri
            )));
        }
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() < 3 || parts[1].is_empty() || parts[2].is_empty() {
            return Err(CoreError::InvalidAccountId(format!(
                "account id must have format 'acct:<namespace>:<identifier>', got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Create an account id from namespace and identifier components.
    pub fn from_parts(namespace: &str, identifier: &str) -> Self {
        Self(format!("acct:{}:{}", namespace, identifier))
    }

    /// Get the full account URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the namespace (user, token, platform).
    pub fn namespace(&self) -> Option<&str> {
        self.0.split(':').nth(1)
    }

    /// Extract the identifier.
    pub fn identifier(&self) -> Option<&str> {
        let parts: Vec<&str> = self.0.splitn(3, ':').collect();
        parts.get(2).copied()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The asset an escrow is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetRef {
    /// The chain's native coin.
    Native,
    /// A registered fungible-token contract, optionally scoped to a
    /// specific token id within that contract.
    Token {
        contract: AccountId,
        token_id: Option<String>,
    },
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Native => write!(f, "native"),
            AssetRef::Token {
                contract,
                token_id: Some(id),
            } => write!(f, "token:{}#{}", contract, id),
            AssetRef::Token {
                contract,
                token_id: None,
            } => write!(f, "token:{}", contract),
        }
    }
}

/// Value in atomic units (the smallest unit of the asset), as u128.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Value in atomic units.
    pub value: u128,
    /// The asset this amount is denominated in.
    pub asset: AssetRef,
}

impl Amount {
    /// Create a new amount.
    pub fn new(value: u128, asset: AssetRef) -> Self {
        Self { value, asset }
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.asset)
    }
}

/// Outcome of a finished marketplace transaction, reported to the
/// reputation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionOutcome {
    /// The buyer confirmed delivery; funds were released to the seller.
    Delivered,
    /// The transaction went through dispute resolution with the given
    /// share (in basis points) released to the seller.
    DisputeSettled { seller_share_bps: u16 },
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "Delivered"),
            Self::DisputeSettled { seller_share_bps } => {
                write!(f, "DisputeSettled({} bps)", seller_share_bps)
            }
        }
    }
}
