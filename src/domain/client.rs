use serde::{Deserialize, Serialize};

use super::Cents;

pub type ClientId = i64;

/// Accounts provisioned by `saldo init` unless seeding is skipped.
pub const DEFAULT_CLIENTS: [(ClientId, Cents); 5] = [
    (1, 100_000),
    (2, 80_000),
    (3, 1_000_000),
    (4, 10_000_000),
    (5, 500_000),
];

/// A client account with a fixed credit limit.
/// The balance may go negative, but never below `-limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub limit: Cents,
    pub balance: Cents,
}

impl Client {
    pub fn new(id: ClientId, limit: Cents) -> Result<Self, ClientError> {
        if id <= 0 {
            return Err(ClientError::InvalidId(id));
        }
        if limit < 0 {
            return Err(ClientError::NegativeLimit(limit));
        }
        Ok(Self {
            id,
            limit,
            balance: 0,
        })
    }

    /// Lowest balance this client may reach.
    pub fn floor(&self) -> Cents {
        -self.limit
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            limit: self.limit,
            balance: self.balance,
        }
    }
}

/// Limit and balance as observed at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub limit: Cents,
    pub balance: Cents,
}

impl BalanceSnapshot {
    /// Returns true if the balance respects the credit limit.
    pub fn within_limit(&self) -> bool {
        self.balance >= -self.limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    InvalidId(ClientId),
    NegativeLimit(Cents),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::InvalidId(id) => write!(f, "client id must be positive, got {}", id),
            ClientError::NegativeLimit(limit) => {
                write!(f, "client limit must not be negative, got {}", limit)
            }
        }
    }
}

impl std::error::Error for ClientError {}
