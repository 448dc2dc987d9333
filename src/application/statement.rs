use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, ClientId, Transaction};

/// Number of transactions included in a statement.
pub const STATEMENT_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub client_id: ClientId,
    pub balance: Cents,
    pub limit: Cents,
    /// When the statement was read, not stored data
    pub generated_at: DateTime<Utc>,
    /// Newest first
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub clients: Vec<ClientCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCheck {
    pub client_id: ClientId,
    pub balance: Cents,
    pub limit: Cents,
    pub transaction_total: Cents,
    pub transaction_count: i64,
}

impl ClientCheck {
    pub fn within_limit(&self) -> bool {
        self.balance >= -self.limit
    }

    /// Stored balance equals the sum of the client's transactions.
    pub fn balance_matches(&self) -> bool {
        self.balance == self.transaction_total
    }

    pub fn is_healthy(&self) -> bool {
        self.within_limit() && self.balance_matches()
    }
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.clients.iter().all(ClientCheck::is_healthy)
    }
}
