use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, ClientId};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Increases the balance
    #[serde(rename = "c")]
    Credit,
    /// Decreases the balance, bounded by the client's limit
    #[serde(rename = "d")]
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "c",
            TransactionKind::Debit => "d",
        }
    }

    /// Parse the wire code. Matching is exact: "C" or "credit" are rejected.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "c" => Some(TransactionKind::Credit),
            "d" => Some(TransactionKind::Debit),
            _ => None,
        }
    }

    /// Signed balance delta for a positive amount.
    pub fn signed(&self, amount: Cents) -> Cents {
        match self {
            TransactionKind::Credit => amount,
            TransactionKind::Debit => -amount,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated request to move a client's balance, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    /// Always positive
    pub amount: Cents,
    pub kind: TransactionKind,
    /// 1 to 10 code points
    pub description: String,
}

impl TransactionIntent {
    pub fn delta(&self) -> Cents {
        self.kind.signed(self.amount)
    }
}

/// A persisted transaction. Transactions are immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Insertion sequence, assigned by the store
    pub id: TransactionId,
    pub client_id: ClientId,
    pub amount: Cents,
    pub kind: TransactionKind,
    pub description: String,
    /// Server-assigned, non-decreasing per client in insertion order
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(TransactionKind::from_code("c"), Some(TransactionKind::Credit));
        assert_eq!(TransactionKind::from_code("d"), Some(TransactionKind::Debit));
        assert_eq!(TransactionKind::from_code("C"), None);
        assert_eq!(TransactionKind::from_code(""), None);
        assert_eq!(TransactionKind::from_code("credit"), None);
    }

    #[test]
    fn test_signed_delta() {
        let credit = TransactionIntent {
            amount: 250,
            kind: TransactionKind::Credit,
            description: "pix".into(),
        };
        let debit = TransactionIntent {
            kind: TransactionKind::Debit,
            ..credit.clone()
        };
        assert_eq!(credit.delta(), 250);
        assert_eq!(debit.delta(), -250);
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&TransactionKind::Debit).unwrap();
        assert_eq!(json, "\"d\"");
    }
}
