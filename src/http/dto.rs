//! Wire shapes of the HTTP API. Field names are part of the public contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::Statement;
use crate::domain::{BalanceSnapshot, Cents, Transaction, TransactionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "limite")]
    pub limit: Cents,
    #[serde(rename = "saldo")]
    pub balance: Cents,
}

impl From<BalanceSnapshot> for TransactionResponse {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            limit: snapshot.limit,
            balance: snapshot.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResponse {
    #[serde(rename = "saldo")]
    pub balance: StatementBalance,
    #[serde(rename = "ultimas_transacoes")]
    pub recent_transactions: Vec<StatementEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementBalance {
    pub total: Cents,
    #[serde(rename = "data_extrato")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "limite")]
    pub limit: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    #[serde(rename = "valor")]
    pub amount: Cents,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "realizada_em")]
    pub occurred_at: DateTime<Utc>,
}

impl From<Transaction> for StatementEntry {
    fn from(transaction: Transaction) -> Self {
        Self {
            amount: transaction.amount,
            kind: transaction.kind,
            description: transaction.description,
            occurred_at: transaction.occurred_at,
        }
    }
}

impl From<Statement> for StatementResponse {
    fn from(statement: Statement) -> Self {
        Self {
            balance: StatementBalance {
                total: statement.balance,
                generated_at: statement.generated_at,
                limit: statement.limit,
            },
            recent_transactions: statement
                .recent_transactions
                .into_iter()
                .map(StatementEntry::from)
                .collect(),
        }
    }
}
