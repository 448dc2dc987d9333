use thiserror::Error;

use crate::domain::{Cents, ClientError, ClientId, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error("Debit would exceed the limit of client {client_id} (limit {limit})")]
    LimitExceeded { client_id: ClientId, limit: Cents },

    #[error("Invalid client: {0}")]
    InvalidClient(#[from] ClientError),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] anyhow::Error),
}
