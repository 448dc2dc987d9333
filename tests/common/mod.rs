// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use saldo::application::LedgerService;
use saldo::config::StoreConfig;
use saldo::domain::{ClientId, TransactionRequest};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = StoreConfig::new(db_path.to_string_lossy());
    let service = LedgerService::init(&config).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service with the given clients provisioned
pub async fn seeded_service(clients: &[(ClientId, i64)]) -> Result<(LedgerService, TempDir)> {
    let (mut service, temp_dir) = test_service().await?;
    service.seed_clients(clients).await?;
    Ok((service, temp_dir))
}

pub fn debit(amount: i64, description: &str) -> TransactionRequest {
    TransactionRequest::new(amount, "d", description)
}

pub fn credit(amount: i64, description: &str) -> TransactionRequest {
    TransactionRequest::new(amount, "c", description)
}
