use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use tracing::debug;

use crate::application::AppError;
use crate::domain::ClientId;

use super::SharedService;
use super::dto::{StatementResponse, TransactionResponse};

/// `POST /clientes/{id}/transacoes`
pub async fn submit_transaction(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TransactionResponse>, AppError> {
    let client_id = parse_client_id(&id)?;
    let snapshot = service.submit_json(client_id, &body).await?;
    debug!(client = client_id, balance = snapshot.balance, "transaction applied");
    Ok(Json(snapshot.into()))
}

/// `GET /clientes/{id}/extrato`
pub async fn statement(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<StatementResponse>, AppError> {
    let client_id = parse_client_id(&id)?;
    let statement = service.statement(client_id).await?;
    debug!(
        client = client_id,
        entries = statement.recent_transactions.len(),
        "statement read"
    );
    Ok(Json(statement.into()))
}

/// Ids that aren't integers can't name a client.
fn parse_client_id(raw: &str) -> Result<ClientId, AppError> {
    raw.parse().map_err(|_| AppError::ClientNotFound(raw.to_string()))
}
