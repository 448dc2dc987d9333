use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use crate::application::AppError;

impl AppError {
    /// Transport status for this outcome.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ClientNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::LimitExceeded { .. }
            | AppError::InvalidClient(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::ClientNotFound(id) => info!(client = %id, "client not found"),
            AppError::Validation(err) => warn!(%err, "rejected transaction"),
            AppError::LimitExceeded { client_id, limit } => {
                warn!(client = client_id, limit, "limit exceeded")
            }
            AppError::InvalidClient(err) => warn!(%err, "invalid client"),
            AppError::StorageUnavailable(err) => error!("storage failure: {err:#}"),
        }

        self.status_code().into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{ClientError, ValidationError};

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::ClientNotFound("999".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation(ValidationError::InvalidKind("\"x\"".into())).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::LimitExceeded {
                client_id: 1,
                limit: 1000
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidClient(ClientError::InvalidId(0)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::StorageUnavailable(anyhow::anyhow!("disk gone")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
