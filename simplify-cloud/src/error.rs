//! Unified service-layer error type
//!
//! `ServiceError` bridges store errors and the API-layer `AppError`, so
//! handlers propagate both with `?`.

use axum::response::IntoResponse;
use shared::error::AppError;
use simplify_ai::AiError;

use crate::store::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: store/infrastructure errors (logged, mapped to DatabaseError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<AiError> for ServiceError {
    fn from(e: AiError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::database("Database error")
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_db_error_is_opaque() {
        let err = ServiceError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert_eq!(app.message, "Database error");
    }

    #[test]
    fn test_ai_error_passes_through() {
        let app: AppError = ServiceError::from(AiError::Timeout).into();
        assert_eq!(app.code, ErrorCode::UpstreamTimeout);
    }
}
