use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    gateways::GatewayError,
    lifecycle::TransitionError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Conflict: {0}")]
    Transition(#[from] TransitionError),

    #[error("Payment provider error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::Transition(_) => StatusCode::CONFLICT,
            AppError::Gateway(GatewayError::UnknownProvider(_))
            | AppError::Gateway(GatewayError::InvalidConfig { .. }) => StatusCode::BAD_REQUEST,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::sea_orm_active_enums::OrderStatus;
    use crate::lifecycle::Operation;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(TransitionError::NotAllowed {
                operation: Operation::Cancel,
                from: OrderStatus::Completed,
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(GatewayError::UnknownProvider("X".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(GatewayError::MissingField("id")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn transition_conflict_keeps_the_named_condition() {
        let err = AppError::from(TransitionError::NotAllowed {
            operation: Operation::Cancel,
            from: OrderStatus::Completed,
        });
        assert_eq!(err.to_string(), "Conflict: cannot cancel an order that is COMPLETED");
    }
}
