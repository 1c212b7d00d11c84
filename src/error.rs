use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Budget must be greater than zero")]
    InvalidBudget,

    #[error("At least one category must be selected")]
    NoCategorySelected,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(f64),

    #[error("Item price must be positive, got {0}")]
    InvalidPrice(f64),

    #[error("Unknown menu item: {0}")]
    UnknownItem(u32),

    #[error("Unknown user: {0}")]
    UnknownUser(Uuid),

    #[error("No feasible selection: {0}")]
    Infeasible(String),

    #[error("Cannot train model: no ratings available")]
    InsufficientData,

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidBudget
            | AppError::NoCategorySelected
            | AppError::InvalidRating(_)
            | AppError::InvalidPrice(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UnknownItem(_) | AppError::UnknownUser(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Infeasible(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InsufficientData => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Solver(_) | AppError::Io(_) | AppError::Json(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_budget_is_bad_request() {
        let response = AppError::InvalidBudget.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_infeasible_is_unprocessable() {
        let response = AppError::Infeasible("budget too small".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_insufficient_data_is_service_unavailable() {
        let response = AppError::InsufficientData.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
