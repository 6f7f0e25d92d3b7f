//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::ProductNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::BranchRequired => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            // Timeouts surface as a generic server failure to the client; the
            // caller is expected to resubmit the whole operation.
            Self::InternalError | Self::DatabaseError | Self::TimeoutError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::ProductNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BranchRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::InsufficientStock.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MinStockExceedsStock.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::TimeoutError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
