use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use crate::errors::YouTubeError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    YouTubeError(YouTubeError),
    InvalidRequest(String),
    NotFound(String),
}

impl From<YouTubeError> for ApiError {
    fn from(err: YouTubeError) -> Self {
        ApiError::YouTubeError(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::YouTubeError(err) => {
                let (status, error_code) = match err {
                    YouTubeError::BadRequestData(_) => (StatusCode::BAD_REQUEST, "bad_request_data"),
                    YouTubeError::AccountConnection(_) => (StatusCode::UNAUTHORIZED, "account_connection"),
                    YouTubeError::ContinuationNotDefined => (StatusCode::BAD_REQUEST, "continuation_not_defined"),
                    YouTubeError::Network { status_code: Some(429), .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                    YouTubeError::Network { status_code: Some(404), .. } => (StatusCode::NOT_FOUND, "not_found"),
                    YouTubeError::Network { .. } => (StatusCode::BAD_GATEWAY, "network_error"),
                    YouTubeError::ResponseExtraction { .. } => (StatusCode::BAD_GATEWAY, "response_extraction"),
                    YouTubeError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unknown_error"),
                };
                (status, error_code, err.to_string())
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();
        (status, Json(json!({
            "error": error_code,
            "message": message
        }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ParameterKind, ValidationError};

    #[test]
    fn test_status_mapping() {
        let bad = ApiError::from(YouTubeError::BadRequestData(vec![ValidationError::new(
            ParameterKind::Query,
            "existence",
            "parameter is required but was not provided",
        )]));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let limited = ApiError::from(YouTubeError::Network {
            status_code: Some(429),
            message: "Too many requests".to_string(),
        });
        assert_eq!(limited.into_response().status(), StatusCode::TOO_MANY_REQUESTS);

        let offline = ApiError::from(YouTubeError::Network {
            status_code: None,
            message: "connection reset".to_string(),
        });
        assert_eq!(offline.into_response().status(), StatusCode::BAD_GATEWAY);

        let signed_out = ApiError::from(YouTubeError::AccountConnection("no cookies".to_string()));
        assert_eq!(signed_out.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_message_carries_details() {
        let error = ApiError::from(YouTubeError::ResponseExtraction {
            response_type: "SearchResponse",
            step: "locating ytInitialData in the results page".to_string(),
        });
        let (status, code, message) = error.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "response_extraction");
        assert!(message.contains("SearchResponse"));
    }
}
