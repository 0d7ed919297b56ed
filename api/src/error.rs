use reqwest::StatusCode;
use std::fmt::{self, Display};
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("API request failed with {}: {}", status_code, message)]
    Api {
        status_code: StatusCode,
        message: String,
    },

    #[error("Invalid endpoint `{}`", endpoint)]
    BadEndpoint { endpoint: Url },

    #[error("Bad token: {}", token)]
    BadToken { token: String },

    #[error("Expected a numeric table id, got: {}", identifier)]
    BadTableIdentifier { identifier: String },

    #[error("Expected a numeric restaurant id, got: {}", identifier)]
    BadRestaurantIdentifier { identifier: String },

    #[error("Invalid timestamp `{}`", value)]
    InvalidTimestamp { value: String },

    #[error("Invalid date `{}`, expected YYYY-MM-DD", value)]
    InvalidDateFormat { value: String },

    #[error("Invalid time `{}`, expected HH:MM", value)]
    InvalidTimeFormat { value: String },

    #[error("Not logged in, no access token is available")]
    NotLoggedIn,

    #[error("Refreshing the access token failed with {}", status_code)]
    TokenRefreshFailed { status_code: StatusCode },

    #[error("Saved refresh cookie is not a valid header value")]
    BadRefreshCookie,

    #[error("Requested time {} does not end after it starts", requested)]
    InvertedWindow { requested: String },

    #[error("Requested time {} does not fit in any free time of table {}", requested, table_id)]
    SlotUnavailable { table_id: u64, requested: String },

    #[error("Could not parse JSON response.")]
    BadJsonResponse(#[source] reqwest::Error),

    #[error("Failed to initialise the HTTP client")]
    BuildHttpClient(#[source] reqwest::Error),

    #[error("HTTP request error: {}", message)]
    ReqwestError {
        message: String,
        source: reqwest::Error,
    },

    #[error("Token store error: {}", message)]
    TokenStore {
        message: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// The fixed set of user facing failure messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    Unauthorized,
    NotFound,
    ServerError,
    Unexpected,
}

impl ErrorCategory {
    pub fn from_status(status_code: StatusCode) -> Self {
        match status_code {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCategory::BadRequest,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorCategory::Unauthorized,
            StatusCode::NOT_FOUND => ErrorCategory::NotFound,
            status_code if status_code.is_server_error() => ErrorCategory::ServerError,
            _ => ErrorCategory::Unexpected,
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            ErrorCategory::BadRequest => "The request was rejected as invalid.",
            ErrorCategory::Unauthorized => "You are not authorised, please log in again.",
            ErrorCategory::NotFound => "The requested resource was not found.",
            ErrorCategory::ServerError => "The reservation service failed, try again later.",
            ErrorCategory::Unexpected => "An unexpected error occurred.",
        })
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api { status_code, .. } => ErrorCategory::from_status(*status_code),
            Error::NotLoggedIn
            | Error::TokenRefreshFailed { .. }
            | Error::BadToken { .. }
            | Error::BadRefreshCookie => ErrorCategory::Unauthorized,
            Error::BadTableIdentifier { .. }
            | Error::BadRestaurantIdentifier { .. }
            | Error::InvalidDateFormat { .. }
            | Error::InvalidTimeFormat { .. }
            | Error::InvertedWindow { .. }
            | Error::SlotUnavailable { .. } => ErrorCategory::BadRequest,
            Error::InvalidTimestamp { .. }
            | Error::BadEndpoint { .. }
            | Error::BadJsonResponse(_)
            | Error::BuildHttpClient(_)
            | Error::ReqwestError { .. }
            | Error::TokenStore { .. } => ErrorCategory::Unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_status() {
        assert_eq!(
            ErrorCategory::from_status(StatusCode::BAD_REQUEST),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            ErrorCategory::from_status(StatusCode::UNAUTHORIZED),
            ErrorCategory::Unauthorized
        );
        assert_eq!(
            ErrorCategory::from_status(StatusCode::NOT_FOUND),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ErrorCategory::from_status(StatusCode::BAD_GATEWAY),
            ErrorCategory::ServerError
        );
        assert_eq!(
            ErrorCategory::from_status(StatusCode::IM_A_TEAPOT),
            ErrorCategory::Unexpected
        );
    }

    #[test]
    fn test_error_category() {
        let error = Error::Api {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_owned(),
        };
        assert_eq!(error.category(), ErrorCategory::ServerError);
        assert_eq!(Error::NotLoggedIn.category(), ErrorCategory::Unauthorized);
        assert_eq!(
            Error::InvalidDateFormat {
                value: "2024/01/01".to_owned()
            }
            .category(),
            ErrorCategory::BadRequest
        );
        assert_eq!(
            Error::InvertedWindow {
                requested: "2024-06-01 12:00 - 2024-06-01 11:00".to_owned()
            }
            .category(),
            ErrorCategory::BadRequest
        );
    }
}
