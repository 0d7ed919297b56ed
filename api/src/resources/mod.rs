pub mod auth;
pub mod free_time;
pub mod reservation;
pub mod table;

use crate::error::{Error, Result};
use reqwest::{blocking::Response as HttpResponse, StatusCode};
use serde::Deserialize;

/// Error body returned by the gateway. Depending on the service behind it the
/// text is either in `message` or in `detail`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SimpleApiError {
    message: Option<String>,
    detail: Option<String>,
}

impl SimpleApiError {
    fn into_error_kind(self, status_code: StatusCode) -> Error {
        Error::Api {
            status_code,
            message: self.message.or(self.detail).unwrap_or_default(),
        }
    }
}

/// Decode a gateway response, turning non-2xx statuses into `Error::Api`.
pub(crate) fn into_result<SuccessT>(http_response: HttpResponse) -> Result<SuccessT>
where
    for<'de> SuccessT: Deserialize<'de>,
{
    let status = http_response.status();
    if status.is_success() {
        return http_response
            .json::<SuccessT>()
            .map_err(Error::BadJsonResponse);
    }

    let body = http_response.text().unwrap_or_default();
    let api_error = serde_json::from_str::<SimpleApiError>(&body).unwrap_or_else(|_| {
        SimpleApiError {
            message: Some(body.trim().to_owned()).filter(|message| !message.is_empty()),
            detail: None,
        }
    });
    Err(api_error.into_error_kind(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_message() {
        let error: SimpleApiError =
            serde_json::from_str(r#"{"message": "table is taken", "detail": "ignored"}"#).unwrap();
        match error.into_error_kind(StatusCode::CONFLICT) {
            Error::Api {
                status_code,
                message,
            } => {
                assert_eq!(status_code, StatusCode::CONFLICT);
                assert_eq!(message, "table is taken");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let error: SimpleApiError = serde_json::from_str(r#"{"detail": "Not found."}"#).unwrap();
        assert!(matches!(
            error.into_error_kind(StatusCode::NOT_FOUND),
            Error::Api { message, .. } if message == "Not found."
        ));
    }
}
