use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BackendKind, QueryError};

/// `None` means no timeout: the call blocks until the service answers.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client, QueryError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| QueryError::Client(err.to_string()))
}

pub(crate) fn post_json<B, R>(
    client: &Client,
    backend: BackendKind,
    url: &str,
    bearer: Option<&str>,
    body: &B,
) -> Result<R, QueryError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().map_err(|err| {
        if err.is_timeout() {
            QueryError::Timeout { backend }
        } else if err.is_connect() {
            QueryError::Connection {
                backend,
                url: url.to_string(),
            }
        } else {
            QueryError::Http {
                backend,
                detail: err.to_string(),
            }
        }
    })?;

    let status = response.status();
    let body = response.text().map_err(|err| QueryError::Response {
        backend,
        detail: err.to_string(),
    })?;
    decode_response(backend, status, &body)
}

/// Non-2xx becomes `Status` with the body kept for the message; a 2xx body must parse as `R`.
pub(crate) fn decode_response<R>(
    backend: BackendKind,
    status: StatusCode,
    body: &str,
) -> Result<R, QueryError>
where
    R: DeserializeOwned,
{
    if !status.is_success() {
        return Err(QueryError::Status {
            backend,
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|err| QueryError::Response {
        backend,
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        answer: String,
    }

    #[test]
    fn success_body_is_decoded() {
        let answer: Answer =
            decode_response(BackendKind::Qa, StatusCode::OK, r#"{"answer": "Asthma"}"#).unwrap();
        assert_eq!(answer.answer, "Asthma");
    }

    #[test]
    fn error_status_keeps_body() {
        let err = decode_response::<Answer>(
            BackendKind::Hosted,
            StatusCode::SERVICE_UNAVAILABLE,
            "model is loading",
        )
        .unwrap_err();

        assert!(matches!(
            &err,
            QueryError::Status { backend: BackendKind::Hosted, status: 503, body } if body == "model is loading"
        ));
        assert_eq!(err.to_string(), "hosted model API: HTTP 503: model is loading");
    }

    #[test]
    fn error_status_wins_over_json_body() {
        let err = decode_response::<Answer>(
            BackendKind::Local,
            StatusCode::NOT_FOUND,
            r#"{"error": "model 'medgemma' not found"}"#,
        )
        .unwrap_err();

        assert!(matches!(err, QueryError::Status { status: 404, .. }));
    }

    #[test]
    fn malformed_success_body_is_response_error() {
        let err = decode_response::<Answer>(BackendKind::Local, StatusCode::OK, "<html>proxy</html>")
            .unwrap_err();

        assert!(matches!(err, QueryError::Response { backend: BackendKind::Local, .. }));
        assert!(err.to_string().starts_with("local model: unreadable response: "));
    }

    #[test]
    fn wrong_shape_is_response_error() {
        let err =
            decode_response::<Answer>(BackendKind::Qa, StatusCode::OK, r#"{"score": 0.2}"#).unwrap_err();
        assert!(matches!(err, QueryError::Response { .. }));
    }
}
