use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};

/// Failures of the canonicalize / digest / raw RSA pipeline.
///
/// None of these are transient. `KeyFormat` and `PayloadTooLarge` mean the
/// signer is misconfigured; the three signature variants mean the presented
/// signature is not acceptable.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("invalid RSA key: {0}")]
    KeyFormat(String),
    #[error("payload of {payload} bytes exceeds the {max} byte padding budget of this key")]
    PayloadTooLarge { payload: usize, max: usize },
    #[error("malformed signature encoding: {0}")]
    SignatureFormat(String),
    #[error("signature integer is not smaller than the modulus")]
    SignatureTooLarge,
    #[error("signature does not match the parameter digest")]
    SignatureMismatch,
}

impl SignError {
    /// True when the signature itself was rejected, as opposed to the local
    /// key or key size being unusable.
    pub fn is_signature_invalid(&self) -> bool {
        matches!(
            self,
            SignError::SignatureFormat(_) | SignError::SignatureTooLarge | SignError::SignatureMismatch
        )
    }
}

/// Failures turning JSON text into a parameter set.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("parameters must be a JSON object of scalar values: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parameter {0} is not a scalar value")]
    Nested(String),
    #[error("failed to serialize business body: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error("failed to generate signature: {0}")]
    Sign(#[from] SignError),
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("Invalid callback request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error(transparent)]
    Signature(#[from] SignError),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for CallbackError {
    fn into_response(self) -> Response {
        match self {
            bad_request_error @ (CallbackError::BadRequest(_) | CallbackError::Params(_)) => {
                (StatusCode::BAD_REQUEST, bad_request_error.to_string()).into_response()
            }
            CallbackError::Signature(err) if err.is_signature_invalid() => {
                (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
            }
            CallbackError::Signature(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something wrong happened.",
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_returns_400() {
        let error = CallbackError::BadRequest("missing sign".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_params_return_400() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CallbackError::from(ParamError::Json(json_err));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn signature_mismatch_returns_401() {
        let error = CallbackError::from(SignError::SignatureMismatch);
        assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn signature_too_large_returns_401() {
        let error = CallbackError::from(SignError::SignatureTooLarge);
        assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn key_format_error_returns_500() {
        let error = CallbackError::from(SignError::KeyFormat("bad pem".into()));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn signature_kinds_are_distinguished_from_configuration_faults() {
        assert!(SignError::SignatureFormat("x".into()).is_signature_invalid());
        assert!(SignError::SignatureMismatch.is_signature_invalid());
        assert!(!SignError::KeyFormat("x".into()).is_signature_invalid());
        assert!(!SignError::PayloadTooLarge { payload: 64, max: 53 }.is_signature_invalid());
    }
}
