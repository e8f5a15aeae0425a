use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::value::RawValue;

use crate::encoding::{ParameterSet, SIGN_FIELD};
use crate::error::{CallbackError, ParamError};
use crate::signing::ParamVerifier;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn ParamVerifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/callback", post(callback_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    tracing::info!(addr = %listener.local_addr()?, "callback server listening");

    axum::serve(listener, router(state))
        .await
        .context("serving callback endpoint")?;

    Ok(())
}

/// Splits a callback body into its parameters and the `sign` value.
///
/// Values are kept as the platform wrote them, so a number sent as `1.10`
/// is verified as `1.10`.
fn split_signature(body: &str) -> Result<(ParameterSet, String), CallbackError> {
    let mut raw: BTreeMap<String, &RawValue> = serde_json::from_str(body).map_err(ParamError::from)?;

    let sign = match raw.remove(SIGN_FIELD).map(|value| serde_json::from_str::<String>(value.get())) {
        Some(Ok(sign)) if !sign.trim().is_empty() => sign,
        _ => return Err(CallbackError::BadRequest("missing sign field".into())),
    };

    Ok((ParameterSet::from_raw(raw)?, sign))
}

async fn callback_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, CallbackError> {
    let (params, sign) = split_signature(&body).inspect_err(|err| {
        tracing::warn!(error = %err, "malformed callback");
    })?;

    if let Err(err) = state.verifier.verify(&params, &sign) {
        if err.is_signature_invalid() {
            tracing::warn!(error = %err, "rejected callback signature");
        } else {
            tracing::error!(error = %err, "callback verification misconfigured");
        }
        return Err(err.into());
    }

    tracing::info!(params = params.len(), "verified callback");
    Ok((StatusCode::OK, "Ok"))
}
