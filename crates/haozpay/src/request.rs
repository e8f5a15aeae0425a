use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::encoding::{ParamValue, ParameterSet};
use crate::error::{ParamError, RequestError};
use crate::signing::ParamSigner;

pub const MERCHANT_NO_FIELD: &str = "merchantNo";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Envelope every outbound platform call is wrapped in.
///
/// The business payload travels as JSON text in `bizBody`; its top-level
/// fields are signed together with `merchantNo` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaozPayRequest {
    pub merchant_no: String,
    pub timestamp: i64,
    pub biz_body: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
}

impl HaozPayRequest {
    /// Serializes `biz` into the envelope and stamps the current time.
    pub fn new<T: Serialize>(merchant_no: impl Into<String>, biz: &T) -> Result<Self, ParamError> {
        let biz_body = serde_json::to_string(biz).map_err(ParamError::Serialize)?;
        Ok(Self::with_timestamp(merchant_no, current_timestamp_millis(), biz_body))
    }

    pub fn with_timestamp(merchant_no: impl Into<String>, timestamp: i64, biz_body: impl Into<String>) -> Self {
        Self {
            merchant_no: merchant_no.into(),
            timestamp,
            biz_body: biz_body.into(),
            sign: String::new(),
        }
    }

    /// The parameters that the signature covers: the top-level `bizBody`
    /// fields plus `merchantNo` and `timestamp`, which win over same-named
    /// business fields.
    pub fn signing_params(&self) -> Result<ParameterSet, ParamError> {
        let mut params = if self.biz_body.is_empty() {
            ParameterSet::new()
        } else {
            ParameterSet::from_json(&self.biz_body)?
        };
        params.insert(MERCHANT_NO_FIELD, self.merchant_no.as_str());
        params.insert(TIMESTAMP_FIELD, ParamValue::Integer(self.timestamp));
        Ok(params)
    }

    /// Computes and stores the `sign` field.
    pub fn sign_with(&mut self, signer: &dyn ParamSigner) -> Result<(), RequestError> {
        let params = self.signing_params()?;
        self.sign = signer.sign(&params)?;
        tracing::debug!(merchant_no = %self.merchant_no, timestamp = self.timestamp, "signed request");
        Ok(())
    }
}

pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
