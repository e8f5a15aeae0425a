mod canonical;
mod digest;
mod params;

pub use canonical::{SIGN_FIELD, encode};
pub use digest::digest_hex;
pub use params::{ParamValue, ParameterSet, format_float};

/// Canonical string and its hex digest, as fed to the RSA stage.
pub struct EncodedParams {
    pub canonical: String,
    pub digest: String,
}

/// Canonicalizes `params` and computes the digest to be signed or verified.
pub fn encode_and_digest(params: &ParameterSet) -> EncodedParams {
    let canonical = encode(params);
    let digest = digest_hex(&canonical);
    tracing::debug!(params = params.len(), canonical_len = canonical.len(), %digest, "encoded parameters");
    EncodedParams { canonical, digest }
}
