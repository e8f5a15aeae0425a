use std::fmt;

use super::keys::{load_private_key, load_public_key};
use super::rsa::{self, VerifyScheme};
use crate::encoding::{ParameterSet, encode_and_digest};
use crate::error::SignError;

/// Trait for signing outbound request parameters.
///
/// Implementations are sync: signing is CPU-bound.
pub trait ParamSigner: Send + Sync {
    /// Sign the canonical form of `params`. Returns the base64 signature.
    fn sign(&self, params: &ParameterSet) -> Result<String, SignError>;
}

/// Trait for checking the signature on inbound callback parameters.
pub trait ParamVerifier: Send + Sync {
    /// `params` must not include the signature; a `sign` entry is ignored.
    fn verify(&self, params: &ParameterSet, signature: &str) -> Result<(), SignError>;
}

/// Canonicalizes, digests and signs `params` with a private key given as text.
pub fn sign_params(params: &ParameterSet, private_key: &str) -> Result<String, SignError> {
    let encoded = encode_and_digest(params);
    let key = load_private_key(private_key)?;
    rsa::sign(&encoded.digest, &key)
}

/// Canonicalizes and digests `params`, then checks `signature` against a
/// public key given as text.
pub fn verify_params(
    params: &ParameterSet,
    signature: &str,
    public_key: &str,
    scheme: VerifyScheme,
) -> Result<(), SignError> {
    let encoded = encode_and_digest(params);
    let key = load_public_key(public_key)?;
    rsa::verify_with(scheme, &encoded.digest, signature, &key)
}

/// Merchant-side signer.
///
/// Holds the configured key text only; the key is parsed on every call and
/// dropped afterwards.
#[derive(Clone)]
pub struct HaozPaySigner {
    private_key: String,
}

impl HaozPaySigner {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
        }
    }

    /// Parses the configured key once so misconfiguration surfaces at startup.
    pub fn check(&self) -> Result<(), SignError> {
        load_private_key(&self.private_key).map(|_| ())
    }
}

impl fmt::Debug for HaozPaySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HaozPaySigner").finish_non_exhaustive()
    }
}

impl ParamSigner for HaozPaySigner {
    fn sign(&self, params: &ParameterSet) -> Result<String, SignError> {
        sign_params(params, &self.private_key)
    }
}

/// Verifier for platform callbacks, holding the platform public key text.
#[derive(Debug, Clone)]
pub struct HaozPayVerifier {
    public_key: String,
    scheme: VerifyScheme,
}

impl HaozPayVerifier {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            scheme: VerifyScheme::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: VerifyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn scheme(&self) -> VerifyScheme {
        self.scheme
    }

    pub fn check(&self) -> Result<(), SignError> {
        load_public_key(&self.public_key).map(|_| ())
    }
}

impl ParamVerifier for HaozPayVerifier {
    fn verify(&self, params: &ParameterSet, signature: &str) -> Result<(), SignError> {
        verify_params(params, signature, &self.public_key, self.scheme)
    }
}
