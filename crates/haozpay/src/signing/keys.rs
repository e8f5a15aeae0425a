use std::fmt;

use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::spki::SubjectPublicKeyInfoRef;
use rsa::pkcs8::{DecodePrivateKey, ObjectIdentifier, PrivateKeyInfo};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use super::pem;
use crate::error::SignError;

/// `rsaEncryption` from PKCS#1.
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// RSA private key reduced to what the raw sign engine needs: modulus and
/// private exponent.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    modulus: BigUint,
    exponent: BigUint,
}

/// RSA public key: modulus and public exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    modulus: BigUint,
    exponent: BigUint,
}

fn byte_len(modulus: &BigUint) -> usize {
    modulus.bits().div_ceil(8)
}

impl PrivateKey {
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    /// Length `k` of the modulus in bytes; every signature is exactly this long.
    pub fn byte_len(&self) -> usize {
        byte_len(&self.modulus)
    }
}

impl PublicKey {
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    pub fn byte_len(&self) -> usize {
        byte_len(&self.modulus)
    }
}

// Keeps the private exponent out of logs.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.modulus.bits())
            .finish_non_exhaustive()
    }
}

impl From<&RsaPrivateKey> for PrivateKey {
    fn from(key: &RsaPrivateKey) -> Self {
        Self {
            modulus: key.n().clone(),
            exponent: key.d().clone(),
        }
    }
}

impl From<&RsaPublicKey> for PublicKey {
    fn from(key: &RsaPublicKey) -> Self {
        Self {
            modulus: key.n().clone(),
            exponent: key.e().clone(),
        }
    }
}

/// Loads a merchant private key from PKCS#1 PEM, PKCS#8 PEM or a bare
/// base64 body without markers.
pub fn load_private_key(text: &str) -> Result<PrivateKey, SignError> {
    let normalized = pem::normalize_private_key(text);
    let block = pem::decode(&normalized)
        .ok_or_else(|| SignError::KeyFormat("private key PEM decoding failed".into()))?;

    // The block label is not trusted: bare PKCS#8 bodies arrive framed as PKCS#1.
    if let Ok(key) = RsaPrivateKey::from_pkcs1_der(&block.der) {
        return Ok(PrivateKey::from(&key));
    }

    let info = PrivateKeyInfo::try_from(block.der.as_slice())
        .map_err(|e| SignError::KeyFormat(format!("unsupported private key format: {e}")))?;
    if info.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(SignError::KeyFormat(format!(
            "not an RSA private key (algorithm {})",
            info.algorithm.oid
        )));
    }

    let key = RsaPrivateKey::from_pkcs8_der(&block.der)
        .map_err(|e| SignError::KeyFormat(format!("invalid PKCS#8 RSA private key: {e}")))?;
    tracing::trace!(label = %block.label, "loaded PKCS#8 private key");
    Ok(PrivateKey::from(&key))
}

/// Loads a platform public key from SubjectPublicKeyInfo PEM or its bare
/// base64 body.
pub fn load_public_key(text: &str) -> Result<PublicKey, SignError> {
    let der = match pem::decode(text) {
        Some(block) => block.der,
        None => {
            let body: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            pem::BASE64.decode(body).map_err(|_| {
                SignError::KeyFormat("public key is neither valid PEM nor base64".into())
            })?
        }
    };

    let spki = SubjectPublicKeyInfoRef::try_from(der.as_slice())
        .map_err(|e| SignError::KeyFormat(format!("malformed public key: {e}")))?;
    if spki.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(SignError::KeyFormat(format!(
            "not an RSA public key (algorithm {})",
            spki.algorithm.oid
        )));
    }

    // Decoded straight from the PKCS#1 body: `RsaPublicKey` caps the modulus
    // at 4096 bits and the platform key size is not bounded.
    let key = rsa::pkcs1::RsaPublicKey::try_from(spki.subject_public_key.raw_bytes())
        .map_err(|e| SignError::KeyFormat(format!("invalid RSA public key: {e}")))?;
    let modulus = BigUint::from_bytes_be(key.modulus.as_bytes());
    let exponent = BigUint::from_bytes_be(key.public_exponent.as_bytes());
    if modulus.bits() == 0 || exponent.bits() == 0 {
        return Err(SignError::KeyFormat("RSA public key has a zero modulus or exponent".into()));
    }
    Ok(PublicKey { modulus, exponent })
}
