//! Raw RSA sign/verify as the payment platform does it.
//!
//! Signing is not RSASSA-PKCS1-v1_5. There is no `DigestInfo`: the payload
//! inside the type 1 block is the ASCII text of the hex digest, and the
//! block is raised to the private exponent directly:
//!
//! ```text
//! EM = 0x00 || 0x01 || 0xFF * (k - 3 - len(payload)) || 0x00 || payload
//! S  = EM ^ d mod n            (k bytes, left zero padded, base64)
//! ```
//!
//! Verification raises the signature to the public exponent and compares the
//! minimal big-endian bytes of the result against the hex digest text. It
//! does *not* strip the type 1 padding first, so signatures produced by
//! [`sign`] do not pass [`VerifyScheme::Raw`]. That asymmetry is what the
//! platform integration does today and is kept as is; [`VerifyScheme::Pkcs1Type1`]
//! is available for deployments that confirm the platform pads its
//! callback signatures.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::BigUint;

use super::keys::{PrivateKey, PublicKey};
use super::pem::BASE64;
use crate::error::SignError;

/// Bytes of a type 1 block not available to the payload: `00 01`, at least
/// eight `FF` and the `00` separator.
pub const PADDING_OVERHEAD: usize = 11;

const MIN_PS_LEN: usize = 8;

/// How the recovered signature integer is compared against the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyScheme {
    /// Compare the minimal bytes of `s^e mod n` directly with the digest text.
    #[default]
    Raw,
    /// Strip a well-formed type 1 padding prefix before comparing.
    Pkcs1Type1,
}

impl fmt::Display for VerifyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerifyScheme::Raw => "raw",
            VerifyScheme::Pkcs1Type1 => "pkcs1-type1",
        })
    }
}

impl FromStr for VerifyScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(VerifyScheme::Raw),
            "pkcs1-type1" => Ok(VerifyScheme::Pkcs1Type1),
            other => Err(format!("unknown verify scheme {other:?} (expected raw or pkcs1-type1)")),
        }
    }
}

/// Builds the `k`-byte type 1 block around `payload`.
pub fn pad_type1(payload: &[u8], k: usize) -> Result<Vec<u8>, SignError> {
    let max = k.saturating_sub(PADDING_OVERHEAD);
    if k < PADDING_OVERHEAD || payload.len() > max {
        return Err(SignError::PayloadTooLarge {
            payload: payload.len(),
            max,
        });
    }

    let ps_len = k - 3 - payload.len();
    let mut block = Vec::with_capacity(k);
    block.extend_from_slice(&[0x00, 0x01]);
    block.resize(2 + ps_len, 0xFF);
    block.push(0x00);
    block.extend_from_slice(payload);
    Ok(block)
}

/// Signs the hex digest text with the raw private-key operation and returns
/// the `k`-byte signature base64 encoded.
pub fn sign(digest_hex: &str, key: &PrivateKey) -> Result<String, SignError> {
    let k = key.byte_len();
    let block = pad_type1(digest_hex.as_bytes(), k)?;

    let m = BigUint::from_bytes_be(&block);
    let c = m.modpow(key.exponent(), key.modulus());

    Ok(STANDARD.encode(left_pad(&c.to_bytes_be(), k)))
}

/// Applies the public-key operation to a base64 signature and returns the
/// minimal big-endian bytes of the result.
pub fn recover(signature_b64: &str, key: &PublicKey) -> Result<Vec<u8>, SignError> {
    let cleaned: String = signature_b64.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let sig = BASE64
        .decode(cleaned)
        .map_err(|e| SignError::SignatureFormat(e.to_string()))?;

    let c = BigUint::from_bytes_be(&sig);
    if &c >= key.modulus() {
        return Err(SignError::SignatureTooLarge);
    }

    let m = c.modpow(key.exponent(), key.modulus());
    Ok(minimal_bytes(&m))
}

/// Verifies with [`VerifyScheme::Raw`].
pub fn verify(digest_hex: &str, signature_b64: &str, key: &PublicKey) -> Result<(), SignError> {
    verify_with(VerifyScheme::Raw, digest_hex, signature_b64, key)
}

pub fn verify_with(
    scheme: VerifyScheme,
    digest_hex: &str,
    signature_b64: &str,
    key: &PublicKey,
) -> Result<(), SignError> {
    let recovered = recover(signature_b64, key)?;

    let payload = match scheme {
        VerifyScheme::Raw => recovered.as_slice(),
        VerifyScheme::Pkcs1Type1 => {
            strip_type1(&recovered, key.byte_len()).ok_or(SignError::SignatureMismatch)?
        }
    };

    if payload == digest_hex.as_bytes() {
        Ok(())
    } else {
        Err(SignError::SignatureMismatch)
    }
}

/// Returns the payload of a type 1 block given in minimal form (the leading
/// `0x00` already dropped by the integer conversion).
fn strip_type1(recovered: &[u8], k: usize) -> Option<&[u8]> {
    if recovered.len() + 1 != k {
        return None;
    }
    let rest = recovered.strip_prefix(&[0x01])?;
    let ps_len = rest.iter().take_while(|b| **b == 0xFF).count();
    if ps_len < MIN_PS_LEN {
        return None;
    }
    rest[ps_len..].strip_prefix(&[0x00])
}

fn minimal_bytes(n: &BigUint) -> Vec<u8> {
    if n.bits() == 0 {
        Vec::new()
    } else {
        n.to_bytes_be()
    }
}

fn left_pad(bytes: &[u8], k: usize) -> Vec<u8> {
    let mut out = vec![0u8; k.saturating_sub(bytes.len())];
    out.extend_from_slice(bytes);
    out
}
