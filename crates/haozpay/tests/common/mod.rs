#![allow(dead_code)]

use std::sync::OnceLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};
use sha2::{Digest, Sha256};

pub fn merchant_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let hash = Sha256::digest(b"haozpay-integration-key");
        let mut rng = ChaCha20Rng::from_seed(hash.into());
        RsaPrivateKey::new(&mut rng, 1024).expect("generating RSA key")
    })
}

pub fn private_pem() -> String {
    merchant_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("encoding PKCS#1 PEM")
        .to_string()
}

pub fn public_pem() -> String {
    merchant_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encoding public key PEM")
}

pub fn pem_body(pem: &str) -> String {
    pem.lines()
        .filter(|line| !line.starts_with("-----"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Signature over the bare hex digest with no padding, as the platform's
/// callback signer produces it.
pub fn platform_sign(digest_hex: &str) -> String {
    let key = merchant_key();
    let m = BigUint::from_bytes_be(digest_hex.as_bytes());
    let c = m.modpow(key.d(), key.n()).to_bytes_be();
    let mut sig = vec![0u8; key.size() - c.len()];
    sig.extend_from_slice(&c);
    STANDARD.encode(sig)
}
