use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `canonical`, as 64 lowercase hex characters.
///
/// The hex text itself (not the 32 raw digest bytes) is what gets signed.
pub fn digest_hex(canonical: &str) -> String {
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_digest() {
        assert_eq!(
            digest_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            digest_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn always_64_lowercase_hex_chars() {
        for input in ["", "a=1&c=2", "merchantNo=HZ123", "中文=值"] {
            let digest = digest_hex(input);
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }
}
