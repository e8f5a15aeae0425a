use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};

/// Standard padded base64 that, like the platform's decoder, ignores
/// non-zero bits left over in the final symbol.
pub(crate) const BASE64: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

const PKCS1_PRIVATE_LABEL: &str = "RSA PRIVATE KEY";
const PKCS8_PRIVATE_LABEL: &str = "PRIVATE KEY";
const LINE_WIDTH: usize = 64;

/// One decoded PEM block.
pub(crate) struct PemBlock {
    pub label: String,
    pub der: Vec<u8>,
}

fn begin_marker(label: &str) -> String {
    format!("-----BEGIN {label}-----")
}

fn end_marker(label: &str) -> String {
    format!("-----END {label}-----")
}

/// Decodes the first PEM block in `text`.
///
/// Merchant consoles hand out keys with arbitrary line widths, so the body
/// is accepted at any wrapping; only the base64 content must be valid.
pub(crate) fn decode(text: &str) -> Option<PemBlock> {
    const BEGIN: &str = "-----BEGIN ";
    const DASHES: &str = "-----";

    let start = text.find(BEGIN)? + BEGIN.len();
    let label_len = text[start..].find(DASHES)?;
    let label = &text[start..start + label_len];
    let body_start = start + label_len + DASHES.len();

    let end = end_marker(label);
    let body_len = text[body_start..].find(&end)?;
    let body: String = text[body_start..body_start + body_len]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let der = BASE64.decode(body).ok()?;
    Some(PemBlock {
        label: label.to_string(),
        der,
    })
}

/// Brings a private key into PEM form.
///
/// Text that already carries a matching PKCS#1 or PKCS#8 BEGIN/END pair is
/// returned trimmed. Anything else is treated as a bare base64 body: stray
/// markers and whitespace are removed, the body is wrapped at 64 columns
/// and framed with PKCS#1 markers.
pub(crate) fn normalize_private_key(text: &str) -> String {
    let text = text.trim();

    let framed = [PKCS1_PRIVATE_LABEL, PKCS8_PRIVATE_LABEL]
        .iter()
        .any(|label| text.contains(&begin_marker(label)) && text.contains(&end_marker(label)));
    if framed {
        return text.to_string();
    }

    let mut body = text.to_string();
    for label in [PKCS1_PRIVATE_LABEL, PKCS8_PRIVATE_LABEL] {
        body = body.replace(&begin_marker(label), "");
        body = body.replace(&end_marker(label), "");
    }
    let body: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let mut pem = begin_marker(PKCS1_PRIVATE_LABEL);
    pem.push('\n');
    // Base64 is ASCII, so byte chunks are valid UTF-8.
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str(&end_marker(PKCS1_PRIVATE_LABEL));
    pem
}
