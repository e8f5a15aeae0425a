pub mod encoding;
pub mod error;
pub mod request;
pub mod server;
pub mod signing;

pub use encoding::{ParamValue, ParameterSet, digest_hex, encode};
pub use error::{CallbackError, ParamError, RequestError, SignError};
pub use request::HaozPayRequest;
pub use server::{AppState, router, run};
pub use signing::{
    HaozPaySigner, HaozPayVerifier, ParamSigner, ParamVerifier, PrivateKey, PublicKey, VerifyScheme,
    load_private_key, load_public_key,
};

/// Reads a key argument: `@path` loads the file, anything else is the key text.
pub fn read_key_arg(arg: &str) -> std::io::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path),
        None => Ok(arg.to_string()),
    }
}
