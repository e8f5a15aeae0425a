use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use haozpay_sign::{AppState, HaozPayVerifier, ParamVerifier, VerifyScheme, read_key_arg, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(long, env = "HAOZPAY_HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "HAOZPAY_PORT", default_value = "3000")]
    port: u16,
    /// Platform public key: PEM, bare base64, or `@path` to a file holding either.
    #[clap(long, env = "HAOZPAY_PLATFORM_PUBLIC_KEY")]
    platform_public_key: String,
    #[clap(long, env = "HAOZPAY_VERIFY_SCHEME", default_value = "raw")]
    verify_scheme: VerifyScheme,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let public_key = read_key_arg(&args.platform_public_key).context("reading platform public key")?;
    let verifier = HaozPayVerifier::new(public_key).with_scheme(args.verify_scheme);
    verifier.check().context("platform public key is unusable")?;
    tracing::info!(scheme = %verifier.scheme(), "loaded platform public key");

    let verifier: Arc<dyn ParamVerifier> = Arc::new(verifier);
    run(args.host, args.port, AppState { verifier }).await
}
