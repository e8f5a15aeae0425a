use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use haozpay_sign::encoding::encode_and_digest;
use haozpay_sign::request::current_timestamp_millis;
use haozpay_sign::{
    HaozPayRequest, HaozPaySigner, HaozPayVerifier, ParamSigner, ParamVerifier, ParameterSet, VerifyScheme,
    read_key_arg,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "haozpay", about = "Sign and verify HaozPay platform parameters")]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the canonical string and SHA-256 hex digest of a parameter object.
    Digest {
        #[clap(long)]
        params: String,
    },
    /// Sign a parameter object and print the base64 signature.
    Sign {
        #[clap(long)]
        params: String,
        #[clap(long, env = "HAOZPAY_PRIVATE_KEY")]
        private_key: String,
    },
    /// Wrap a business body in a signed request envelope and print it as JSON.
    SignRequest {
        #[clap(long, env = "HAOZPAY_MERCHANT_NO")]
        merchant_no: String,
        #[clap(long)]
        biz_body: String,
        /// Epoch milliseconds; defaults to now.
        #[clap(long)]
        timestamp: Option<i64>,
        #[clap(long, env = "HAOZPAY_PRIVATE_KEY")]
        private_key: String,
    },
    /// Check a signature over a parameter object.
    Verify {
        #[clap(long)]
        params: String,
        #[clap(long)]
        signature: String,
        #[clap(long, env = "HAOZPAY_PLATFORM_PUBLIC_KEY")]
        public_key: String,
        #[clap(long, env = "HAOZPAY_VERIFY_SCHEME", default_value = "raw")]
        scheme: VerifyScheme,
    },
}

fn parse_params(json: &str) -> Result<ParameterSet> {
    ParameterSet::from_json(json).context("parsing --params")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Digest { params } => {
            let encoded = encode_and_digest(&parse_params(&params)?);
            println!("{}", encoded.canonical);
            println!("{}", encoded.digest);
        }
        Command::Sign { params, private_key } => {
            let signer = HaozPaySigner::new(read_key_arg(&private_key).context("reading private key")?);
            let signature = signer.sign(&parse_params(&params)?).context("signing parameters")?;
            println!("{signature}");
        }
        Command::SignRequest {
            merchant_no,
            biz_body,
            timestamp,
            private_key,
        } => {
            let signer = HaozPaySigner::new(read_key_arg(&private_key).context("reading private key")?);
            let timestamp = timestamp.unwrap_or_else(current_timestamp_millis);
            let mut request = HaozPayRequest::with_timestamp(merchant_no, timestamp, biz_body);
            request.sign_with(&signer).context("signing request")?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Verify {
            params,
            signature,
            public_key,
            scheme,
        } => {
            let verifier =
                HaozPayVerifier::new(read_key_arg(&public_key).context("reading public key")?).with_scheme(scheme);
            verifier
                .verify(&parse_params(&params)?, &signature)
                .context("signature verification failed")?;
            println!("OK");
        }
    }

    Ok(())
}
