//! rootsig CLI - offline tooling for signatures, chains and keys.

use clap::{Parser, Subcommand, ValueEnum};
use rootsig_core::KeyKind;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{convert, inspect, keygen, verify, verify_chain};

#[derive(Parser)]
#[command(name = "rootsig")]
#[command(about = "Signature conversion, inspection and verification for rootsig keys")]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "ROOTSIG_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Target form for `convert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SignatureForm {
    /// Fixed-width r || s
    Compact,
    /// ASN.1 DER sequence
    Der,
}

/// Key backend, as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Authenticator-backed key; three-part compact signatures
    Authenticator,
    /// Software key; base64 r || s signatures
    Software,
}

impl From<KindArg> for KeyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Authenticator => KeyKind::Authenticator,
            KindArg::Software => KeyKind::Software,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an ECDSA P-256 signature between DER and r || s
    Convert {
        /// Signature bytes (base64, or hex with --hex)
        input: String,
        /// Form to convert into
        #[arg(long, value_enum)]
        to: SignatureForm,
        /// Read and write hex instead of base64
        #[arg(long)]
        hex: bool,
    },
    /// Decode a compact or chained signature string
    Inspect {
        /// Signature string
        signature: String,
        /// Treat the input as a chained signature
        #[arg(long)]
        chained: bool,
    },
    /// Verify a signature against a public key
    Verify {
        /// Signature string
        signature: String,
        /// Base64 SPKI public key
        #[arg(long)]
        public_key: String,
        /// Key backend that produced the signature
        #[arg(long, value_enum, default_value = "authenticator")]
        kind: KindArg,
        /// Signed message (UTF-8)
        #[arg(long)]
        message: String,
        /// Exit with error code if the signature does not verify
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a chained signature against a root public key
    VerifyChain {
        /// Chained signature string
        signature: String,
        /// Base64 SPKI of the root key
        #[arg(long)]
        root_key: String,
        /// Key backend of the root key
        #[arg(long, value_enum, default_value = "authenticator")]
        kind: KindArg,
        /// Signed message (UTF-8)
        #[arg(long)]
        message: String,
        /// Exit with error code if the chain does not verify
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a throwaway key and optionally sign with it
    Keygen {
        /// User id recorded for the key
        #[arg(long, default_value = "cli")]
        user_id: String,
        /// Key backend to generate
        #[arg(long, value_enum, default_value = "software")]
        kind: KindArg,
        /// Sign this message with the new key
        #[arg(long)]
        sign: Option<String>,
        /// Delegate a temp key from the new key and chain-sign this message
        #[arg(long, conflicts_with = "sign")]
        chain: Option<String>,
    },
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Convert { input, to, hex } => convert::run(input, to, hex),
        Commands::Inspect { signature, chained } => inspect::run(signature, chained),
        Commands::Verify {
            signature,
            public_key,
            kind,
            message,
            strict,
            json,
        } => verify::run(signature, public_key, kind, message, strict, json),
        Commands::VerifyChain {
            signature,
            root_key,
            kind,
            message,
            strict,
            json,
        } => verify_chain::run(signature, root_key, kind, message, strict, json),
        Commands::Keygen {
            user_id,
            kind,
            sign,
            chain,
        } => keygen::run(user_id, kind, sign, chain).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
