use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use cryptoconditions_cli::resolve_encoding;
use cryptoconditions_codec::{ConditionType, Encoding};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let output = match cli.command {
        Commands::Encode {
            condition_type,
            fingerprint,
            cost,
            subtypes,
            encoding,
        } => {
            let encoding = resolve_encoding(encoding, config)?;
            tracing::debug!(%condition_type, cost, %encoding, "encoding condition");
            cryptoconditions_cli::encode(condition_type, &fingerprint, cost, subtypes, encoding)?
        }
        Commands::Decode { text, encoding } => {
            let encoding = resolve_encoding(encoding, config)?;
            cryptoconditions_cli::decode(&text, encoding)?
        }
        Commands::Convert { text, from, to } => {
            let from = resolve_encoding(from, config)?;
            tracing::info!(%from, %to, "converting condition");
            cryptoconditions_cli::convert(&text, from, to)?
        }
        Commands::Preimage { preimage, encoding } => {
            let encoding = resolve_encoding(encoding, config)?;
            cryptoconditions_cli::preimage(&preimage, encoding)?
        }
    };

    println!("{output}");
    Ok(())
}

#[derive(Parser)]
#[command(name = "ccodec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON codec config supplying the default encoding.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a condition given its fields.
    Encode {
        #[arg(long = "type")]
        condition_type: ConditionType,

        /// Fingerprint as hex.
        #[arg(long)]
        fingerprint: String,

        #[arg(long)]
        cost: u64,

        /// Comma-separated subtype names (compound types only).
        #[arg(long, value_delimiter = ',')]
        subtypes: Vec<ConditionType>,

        #[arg(short, long)]
        encoding: Option<Encoding>,
    },
    /// Print the fields of an encoded condition as JSON.
    Decode {
        text: String,

        #[arg(short, long)]
        encoding: Option<Encoding>,
    },
    /// Re-encode a condition with another encoding.
    Convert {
        text: String,

        #[arg(long)]
        from: Option<Encoding>,

        #[arg(long)]
        to: Encoding,
    },
    /// Encode the preimage-sha-256 condition of a UTF-8 preimage.
    Preimage {
        preimage: String,

        #[arg(short, long)]
        encoding: Option<Encoding>,
    },
}
