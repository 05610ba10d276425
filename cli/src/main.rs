//! `tally`: operator command line for the Tally currency ledger.

use clap::Parser;
use std::path::PathBuf;
use tally_cli::commands::{self, CurrencyRegisterArgs};
use tally_cli::EngineConfig;
use tally_currency::ProcessorRegistry;
use tally_types::Timestamp;
use tally_utils::LogFormat;

#[derive(Parser)]
#[command(name = "tally", version, about = "Tally currency ledger tools")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; flags and
    /// env vars override them.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Network id every signature is bound to.
    #[arg(long, env = "TALLY_NETWORK_ID")]
    network_id: Option<String>,

    /// Log filter, e.g. "info" or "warn,tally_currency=debug".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Key management.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Build and sign a currency registration.
    CurrencyRegister(CurrencyRegisterArgs),

    /// Add a signature to a JSON operation.
    SignOperation {
        /// Private key (hex).
        private_key: String,
        /// File holding the operation.
        file: PathBuf,
    },

    /// Replay a block of operations against a state file.
    Process {
        /// JSON state snapshot.
        #[arg(long)]
        state: PathBuf,
        /// JSON list of operations.
        #[arg(long)]
        ops: PathBuf,
        #[arg(long)]
        height: u64,
        /// Write the post-state snapshot here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum KeyAction {
    /// Generate a key pair.
    New {
        /// 32-byte hex seed for a deterministic key pair.
        #[arg(long)]
        seed: Option<String>,
    },
    /// Sign a base64 message.
    Sign {
        private_key: String,
        message: String,
    },
    /// Derive the address of a key set.
    Address {
        /// Keys as <pubkey-hex>:<weight>.
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long)]
        threshold: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(network_id) = cli.network_id {
        config.network_id = network_id;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    tally_utils::init_logging(config.log_format, &config.log_level)?;
    tracing::debug!(network_id = %config.network_id, "configuration loaded");

    let network = config.network();
    let output = match cli.command {
        Command::Key { action } => match action {
            KeyAction::New { seed } => commands::key_new(seed.as_deref())?,
            KeyAction::Sign {
                private_key,
                message,
            } => commands::key_sign(&private_key, &message)?,
            KeyAction::Address { keys, threshold } => commands::key_address(&keys, threshold)?,
        },
        Command::CurrencyRegister(args) => {
            let op = commands::currency_register(&args, &network, Timestamp::now())?;
            serde_json::to_string_pretty(&op)?
        }
        Command::SignOperation { private_key, file } => {
            let op = commands::sign_operation(&private_key, &file, &network, Timestamp::now())?;
            serde_json::to_string_pretty(&op)?
        }
        Command::Process {
            state,
            ops,
            height,
            out,
        } => {
            let registry = ProcessorRegistry::standard(network, config.suffrage()?);
            let result = commands::process(&registry, &state, &ops, height)?;
            if let Some(out) = out {
                commands::write_json(&out, &result.state)?;
                tracing::info!(path = %out.display(), "post-state written");
            }
            serde_json::to_string_pretty(&result)?
        }
    };

    println!("{output}");
    Ok(())
}
