use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ethereum_abi_decoder::{
    config::{parse_input, AbiSource, ABI_FILE_ENV},
    Abi,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ethereum-abi",
    about = "command line for ethereum-abi",
    version
)]
struct Cli {
    /// ABI JSON string
    #[arg(long, global = true)]
    abi_json: Option<String>,

    /// ABI file path, falls back to $ABI_FILE
    #[arg(long, global = true)]
    abi_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a method call or event logs using the ABI
    #[command(visible_aliases = ["d", "de"])]
    Decode {
        /// Hex call data (with or without 0x) or a JSON list of logs
        data: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode { data } => {
            let env_file = env::var_os(ABI_FILE_ENV).map(PathBuf::from);
            let source = AbiSource::resolve(cli.abi_json, cli.abi_file, env_file)?;
            let abi = source.load()?.parse::<Abi>().context("failed to parse ABI")?;

            let input = parse_input(&data)?;
            let records = abi.decode(&input).context("abi: failed to decode")?;
            if records.is_empty() {
                return Err(anyhow!("abi: decode got an empty list"));
            }

            println!("abi decode successfully!");
            for record in records {
                println!("{}", record);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
