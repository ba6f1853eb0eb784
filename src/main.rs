//! Ostia CLI: disassemble, decompile and decode EVM bytecode and call data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ostia::calldata::{classify_transaction, CallDecoder};
use ostia::decompiler::{decompile_bytecode, DecompilerConfig, OutputFormat};
use ostia::loader::Bytecode;
use ostia::registry::SignatureRegistry;
use ostia::solc::{SolcConfig, SolcRunner};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ostia",
    version,
    about = "EVM bytecode disassembler, heuristic decompiler and call-data decoder"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the instruction listing.
    Disasm {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decompile with an external tool if available, else print the heuristic listing.
    Decompile {
        #[command(flatten)]
        input: InputArgs,

        /// Cap on each external decompiler run, in seconds.
        #[arg(short = 't', long)]
        timeout: Option<u64>,

        /// Skip external decompilers.
        #[arg(long)]
        no_external: bool,

        #[arg(short = 'o', long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Decode transaction call data into named parameters (JSON).
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// ABI JSON file whose functions are added to the registry.
        #[arg(long)]
        abi: Option<PathBuf>,

        /// ABI JSON or Solidity source file to register.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Compile Solidity with this `solc` binary instead of Docker.
        #[arg(long)]
        solc: Option<String>,

        /// Recipient address; classifies the whole transaction.
        #[arg(long, conflicts_with = "create")]
        to: Option<String>,

        /// Treat the input as contract-creation code.
        #[arg(long)]
        create: bool,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Hex string (with or without 0x prefix).
    #[arg(value_name = "HEX")]
    hex: Option<String>,

    /// Read the hex from a file instead.
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Asm,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Asm => OutputFormat::Asm,
            Format::Json => OutputFormat::Json,
        }
    }
}

impl InputArgs {
    /// Argument, then file, then piped stdin.
    fn read(&self) -> Result<String> {
        let text = if let Some(path) = &self.file {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        } else if let Some(hex) = &self.hex {
            hex.clone()
        } else if std::io::stdin().is_terminal() {
            anyhow::bail!("no input provided, pass it as an argument, via -f, or pipe to stdin");
        } else {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        };
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("empty input");
        }
        Ok(text.to_string())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Disasm { input } => {
            let code: Bytecode = input.read()?.parse().context("failed to load bytecode")?;
            for line in code.disasm() {
                println!("{line}");
            }
        }
        Command::Decompile {
            input,
            timeout,
            no_external,
            format,
        } => {
            let config = DecompilerConfig {
                timeout_secs: timeout,
                external: !no_external,
                format: format.into(),
            };
            let result = decompile_bytecode(&input.read()?, &config)?;
            println!("{}", result.text);
        }
        Command::Decode {
            input,
            abi,
            source,
            solc,
            to,
            create,
        } => {
            let calldata = input.read()?;
            let registry = SignatureRegistry::global();
            if let Some(path) = abi {
                let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
                registry.register_abi_json(&json).context("failed to register ABI")?;
            }
            if let Some(path) = source {
                let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
                let mut config = SolcConfig::default();
                if let Some(program) = solc {
                    config.runner = SolcRunner::Native { program };
                }
                registry.register_source(&text, &config).context("failed to register contract source")?;
            }

            let decoder = CallDecoder::new(registry);
            let value = if create || to.is_some() {
                classify_transaction(&decoder, &calldata, to.as_deref())?.to_json()
            } else {
                decoder.decode(&calldata).context("failed to decode call data")?.to_json()
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
