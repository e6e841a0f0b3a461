//! Siphon CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use siphon_config::load_from_file;
use siphon_core::Sink;
use siphon_modules::{EncodingSet, ModuleManager, ModuleRegistry};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Parser)]
#[command(name = "siphon")]
#[command(about = "Siphon content encodings", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "Siphonfile")]
        config: PathBuf,
    },

    /// List registered modules
    Modules,

    /// Compress input through a configured encoding
    Compress {
        /// Path to configuration file
        #[arg(short, long, default_value = "Siphonfile")]
        config: PathBuf,

        /// Accept-Encoding token of the encoding to use
        #[arg(short, long, default_value = "br")]
        encoding: String,

        /// Input file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Validate { config } => {
            tracing::info!("Validating configuration: {}", config.display());

            match load_encodings(&config) {
                Ok(set) => {
                    tracing::info!("✓ Configuration is valid");
                    for loaded in set.iter() {
                        tracing::info!(
                            "  {} ({})",
                            loaded.encoding.accept_encoding(),
                            loaded.id
                        );
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Modules => {
            for id in registry()?.list() {
                println!("{id}");
            }
            Ok(())
        }

        Commands::Compress {
            config,
            encoding,
            input,
            output,
        } => {
            let set = load_encodings(&config)?;
            let encoding = set
                .get(&encoding)
                .with_context(|| format!("encoding '{encoding}' is not configured"))?;

            let mut reader: Box<dyn Read> = match &input {
                Some(path) => Box::new(
                    File::open(path).with_context(|| format!("opening {}", path.display()))?,
                ),
                None => Box::new(io::stdin().lock()),
            };
            let sink: Sink = match &output {
                Some(path) => Box::new(
                    File::create(path).with_context(|| format!("creating {}", path.display()))?,
                ),
                None => Box::new(io::stdout()),
            };

            let mut encoder = encoding.new_encoder(sink);
            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut total = 0u64;
            loop {
                let n = match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e).context("reading input"),
                };
                encoder.write_all(&buf[..n])?;
                total += n as u64;
            }
            encoder.close()?;

            tracing::info!(
                encoding = encoding.accept_encoding(),
                bytes_in = total,
                "Compression finished"
            );
            Ok(())
        }

        Commands::Version => {
            println!("Siphon");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn registry() -> Result<ModuleRegistry> {
    let registry = ModuleRegistry::new();
    siphon_brotli::register(&registry)?;
    Ok(registry)
}

fn load_encodings(path: &Path) -> Result<EncodingSet> {
    let source = load_from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    let manager = ModuleManager::new(registry()?);
    Ok(manager.load_encodings(&source)?)
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    // Logs go to stderr; stdout may carry compressed output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::try_parse_from([
            "siphon",
            "compress",
            "--config",
            "site.json",
            "--input",
            "index.html",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Compress {
                config,
                encoding,
                input,
                output,
            } => {
                assert_eq!(config, PathBuf::from("site.json"));
                assert_eq!(encoding, "br");
                assert_eq!(input, Some(PathBuf::from("index.html")));
                assert!(output.is_none());
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_registry_has_brotli() {
        let registry = registry().unwrap();
        assert!(registry.contains(siphon_brotli::MODULE_ID));
    }
}
