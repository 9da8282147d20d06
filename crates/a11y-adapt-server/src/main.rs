//! a11y-adapt command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::{Map, Value};

use a11y_adapt::{Adapter, GenerativeTasks, Profile};
use a11y_adapt_server::config::{engine_config, resolve_addr};
use a11y_adapt_server::HttpServer;

#[derive(Parser)]
#[command(
    name = "a11y-adapt",
    about = "Accessibility adapter that rewrites rendered HTML for visual, auditory and cognitive profiles",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service (default).
    Serve {
        /// Listen address (host:port). Also reads A11Y_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Generative provider API key. Also reads GOOGLE_API_KEY.
        #[arg(long)]
        api_key: Option<String>,

        /// Directory for staged video downloads. Also reads A11Y_SCRATCH_DIR.
        #[arg(long)]
        scratch_dir: Option<String>,
    },

    /// Adapt one HTML file locally.
    Adapt {
        /// HTML file to adapt.
        #[arg(short, long)]
        input: PathBuf,

        /// Profile identifier (see `profiles`).
        #[arg(short, long)]
        profile: String,

        /// Profile options as a JSON object, e.g. '{"total_blindness": true}'.
        #[arg(short, long)]
        config: Option<String>,

        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generative provider API key. Also reads GOOGLE_API_KEY.
        #[arg(long)]
        api_key: Option<String>,

        /// Print the run report as JSON to stderr.
        #[arg(long)]
        report: bool,
    },

    /// List accepted profile identifiers and their options.
    Profiles,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   a11y-adapt completions bash > ~/.local/share/bash-completion/completions/a11y-adapt
    ///   a11y-adapt completions zsh > ~/.zfunc/_a11y-adapt
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        api_key: None,
        scratch_dir: None,
    }) {
        Commands::Serve {
            addr,
            api_key,
            scratch_dir,
        } => {
            let config = engine_config(api_key.as_deref(), scratch_dir.as_deref());
            let tasks = GenerativeTasks::from_config(config)
                .context("set GOOGLE_API_KEY or pass --api-key")?;
            let server = HttpServer::new(Adapter::new(Arc::new(tasks)));
            server.run(&resolve_addr(addr.as_deref())).await?;
        }

        Commands::Adapt {
            input,
            profile,
            config,
            output,
            api_key,
            report,
        } => {
            let html = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let options: Map<String, Value> = match config {
                Some(raw) => serde_json::from_str(&raw).context("--config must be a JSON object")?,
                None => Map::new(),
            };
            let profile = Profile::resolve(&profile, &options)?;

            let tasks = GenerativeTasks::from_config(engine_config(api_key.as_deref(), None))
                .context("set GOOGLE_API_KEY or pass --api-key")?;
            let adapter = Adapter::new(Arc::new(tasks));
            let (adapted, run) = adapter.adapt(&html, &profile).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, adapted)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Wrote {}", path.display());
                }
                None => println!("{adapted}"),
            }
            if report {
                eprintln!("{}", serde_json::to_string_pretty(&run)?);
            }
        }

        Commands::Profiles => {
            for entry in Adapter::profiles() {
                let aliases = if entry.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" (alias: {})", entry.aliases.join(", "))
                };
                println!("{}{aliases} -> {}", entry.id, entry.resolves_to);
                if !entry.presets.is_empty() {
                    println!("  presets: {}", entry.presets.join(", "));
                }
                println!("  options: {}", entry.options.join(", "));
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "a11y-adapt", &mut std::io::stdout());
        }
    }

    Ok(())
}
