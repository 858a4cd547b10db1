//! # CRO Lens CLI (`cro`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cro init` | Create the SQLite database and run schema migrations |
//! | `cro serve` | Start the HTTP API |
//! | `cro analyze <url>` | Analyze one page and store the report |
//! | `cro results` | List stored reports, optionally filtered |
//! | `cro show <id>` | Print one stored report as JSON |
//!
//! ## Examples
//!
//! ```bash
//! cro --config ./config/cro.toml init
//! GEMINI_API_KEY=... cro analyze https://shop.example.com/product/42
//! cro results --filter example.com
//! RUST_LOG=cro_lens=debug cro serve
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cro_lens::{config, migrate, pipeline, results, server};

/// CRO Lens: structured conversion-rate-optimization reports for web pages.
#[derive(Parser)]
#[command(name = "cro", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cro.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `reports` table. Running it
    /// again is harmless.
    Init,

    /// Start the HTTP API (`/analyze`, `/results`, `/reports/{id}`).
    Serve,

    /// Analyze a single page and store the report.
    ///
    /// Runs the same pipeline as `POST /analyze` and prints the stored
    /// report as JSON.
    Analyze {
        /// Absolute http(s) URL of the page.
        url: String,
    },

    /// List stored reports, newest first.
    Results {
        /// Only show reports whose URL or summaries contain this text (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },

    /// Print a stored report as JSON.
    Show {
        /// Report id.
        id: String,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Analyze { url } => {
            pipeline::run_analyze(&cfg, &url).await?;
        }
        Commands::Results { filter } => {
            results::run_results(&cfg, filter.as_deref()).await?;
        }
        Commands::Show { id } => {
            results::run_show(&cfg, &id).await?;
        }
    }

    Ok(())
}
