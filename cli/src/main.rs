//! regdrill - course registration drill
//!
//! Terminal front end for the registration drill core: set up a boundary,
//! watch the synthetic server clock, log in at the right instant, then
//! register courses under simulated load.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod input;
mod render;

use context::{ContextArgs, DrillContext};

/// regdrill - course registration drill
#[derive(Parser, Debug)]
#[command(name = "regdrill")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a drill configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Boundary instant, YYYY-MM-DDTHH:MM:SS
    #[arg(long, global = true)]
    boundary: Option<String>,

    /// Lead time in seconds (3, 5, 10, 30 or 60)
    #[arg(long, global = true)]
    lead: Option<u32>,

    /// RNG seed for delays and cart shuffles
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Course catalog (JSON); the bundled sample when omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding the session hand-off file
    #[arg(long, global = true, default_value = ".regdrill-session")]
    session_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full drill: setup, live clock, login, browse
    Drill,

    /// Reopen the stored session in the catalog browser
    Browse,

    /// Classify a simulated click time against the boundary
    Classify(commands::classify::ClassifyArgs),

    /// List colleges, or the departments of one college
    Catalog {
        /// College name
        #[arg(long)]
        college: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let ctx = DrillContext::load(ContextArgs {
        config: cli.config,
        boundary: cli.boundary,
        lead: cli.lead,
        seed: cli.seed,
        catalog: cli.catalog,
        session_dir: cli.session_dir,
    })?;

    match cli.command {
        Commands::Drill => commands::drill::run(&ctx),
        Commands::Browse => commands::browse::run(&ctx),
        Commands::Classify(args) => commands::classify::run(&ctx, &args),
        Commands::Catalog { college } => commands::catalog::run(&ctx, college.as_deref()),
    }
}
