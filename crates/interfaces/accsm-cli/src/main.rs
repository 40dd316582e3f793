use accsm_cli::commands;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess the session type of each setup filename
    Classify {
        #[arg(required = true)]
        filenames: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Infer the track of each filename and of the whole batch
    Track {
        #[arg(required = true)]
        filenames: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print simplified names (`quali.json`, `race.json`, ...)
    Simplify {
        #[arg(short, long, help = "Label prepended as `(prefix) name.json`")]
        prefix: Option<String>,
        #[arg(required = true)]
        filenames: Vec<String>,
    },
    /// List the track pattern table in match order
    Patterns,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Classify { filenames, json } => {
            commands::cmd_classify(&filenames, json, &mut out)?
        }
        Commands::Track { filenames, json } => commands::cmd_track(&filenames, json, &mut out)?,
        Commands::Simplify { prefix, filenames } => {
            commands::cmd_simplify(&filenames, prefix.as_deref(), &mut out)?
        }
        Commands::Patterns => commands::cmd_patterns(&mut out)?,
    }

    Ok(())
}
