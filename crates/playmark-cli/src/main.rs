use clap::{Parser, Subcommand, ValueEnum};
use playmark_core::Reaction;

mod commands;

#[derive(Parser)]
#[command(name = "playmark-cli", version, about = "Playmark CLI")]
struct Cli {
    /// Viewer id; unset means anonymous browsing
    #[arg(long, global = true, env = "PLAYMARK_VIEWER")]
    viewer: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReactionArg {
    Like,
    Love,
    Dislike,
}

impl From<ReactionArg> for Reaction {
    fn from(arg: ReactionArg) -> Self {
        match arg {
            ReactionArg::Like => Reaction::Like,
            ReactionArg::Love => Reaction::Love,
            ReactionArg::Dislike => Reaction::Dislike,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
enum Commands {
    /// Set or toggle a reaction on an item
    React {
        item: String,
        #[arg(value_enum)]
        kind: ReactionArg,
    },
    /// Set or clear planning intent for an item
    Plan {
        item: String,
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Record play progress (0-100) for an item
    Progress {
        item: String,
        percent: u8,
    },
    /// Mark an item as being played
    Play {
        item: String,
    },
    /// Print the engagement state for an item as JSON
    Show {
        item: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(cli.viewer, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
