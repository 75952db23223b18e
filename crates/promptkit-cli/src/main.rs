mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, patterns::PatternsSubcommand, prd::PrdSubcommand};
use promptkit_core::{Intent, Mode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "promptkit",
    about = "Rewrite prompts for AI coding assistants and report quality diagnostics",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .promptkit/ or .git/)
    #[arg(long, global = true, env = "PROMPTKIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a prompt and report what changed
    Optimize {
        /// Prompt text (reads --file or stdin if omitted)
        prompt: Option<String>,
        /// Read the prompt from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// fast or deep (default: optimizer.default_mode from config)
        #[arg(long, short = 'm')]
        mode: Option<Mode>,
    },

    /// Detect the intent of a prompt
    Analyze {
        /// Prompt text (reads --file or stdin if omitted)
        prompt: Option<String>,
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Score a prompt on the five quality dimensions
    Assess {
        /// Prompt text (reads --file or stdin if omitted)
        prompt: Option<String>,
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Weight scores for this intent instead of the detected one
        #[arg(long)]
        intent: Option<Intent>,
    },

    /// Inspect the pattern library
    Patterns {
        #[command(subcommand)]
        subcommand: PatternsSubcommand,
    },

    /// Review product requirements documents
    Prd {
        #[command(subcommand)]
        subcommand: PrdSubcommand,
    },

    /// Create, show and validate .promptkit/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Optimize { prompt, file, mode } => {
            cmd::optimize::run(&root, prompt.as_deref(), file.as_deref(), mode, cli.json)
        }
        Commands::Analyze { prompt, file } => {
            cmd::analyze::run(prompt.as_deref(), file.as_deref(), cli.json)
        }
        Commands::Assess {
            prompt,
            file,
            intent,
        } => cmd::assess::run(prompt.as_deref(), file.as_deref(), intent, cli.json),
        Commands::Patterns { subcommand } => cmd::patterns::run(&root, subcommand, cli.json),
        Commands::Prd { subcommand } => cmd::prd::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
