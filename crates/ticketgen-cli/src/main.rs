mod cmd;
mod locate;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, generate::GenerateArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ticketgen",
    about = "Render printable scrum cards for issue-tracker stories, with epic and sub-task detail",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest ticketgen.yaml upward from cwd, then ~/ticketgen.yaml)
    #[arg(long, global = true, env = "TICKETGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter ticketgen.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Fetch stories and write a ticket sheet
    Generate(GenerateArgs),

    /// Inspect and validate the configuration
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

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { force } => cmd::init::run(config, force),
        Commands::Generate(args) => cmd::generate::run(config, args, cli.json),
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
