use crate::locate;
use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};
use ticketgen_core::config::WarnLevel;
use ticketgen_core::generator::Generator;
use ticketgen_core::types::split_ticket_list;
use ticketgen_core::worker;

#[derive(Args)]
pub struct GenerateArgs {
    /// Comma-separated story ids, e.g. PROJ-1,PROJ-2
    pub tickets: String,

    /// Don't open the finished sheet
    #[arg(long)]
    pub no_open: bool,

    /// Write the sheet here instead of the configured directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Override the configured username
    #[arg(long)]
    pub username: Option<String>,

    /// Override the configured password
    #[arg(long, env = "TICKETGEN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn run(explicit: Option<&Path>, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let (_, mut config) = locate::load_config(explicit)?;
    if let Some(username) = args.username {
        config.username = username;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
    }

    for w in config.validate() {
        match w.level {
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
            WarnLevel::Warning => tracing::warn!("{}", w.message),
        }
    }

    let source = config
        .http_source(args.password.as_deref())
        .context("failed to build HTTP client")?;
    let templates = config.templates().context("failed to load templates")?;

    let mut generator = Generator::new(source, templates)
        .with_fields(config.fields.clone())
        .with_output_dir(config.output_dir());
    if !args.no_open {
        generator = generator.with_viewer(config.viewer());
    }

    let handle = worker::spawn(generator, split_ticket_list(&args.tickets))
        .context("failed to start generation worker")?;

    let rt = tokio::runtime::Runtime::new()?;
    let token = handle.cancel_token();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            token.cancel();
        }
    });

    // JSON mode keeps stdout for the report.
    for fragment in handle.progress().iter() {
        if json {
            eprint!("{fragment}");
        } else {
            print!("{fragment}");
            std::io::stdout().flush()?;
        }
    }

    let report = handle.join()?;
    rt.shutdown_background();

    if json {
        eprintln!();
        print_json(&report)?;
    } else {
        println!("\n\n{}", report.summary());
    }
    Ok(())
}
