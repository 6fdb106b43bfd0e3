use crate::locate;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use ticketgen_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Show effective settings and field paths
    Show,
}

pub fn run(explicit: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(explicit, json),
        ConfigSubcommand::Show => show(explicit, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (path, config) = locate::load_config(explicit)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "path": path,
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (path, mut config) = locate::load_config(explicit)?;

    if json {
        if config.password.is_some() {
            config.password = Some("********".to_string());
        }
        let value = serde_json::json!({
            "path": path,
            "config": config,
        });
        return print_json(&value);
    }

    println!("Config: {}\n", path.display());
    print_table(&["SETTING", "VALUE"], settings_rows(&config));
    println!();
    let fields = config
        .fields
        .entries()
        .into_iter()
        .map(|(label, raw)| vec![label.to_string(), raw.to_string()])
        .collect();
    print_table(&["FIELD", "PATH"], fields);
    Ok(())
}

fn settings_rows(config: &Config) -> Vec<Vec<String>> {
    let or_default = |value: Option<String>, fallback: &str| {
        value.unwrap_or_else(|| format!("({fallback})"))
    };
    vec![
        vec!["task_url".into(), config.task_url.clone()],
        vec!["username".into(), config.username.clone()],
        vec![
            "password".into(),
            if config.password.is_some() { "(set)" } else { "(unset)" }.into(),
        ],
        vec![
            "output_dir".into(),
            or_default(
                config.output_dir.as_ref().map(|p| p.display().to_string()),
                "executable directory",
            ),
        ],
        vec![
            "viewer".into(),
            or_default(config.viewer.clone(), "system default"),
        ],
        vec![
            "templates_dir".into(),
            or_default(
                config.templates_dir.as_ref().map(|p| p.display().to_string()),
                "built-in",
            ),
        ],
        vec!["timeout_secs".into(), config.timeout_secs.to_string()],
    ]
}
