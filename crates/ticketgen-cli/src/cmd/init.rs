use anyhow::Context;
use std::path::Path;
use ticketgen_core::config::Config;

use crate::locate;

pub fn run(explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = locate::init_target(explicit);

    let config = Config::default();
    let written = if force {
        config.save(&path).map(|()| true)
    } else {
        config.save_new(&path)
    }
    .with_context(|| format!("failed to write {}", path.display()))?;

    if !written {
        println!("  exists:  {}", path.display());
        println!("\nUse --force to overwrite.");
        return Ok(());
    }
    println!("  created: {}", path.display());
    println!("\nNext: set task_url and username, then run: ticketgen generate PROJ-1,PROJ-2");
    Ok(())
}
