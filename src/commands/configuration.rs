// Configuration commands: config show, config path

use anyhow::Result;
use colored::*;
use prompt_library::config::{config_path, Config};

use crate::cli::ConfigCommands;

pub fn handle_config(action: &ConfigCommands, config: &Config) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let path = config_path()?;
            println!("{}", "Effective configuration:".green());
            println!("  {:<15} {}", "endpoint", display_or_unset(config.endpoint.as_deref()));
            println!("  {:<15} {}", "anon_key", config.masked_key());
            println!("  {:<15} {}", "storage_bucket", config.storage_bucket);
            println!("  {:<15} {}", "open_links", config.open_links);
            let note = if path.exists() { "" } else { " (not created)" };
            println!("\n  {} {}{}", "file:".dimmed(), path.display(), note.dimmed());
        }
        ConfigCommands::Path => {
            println!("{}", config_path()?.display());
        }
    }
    Ok(())
}

fn display_or_unset(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(not set)".yellow().to_string(),
    }
}
