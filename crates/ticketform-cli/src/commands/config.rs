//! Config commands

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;
use ticketform::FormConfig;

use super::Context;
use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use crate::ConfigCommands;

pub fn handle(ctx: &Context, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            fs::write(&path, FormConfig::ticket_form().to_toml_string()?)?;

            let form_config = fs::canonicalize(&path).unwrap_or_else(|_| PathBuf::from(&path));
            let profile = CliConfig { form_config: Some(form_config), ..CliConfig::load(ctx.profile_name.as_deref())? };
            let saved = profile.save(ctx.profile_name.as_deref())?;
            output::success(&format!("Wrote {}", path.display()));
            output::note(&format!("Profile saved at {}", saved.display()));
        }
        ConfigCommands::Show { config } => {
            let config = ctx.form_config(config)?;
            match ctx.format {
                OutputFormat::Table => print!("{}", config.to_toml_string()?),
                format => format.print(&config),
            }
        }
    }
    Ok(())
}
