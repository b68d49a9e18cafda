//! CLI Commands

pub mod admit;
pub mod config;
pub mod draft;
pub mod preview;
pub mod validate;

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use ticketform::{Form, FormConfig, FormData, RuleRegistry};

use crate::config::CliConfig;
use crate::output::OutputFormat;

/// Settings shared by every command
pub struct Context {
    pub profile: CliConfig,
    pub profile_name: Option<String>,
    pub format: OutputFormat,
}

impl Context {
    /// Form configuration: the flag, then the profile, then the built-in ticket form
    pub fn form_config(&self, flag: Option<PathBuf>) -> Result<FormConfig> {
        match flag.or_else(|| self.profile.form_config.clone()) {
            Some(path) => {
                let config = FormConfig::load(&path)
                    .with_context(|| format!("loading form config {}", path.display()))?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(FormConfig::ticket_form()),
        }
    }
}

/// Build the form and fill it from a JSON values file
pub fn filled_form(config: &FormConfig, values: &Path) -> Result<Form> {
    let mut form = Form::from_config(config, &RuleRegistry::new())?;
    for (name, value) in read_values(values)? {
        if form.field(&name).is_none() {
            tracing::warn!(field = %name, "Ignoring value for unknown field");
            continue;
        }
        form.set_value(&name, value.first())?;
    }
    Ok(form)
}

fn read_values(path: &Path) -> Result<FormData> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
