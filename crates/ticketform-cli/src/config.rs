//! CLI Configuration

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Form configuration used when `--config` is not given
    pub form_config: Option<PathBuf>,
    /// Directory of the file-backed draft store
    pub draft_dir: Option<PathBuf>,
    pub default_format: Option<String>,
}

impl CliConfig {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        let path = Self::config_path(profile)?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    /// Default output format, if the profile names a known one
    pub fn format(&self) -> Option<OutputFormat> {
        self.default_format.as_deref().and_then(OutputFormat::parse)
    }

    /// Draft directory: the flag, then the profile, then `~/.ticketform/drafts`
    pub fn draft_dir(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        match flag.or_else(|| self.draft_dir.clone()) {
            Some(dir) => Ok(dir),
            None => Ok(Self::base_dir()?.join("drafts")),
        }
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::base_dir()?.join(filename))
    }

    fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot find home directory"))?;
        Ok(home.join(".ticketform"))
    }
}
