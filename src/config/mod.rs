use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::logic::history::DEFAULT_HISTORY_LIMIT;
use crate::logic::undo::DEFAULT_UNDO_LIMIT;
use crate::logic::DisplayType;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "ContactBook";
const APP_NAME: &str = "contactbook";

pub const CONFIG_ENV: &str = "CONTACTBOOK_CONFIG";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn from_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            tracing::info!(path = %self.paths.config_file.display(), "wrote default config");
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// `CONTACTBOOK_CONFIG` wins over the platform config directory. It may
    /// name either a directory or a file.
    pub fn discover() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV).map(PathBuf::from) {
            return Ok(Self::from_override(path));
        }
        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;
        let config_dir = project_dirs.config_dir().to_path_buf();
        Ok(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        })
    }

    pub fn from_override(path: PathBuf) -> Self {
        if path.is_dir() || path.extension().is_none() {
            return Self {
                config_file: path.join("config.toml"),
                config_dir: path,
            };
        }
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            config_file: path,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("creating config directory {}", self.config_dir.display())
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub undo_limit: usize,
    pub history_limit: usize,
    pub seed_sample_data: bool,
    pub shell: ShellOptions,
    pub display: DisplayOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed_sample_data: true,
            shell: ShellOptions::default(),
            display: DisplayOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self) {
        if self.undo_limit == 0 {
            tracing::warn!("undo_limit must be positive, falling back to {DEFAULT_UNDO_LIMIT}");
            self.undo_limit = DEFAULT_UNDO_LIMIT;
        }
        if self.history_limit == 0 {
            tracing::warn!(
                "history_limit must be positive, falling back to {DEFAULT_HISTORY_LIMIT}"
            );
            self.history_limit = DEFAULT_HISTORY_LIMIT;
        }
        if DisplayType::from_str(&self.display.default).is_err() {
            tracing::warn!(
                display = %self.display.default,
                "unknown display type in config, falling back to {}",
                DisplayType::Linkedin
            );
            self.display.default = DisplayType::Linkedin.to_string();
        }
    }

    pub fn display_type(&self) -> DisplayType {
        DisplayType::from_str(&self.display.default).unwrap_or(DisplayType::Linkedin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellOptions {
    pub prompt: String,
    pub show_list_after_command: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            prompt: "> ".to_owned(),
            show_list_after_command: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayOptions {
    pub default: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            default: DisplayType::Linkedin.to_string(),
        }
    }
}
