//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `THIAMSU_ROOT_FOLDER` environment variable
//! 3. TOML config file (`~/.config/thiamsu/<module>.toml`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "THIAMSU_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "thiamsu.db";

/// Default number of songs per listing page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Default maximum length of a submitted translation line (characters)
pub const DEFAULT_TRANSLATION_MAX_LENGTH: usize = 1000;

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Site tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Songs per page on listing and search pages
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Submitted translation lines longer than this are skipped
    #[serde(default = "default_translation_max_length")]
    pub translation_max_length: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            translation_max_length: DEFAULT_TRANSLATION_MAX_LENGTH,
        }
    }
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_translation_max_length() -> usize {
    DEFAULT_TRANSLATION_MAX_LENGTH
}

/// Contents of `~/.config/thiamsu/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("thiamsu"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\thiamsu"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("thiamsu"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/thiamsu"))
        } else {
            // ~/.local/share/thiamsu
            dirs::data_local_dir()
                .map(|d| d.join("thiamsu"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/thiamsu"))
        };

        Self {
            root_folder,
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            log_level: default_log_level(),
        }
    }
}

/// Resolves the root folder and loads the module TOML config
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
        }
    }

    /// Root folder given on the command line (priority 1)
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// Path of this module's TOML config file, if a config dir exists
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("thiamsu").join(format!("{}.toml", self.module_name)))
    }

    /// Load the module TOML config, or defaults when absent or malformed
    pub fn load_toml(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            return TomlConfig::default();
        };
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return TomlConfig::default();
        }
        match TomlConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                TomlConfig::default()
            }
        }
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.load_toml().root_folder {
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
