//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists: the SQLite
//! database and the session state directory. Resolution priority:
//! 1. Caller-supplied override (command-line argument)
//! 2. `STORECHECK_ROOT_FOLDER` environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

/// Environment variable consulted before the config file
pub const ROOT_FOLDER_ENV: &str = "STORECHECK_ROOT_FOLDER";

/// Compiled per-platform fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            dirs::data_local_dir()
                .map(|d| d.join("storecheck"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/storecheck"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("storecheck"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/storecheck"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("storecheck"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\storecheck"))
        } else {
            PathBuf::from("./storecheck_data")
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Optional TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the platform config file if one exists; missing or unreadable
    /// files degrade to defaults rather than failing startup
    pub fn load() -> Self {
        let Some(path) = Self::config_file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Platform config file location
    ///
    /// Linux prefers `~/.config/storecheck/config.toml`, falling back to
    /// `/etc/storecheck/config.toml`; other platforms use the user config
    /// directory only.
    pub fn config_file_path() -> Option<PathBuf> {
        let user_config = dirs::config_dir().map(|d| d.join("storecheck").join("config.toml"));
        if cfg!(target_os = "linux") {
            if let Some(path) = &user_config {
                if path.exists() {
                    return user_config;
                }
            }
            let system_config = PathBuf::from("/etc/storecheck/config.toml");
            if system_config.exists() {
                return Some(system_config);
            }
        }
        user_config
    }
}

/// Resolves the root folder using the documented priority order
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

    /// Apply a command-line override (highest priority)
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            tracing::info!("{}: root folder from command line", self.module_name);
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                tracing::info!("{}: root folder from {}", self.module_name, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        let config = TomlConfig::load();
        if let Some(path) = config.root_folder {
            tracing::info!("{}: root folder from config file", self.module_name);
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and derives the well-known paths inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// SQLite database location
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("storecheck.db")
    }

    /// Directory for the file-backed session state store
    pub fn session_dir(&self) -> PathBuf {
        self.root_folder.join("session")
    }
}
