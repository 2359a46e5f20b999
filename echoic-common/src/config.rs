//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ECHOIC_ROOT_FOLDER`, then `ECHOIC_ROOT` environment variables
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: the loader logs a
//! warning and falls back to defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the recognizer API key from TOML
pub const RECOGNIZER_API_KEY_ENV: &str = "ECHOIC_RECOGNIZER_API_KEY";

/// Default Google Speech v2 endpoint
pub const DEFAULT_RECOGNIZER_ENDPOINT: &str = "http://www.google.com/speech-api/v2/recognize";

/// Compiled-in fallback values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub bind_address: String,
    pub max_upload_bytes: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("echoic"))
            .unwrap_or_else(|| PathBuf::from("./echoic_data"));

        Self {
            root_folder,
            log_level: "info".to_string(),
            bind_address: "127.0.0.1:5740".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// `[recognizer]` table: speech recognition endpoint and calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Value of the `client` query parameter
    #[serde(default = "default_client")]
    pub client: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Ambient-noise calibration window at the start of each recording
    #[serde(default = "default_ambient_window_ms")]
    pub ambient_window_ms: u64,

    /// HTTP timeout; 0 leaves it to the transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            client: default_client(),
            api_key: None,
            ambient_window_ms: default_ambient_window_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_RECOGNIZER_ENDPOINT.to_string()
}

fn default_client() -> String {
    "chromium".to_string()
}

fn default_ambient_window_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

/// Contents of `<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub recognizer: RecognizerSettings,
}

impl TomlConfig {
    /// Recognizer API key, environment first, then TOML
    pub fn recognizer_api_key(&self) -> Option<String> {
        std::env::var(RECOGNIZER_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.recognizer
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Platform config file location for a module, if one exists
///
/// Linux checks `~/.config/echoic/<module>.toml` then `/etc/echoic/<module>.toml`.
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", module_name);

    let user_config = dirs::config_dir().map(|d| d.join("echoic").join(&file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/echoic").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load module configuration with graceful degradation
///
/// An explicit path that cannot be read or parsed logs a warning; a missing
/// default file is silent. Either way the defaults are returned.
pub fn load_module_config(module_name: &str, explicit_path: Option<&Path>) -> TomlConfig {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => config_file_path(module_name),
    };

    let Some(path) = path else {
        debug!("No config file for {}, using defaults", module_name);
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} - using defaults", e);
            TomlConfig::default()
        }
    }
}

/// Resolves the root folder following the documented priority order
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_config: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_config: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Use an already loaded config instead of looking up the module file
    pub fn with_config(mut self, config: TomlConfig) -> Self {
        self.toml_config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in ["ECHOIC_ROOT_FOLDER", "ECHOIC_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        let toml_root = match &self.toml_config {
            Some(config) => config.root_folder.clone(),
            None => load_module_config(&self.module_name, None).root_folder,
        };
        if let Some(path) = toml_root {
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder layout and names the files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create root, `uploads/` and `recordings/` (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_path())?;
        std::fs::create_dir_all(self.recordings_path())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("echoic.db")
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    /// Song audio uploaded by users
    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join("uploads")
    }

    /// Recordings submitted for evaluation
    pub fn recordings_path(&self) -> PathBuf {
        self.root_folder.join("recordings")
    }
}
