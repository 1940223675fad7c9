use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Rows per multi-row INSERT statement when nothing else is configured.
pub const DEFAULT_MAX_BATCH_ROWS: usize = 100;

/// Page size substituted when a query asks for an offset without a limit.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Query compiler configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Maximum number of rows compiled into a single INSERT statement.
    /// Default: 100
    pub max_batch_rows: Option<usize>,

    /// LIMIT used when a query sets an OFFSET but no LIMIT.
    /// Default: 20
    pub default_page_size: Option<u64>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> =
    LazyLock::new(|| RwLock::new(default_config_path()));

fn default_config_path() -> PathBuf {
    match std::env::var("STRATA_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("strata").join("config.toml"),
    }
}

fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".config"))
        })
}

/// Loads the configuration file into the global slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap();
    *global_config = Some(config);
    Ok(())
}

/// Points subsequent [`init`] and [`Config::save`] calls at `path`.
pub fn set_config_path<P: AsRef<Path>>(path: P) {
    let mut config_path = CONFIG_PATH.write().unwrap();
    *config_path = path.as_ref().to_path_buf();
}

/// Returns a snapshot of the current configuration.
///
/// Later runtime adjustments do not affect a snapshot already taken.
pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap();
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap();
    config_guard.get_or_insert_with(Config::default_config).clone()
}

fn update_config<F>(f: F) -> Result<()>
where
    F: FnOnce(&mut Config),
{
    let mut config_guard = CONFIG.write().unwrap();
    let mut config = config_guard.clone().unwrap_or_else(Config::default_config);
    f(&mut config);
    config.resolve()?;
    *config_guard = Some(config);
    Ok(())
}

/// Adjusts the process-wide batch size at runtime.
pub fn set_max_batch_rows(rows: usize) -> Result<()> {
    update_config(|config| config.max_batch_rows = Some(rows))
}

/// Adjusts the process-wide default page size at runtime.
pub fn set_default_page_size(size: u64) -> Result<()> {
    update_config(|config| config.default_page_size = Some(size))
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            max_batch_rows: Some(DEFAULT_MAX_BATCH_ROWS),
            default_page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        Self::from_path(&config_path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if self.max_batch_rows == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "max_batch_rows",
                reason: "a batch must hold at least one row".to_string(),
            });
        }

        if self.default_page_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "default_page_size",
                reason: "a page must hold at least one row".to_string(),
            });
        }

        self.max_batch_rows.get_or_insert(DEFAULT_MAX_BATCH_ROWS);
        self.default_page_size.get_or_insert(DEFAULT_PAGE_SIZE);

        Ok(())
    }

    pub fn max_batch_rows(&self) -> usize {
        self.max_batch_rows.unwrap_or(DEFAULT_MAX_BATCH_ROWS)
    }

    pub fn default_page_size(&self) -> u64 {
        self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let serialized = self.to_annotated_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Serializes the configuration as TOML with each key preceded by its
    /// field documentation as comments.
    pub fn to_annotated_string(&self) -> Result<String> {
        let serialized = toml::to_string_pretty(self)?;
        let mut out = String::new();

        for line in Self::DOCS.lines() {
            out.push_str(&format!("# {line}\n"));
        }
        out.push('\n');

        for line in serialized.lines() {
            let key = line.split('=').next().map(str::trim).unwrap_or_default();
            if let Ok(docs) = Self::get_field_docs(key) {
                for doc in docs.lines() {
                    out.push_str(&format!("# {doc}\n"));
                }
            }
            out.push_str(line);
            out.push('\n');
        }

        Ok(out)
    }
}
