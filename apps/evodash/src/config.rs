//! # Configuration
//!
//! Layered configuration for the binary. Later layers win:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>`, or `evodash.toml` in the working directory)
//! 3. Environment (`EVODASH_DATABASE`, `EVODASH_HOST`, `EVODASH_PORT`)
//! 4. Command-line flags
//!
//! ```toml
//! [source]
//! database = "pokemon_dw.db"
//! entities = "pokemon"
//! attributes = "pokemon_stats"
//! evolutions = "evolution"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8501
//! ```

use evodash_core::{EvodashError, SourceSchema, primitives::DEFAULT_DATABASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "evodash.toml";

/// Default dashboard bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default dashboard port.
pub const DEFAULT_PORT: u16 = 8501;

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// `[source]`: where the dataset lives and what its relations are called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub database: PathBuf,
    pub entities: String,
    pub attributes: String,
    pub evolutions: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let schema = SourceSchema::default();
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            entities: schema.entities,
            attributes: schema.attributes,
            evolutions: schema.evolutions,
        }
    }
}

impl SourceConfig {
    /// Relation names as a loader schema.
    #[must_use]
    pub fn schema(&self) -> SourceSchema {
        SourceSchema {
            entities: self.entities.clone(),
            attributes: self.attributes.clone(),
            evolutions: self.evolutions.clone(),
        }
    }
}

/// `[server]`: dashboard bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load defaults, then the config file, then the process environment.
    ///
    /// An explicit `path` must exist; the implicit `evodash.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, EvodashError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, EvodashError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EvodashError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
            .map_err(|e| EvodashError::Config(format!("'{}': {}", path.display(), e)))
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, EvodashError> {
        let config: Self =
            toml::from_str(text).map_err(|e| EvodashError::Config(e.to_string()))?;
        config.source.schema().validate()?;
        Ok(config)
    }

    /// Overlay `EVODASH_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), EvodashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup("EVODASH_DATABASE").filter(|v| !v.is_empty()) {
            self.source.database = PathBuf::from(db);
        }
        if let Some(host) = lookup("EVODASH_HOST").filter(|v| !v.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("EVODASH_PORT").filter(|v| !v.is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                EvodashError::Config(format!("EVODASH_PORT is not a valid port: '{}'", port))
            })?;
        }
        Ok(())
    }

    /// Overlay command-line flags.
    pub fn apply_flags(
        &mut self,
        database: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
    ) {
        if let Some(db) = database {
            self.source.database = db;
        }
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
