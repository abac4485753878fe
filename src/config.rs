//! Application configuration.
//!
//! Settings are loaded from `config/config.toml` (optional) with
//! `ALMACEN`-prefixed environment variables layered on top, e.g.
//! `ALMACEN__SERVER__DATA_DIR=/var/lib/almacen`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the CSV tables and the flag files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// JSON flag file with `{ "activo": bool }`
    #[serde(default = "default_estado_file")]
    pub estado_file: String,
    /// Plain-text maintenance sentinel (`ON` = in maintenance)
    #[serde(default = "default_maintenance_file")]
    pub maintenance_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:10000".to_string()
}

fn default_estado_file() -> String {
    "estado.json".to_string()
}

fn default_maintenance_file() -> String {
    "maintenance.txt".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_addr: default_listen_addr(),
            estado_file: default_estado_file(),
            maintenance_file: default_maintenance_file(),
        }
    }
}

impl AppConfig {
    /// Load the server configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        // Build configuration by reading the TOML file (optional) and environment variables
        let builder = Config::builder()
            .add_source(File::with_name("config/config.toml").required(false))
            .add_source(Environment::with_prefix("ALMACEN").separator("__"));

        // Try to build the configuration, handling missing or unreadable file
        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // If the file existed but was unreadable (parse error, permission issue, etc.), log a warning and retry with env only
                if Path::new("config/config.toml").exists() {
                    eprintln!(
                        "Warning: failed to load config file, falling back to env. Error: {}",
                        err
                    );
                }
                // Retry using only environment variables as source
                Config::builder()
                    .add_source(Environment::with_prefix("ALMACEN").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        // The `server` section is optional; defaults cover a bare checkout
        match settings.get::<AppConfig>("server") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(AppConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Server configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }

    pub fn data_dir(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn estado_path(&self) -> PathBuf {
        self.data_dir().join(&self.estado_file)
    }

    pub fn maintenance_path(&self) -> PathBuf {
        self.data_dir().join(&self.maintenance_file)
    }

    /// Path of the movement journal inside the data directory
    pub fn movements_path(&self) -> PathBuf {
        self.data_dir().join("movimientos.csv")
    }

    /// Path of the kit table inside the data directory
    pub fn kits_path(&self) -> PathBuf {
        self.data_dir().join("kits.csv")
    }
}
