//! Custom configuration with layered loading
//!
//! Custom settings have to be in the container before any package declares
//! its defaults. They are assembled from, lowest to highest precedence:
//! 1. Global config: `$XDG_CONFIG_HOME/svcpack/svcpack.toml`
//! 2. Explicit config file (`--config`)
//! 3. Environment variables: `SVCPACK__<service>__<key>`
//!
//! Each layer is merged like package defaults are: the higher layer wins,
//! nested tables merge key by key.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{merge_recessive, Map, Value};
use crate::infrastructure::di::{Container, CONFIGURATION_KEY};

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "SVCPACK";

/// Custom settings, keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    pub services: Map,
}

/// Get the XDG config directory for svcpack.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "svcpack").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("svcpack.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn load_file(path: &Path) -> ApplicationResult<Map> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect())
}

/// Datetimes have no `Value` variant; they are kept as their TOML text.
fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

/// Read `<prefix>__<service>__<key>` variables into a settings map.
///
/// Keys come out lowercased; values that look like numbers or booleans are
/// parsed as such.
fn env_overrides(prefix: &str) -> ApplicationResult<Map> {
    let config = Config::builder()
        .add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(config_err)?;
    config.try_deserialize().map_err(config_err)
}

/// Restore the spelling of lowercased override keys from `existing`.
///
/// Keys without a case-insensitive match in `existing` stay lowercase.
fn match_case(overrides: Map, existing: &Map) -> Map {
    overrides
        .into_iter()
        .map(|(key, value)| {
            let key = if existing.contains_key(&key) {
                key
            } else {
                match existing.keys().find(|name| name.to_lowercase() == key) {
                    Some(name) => name.clone(),
                    None => {
                        debug!(key = %key, "env override has no matching setting");
                        key
                    }
                }
            };
            let value = match (value, existing.get(&key)) {
                (Value::Map(nested), Some(Value::Map(known))) => {
                    Value::Map(match_case(nested, known))
                }
                (value, _) => value,
            };
            (key, value)
        })
        .collect()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// An explicit file must exist; the global file is optional.
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers(global_config_path().as_deref(), explicit, ENV_PREFIX)
    }

    /// Load settings from the given layers.
    #[instrument(level = "debug")]
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env_prefix: &str,
    ) -> ApplicationResult<Self> {
        let mut services = Map::new();

        if let Some(path) = global.filter(|path| path.exists()) {
            debug!("load global config: {}", path.display());
            services = merge_recessive(services, load_file(path)?);
        }

        if let Some(path) = explicit {
            let path = expand_path(path);
            debug!("load config: {}", path.display());
            services = merge_recessive(services, load_file(&path)?);
        }

        let overrides = match_case(env_overrides(env_prefix)?, &services);
        services = merge_recessive(services, overrides);

        Ok(Self { services })
    }

    /// Settings of a single service.
    pub fn service(&self, name: &str) -> Option<&Value> {
        self.services.get(name)
    }

    /// Container whose configuration registry holds these settings.
    pub fn into_container(self) -> Container {
        Container::with_parameters([(CONFIGURATION_KEY, Value::Map(self.services))])
    }

    /// Show the settings as TOML.
    ///
    /// Null values have no TOML form; maps containing them fail to render.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(&self.services).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# svcpack configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/svcpack/svcpack.toml
#   File:   --config <file>
#   Env:    SVCPACK__<service>__<key> environment variables
#
# Environment variable names are case-insensitive. They reach a mixed-case
# service or key only when a config file already spells it out; otherwise
# the override is stored in lowercase.
#
# Each table configures one service. Packages add their defaults beneath
# these values: anything set here wins, nested tables merge key by key.

[greeter]
# greeting = "Hello"
# excitement = 1

["greeter.loud"]
# excitement = 3
"#
        .to_string()
    }
}
