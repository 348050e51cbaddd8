//! Accelerator configuration.
//!
//! Settings come from `local.properties` at the workspace root. Loading never
//! fails the build: an unreadable or malformed source yields a disabled
//! configuration, which turns the whole engine off and leaves a plain source
//! build.

mod properties;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::Classification;
use crate::consts::{
  DEFAULT_CLASSIFICATION_KEY, DEFAULT_SKIP_PARENT_PATHS, ENABLE_KEY, PROPERTIES_FILE, SKIP_PARENTS_KEY, STORE_ENV,
  STORE_KEY, WORKSPACE_KEY,
};
use crate::platform::paths::cache_dir;
use crate::registry::ModulePath;

pub use properties::{Properties, PropertiesError};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed {path}: {source}")]
  Malformed {
    path: PathBuf,
    #[source]
    source: PropertiesError,
  },

  #[error("invalid value for {key}: {value:?}")]
  InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceleratorConfig {
  pub enabled: bool,
  /// Explicit active set. `None` means the default classification applies to every module.
  pub workspace: Option<Vec<ModulePath>>,
  pub skip_parents: Vec<ModulePath>,
  pub default_classification: Classification,
  /// Store root from the properties file, if any.
  pub store: Option<PathBuf>,
}

impl Default for AcceleratorConfig {
  fn default() -> Self {
    Self::disabled()
  }
}

impl AcceleratorConfig {
  pub fn disabled() -> Self {
    Self {
      enabled: false,
      workspace: None,
      skip_parents: default_skip_parents(),
      default_classification: Classification::Stable,
      store: None,
    }
  }

  /// Load the configuration for a workspace, failing closed.
  pub fn load(root: &Path) -> Self {
    match Self::try_load(root) {
      Ok(config) => config,
      Err(e) => {
        warn!(error = %e, "configuration unavailable, accelerator disabled");
        Self::disabled()
      }
    }
  }

  pub fn try_load(root: &Path) -> Result<Self, ConfigError> {
    let path = root.join(PROPERTIES_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
      path: path.clone(),
      source,
    })?;
    let props = Properties::parse(&content).map_err(|source| ConfigError::Malformed {
      path: path.clone(),
      source,
    })?;
    let config = Self::from_properties(&props, root)?;
    debug!(
      enabled = config.enabled,
      workspace = ?config.workspace,
      default = ?config.default_classification,
      "loaded accelerator configuration"
    );
    Ok(config)
  }

  /// Interpret already-parsed properties. Relative store paths resolve against `root`.
  pub fn from_properties(props: &Properties, root: &Path) -> Result<Self, ConfigError> {
    let enabled = match props.get(ENABLE_KEY) {
      None => false,
      Some(v) => parse_bool(ENABLE_KEY, v)?,
    };

    let workspace = props
      .get_list(WORKSPACE_KEY)
      .map(|paths| parse_paths(WORKSPACE_KEY, &paths))
      .transpose()?;

    let skip_parents = match props.get_list(SKIP_PARENTS_KEY) {
      Some(paths) => parse_paths(SKIP_PARENTS_KEY, &paths)?,
      None => default_skip_parents(),
    };

    let default_classification = match props.get(DEFAULT_CLASSIFICATION_KEY) {
      None => Classification::Stable,
      Some(v) => match v.trim().to_ascii_lowercase().as_str() {
        "stable" => Classification::Stable,
        "active" => Classification::Active,
        _ => {
          return Err(ConfigError::InvalidValue {
            key: DEFAULT_CLASSIFICATION_KEY.to_string(),
            value: v.to_string(),
          });
        }
      },
    };

    let store = props
      .get(STORE_KEY)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| root.join(s));

    Ok(Self {
      enabled,
      workspace,
      skip_parents,
      default_classification,
      store,
    })
  }

  /// Artifact store root: `MODSWAP_STORE`, then the properties value, then the cache dir.
  pub fn store_root(&self) -> PathBuf {
    if let Ok(path) = std::env::var(STORE_ENV)
      && !path.is_empty()
    {
      return PathBuf::from(path);
    }
    if let Some(ref store) = self.store {
      return store.clone();
    }
    default_store_root()
  }
}

pub fn default_store_root() -> PathBuf {
  cache_dir().join("artifacts")
}

fn default_skip_parents() -> Vec<ModulePath> {
  DEFAULT_SKIP_PARENT_PATHS
    .iter()
    .map(|p| ModulePath(p.to_string()))
    .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(ConfigError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
    }),
  }
}

fn parse_paths(key: &str, raw: &[String]) -> Result<Vec<ModulePath>, ConfigError> {
  raw
    .iter()
    .map(|p| {
      ModulePath::parse(p).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: p.clone(),
      })
    })
    .collect()
}
