// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Configuration directory and `config.json`

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::{HeaderPolicy, HeaderRules};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "KURIIRI_CONFIG_DIR";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE: &str = "config.json";

/// Contents of `config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Arguments prepended to every invocation
    #[serde(default)]
    pub default_options: Vec<String>,
    /// Header storage rules layered over the built-in ones
    #[serde(default)]
    pub session_headers: BTreeMap<String, HeaderPolicy>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Configuration directory
    pub dir: PathBuf,
    /// Arguments prepended to every invocation
    pub default_options: Vec<String>,
    /// Header storage rules layered over the built-in ones
    pub session_headers: BTreeMap<String, HeaderPolicy>,
}

impl Config {
    /// Configuration with no file, rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_options: Vec::new(),
            session_headers: BTreeMap::new(),
        }
    }

    /// Load the configuration from the default directory
    pub fn discover() -> Result<Self> {
        Self::load(default_dir()?)
    }

    /// Load `config.json` from `dir`; a missing file yields defaults
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let path = dir.join(CONFIG_FILE);

        let file = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<ConfigFile>(&text).map_err(|e| {
                Error::config(format!("invalid config file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => ConfigFile::default(),
            Err(e) => {
                return Err(Error::config(format!(
                    "cannot read config file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        debug!(dir = %dir.display(), options = file.default_options.len(), "Loaded config");

        Ok(Self {
            dir,
            default_options: file.default_options,
            session_headers: file.session_headers,
        })
    }

    /// Directory holding named sessions
    pub fn sessions_dir(&self) -> PathBuf {
        self.dir.join("sessions")
    }

    /// Built-in header rules with the configured overrides applied
    pub fn header_rules(&self) -> HeaderRules {
        HeaderRules::default().with_overrides(&self.session_headers)
    }

    /// Configuration directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `$KURIIRI_CONFIG_DIR`, else the platform configuration directory
pub fn default_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("kuriiri"))
        .ok_or_else(|| Error::config("cannot determine configuration directory"))
}
