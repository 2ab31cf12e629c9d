//! Configuration for assertion policy and diagnostics.

use crate::error::{Result, ToastError};
use crate::location::{
    CallerLocator, LocationProvider, NoLocation, TestFileLocator, DEFAULT_TEST_PATTERNS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up by [`Config::load`].
pub const CONFIG_FILE: &str = "toast.toml";

/// Environment variable overriding [`Config::fail_fast`].
pub const ENV_FAIL_FAST: &str = "TOAST_FAIL_FAST";

/// Environment variable overriding [`Config::locator`].
pub const ENV_LOCATION: &str = "TOAST_LOCATION";

/// Settings shared by the decorator and the free functions.
///
/// The default is the simple surface: fail fast, prefix messages with the
/// caller's location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Abort the test right after recording a failure (default: true).
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,

    /// How diagnostic locations are resolved.
    #[serde(default)]
    pub locator: LocatorConfig,
}

fn default_fail_fast() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_fast: default_fail_fast(),
            locator: LocatorConfig::default(),
        }
    }
}

/// Location strategy, as written in `toast.toml`.
///
/// ```toml
/// [locator]
/// kind = "test-file"
/// patterns = ["tests", "_test.rs"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LocatorConfig {
    /// Always the immediate caller.
    #[default]
    Caller,
    /// Only callers in files matching `patterns`.
    TestFile {
        #[serde(default = "default_patterns")]
        patterns: Vec<String>,
    },
    /// No location prefix.
    Disabled,
}

fn default_patterns() -> Vec<String> {
    DEFAULT_TEST_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl LocatorConfig {
    /// Build the provider this setting describes.
    pub fn build(&self) -> Box<dyn LocationProvider> {
        match self {
            Self::Caller => Box::new(CallerLocator),
            Self::TestFile { patterns } => Box::new(TestFileLocator::new(patterns.iter().cloned())),
            Self::Disabled => Box::new(NoLocation),
        }
    }
}

impl Config {
    /// Load configuration from `dir/toast.toml`, or defaults if absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| ToastError::Config(format!("failed to read config: {}", e)))?;
        toml::from_str(&content).map_err(|e| ToastError::InvalidConfig {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to `dir/toast.toml`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| ToastError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| ToastError::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Config::default().apply_env()
    }

    /// Layer `TOAST_FAIL_FAST` and `TOAST_LOCATION` over `self`.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(
            std::env::var(ENV_FAIL_FAST).ok().as_deref(),
            std::env::var(ENV_LOCATION).ok().as_deref(),
        )
    }

    fn apply_overrides(mut self, fail_fast: Option<&str>, location: Option<&str>) -> Result<Self> {
        if let Some(raw) = fail_fast {
            self.fail_fast = parse_flag(ENV_FAIL_FAST, raw)?;
        }
        if let Some(raw) = location {
            self.locator = match raw.trim().to_ascii_lowercase().as_str() {
                "caller" => LocatorConfig::Caller,
                "test-file" => LocatorConfig::TestFile {
                    patterns: default_patterns(),
                },
                "off" | "none" => LocatorConfig::Disabled,
                _ => {
                    return Err(ToastError::InvalidEnv {
                        key: ENV_LOCATION.to_string(),
                        value: raw.to_string(),
                    })
                }
            };
        }
        Ok(self)
    }

    /// Location provider described by [`Config::locator`].
    pub fn location_provider(&self) -> Box<dyn LocationProvider> {
        self.locator.build()
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ToastError::InvalidEnv {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
