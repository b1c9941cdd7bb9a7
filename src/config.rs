// src/config.rs

//! Configuration file loading
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. The config file
//! 3. CLI flags (applied by the caller through [`Overrides`])
//!
//! The config file is the first one found of:
//! 1. `--config <path>` (must exist)
//! 2. `$APTLYCTL_CONFIG`
//! 3. `$XDG_CONFIG_HOME/aptlyctl/config.toml`
//! 4. `~/.aptlyctl/config.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! ```toml
//! aptly_bin = "aptly"
//! aptly_config = "/etc/aptly.conf"
//! suffix_format = "%Y%m%d"
//! dry_run = false
//!
//! [publish]
//! architectures = ["amd64", "arm64"]
//! gpg_key = "ABCD1234"
//! skip_signing = false
//! ```

use crate::aptly::ExecMode;
use crate::error::{Error, Result};
use crate::publish::PublishOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "APTLYCTL_CONFIG";

/// `[publish]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub architectures: Option<Vec<String>>,
    pub gpg_key: Option<String>,
    pub skip_signing: Option<bool>,
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// aptly binary to run
    pub aptly_bin: Option<String>,
    /// aptly configuration file, forwarded as `-config=`
    pub aptly_config: Option<PathBuf>,
    /// strftime format for default snapshot suffixes
    pub suffix_format: Option<String>,
    /// Print mutating commands instead of running them
    pub dry_run: Option<bool>,
    pub publish: Option<PublishConfig>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub aptly_bin: Option<String>,
    pub aptly_config: Option<PathBuf>,
    pub dry_run: bool,
}

/// Candidate config locations, resolved from the process environment
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    pub env_config: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl SearchPaths {
    pub fn from_env() -> Self {
        Self {
            env_config: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }

    /// First existing config file, in precedence order
    pub fn locate(&self) -> Option<PathBuf> {
        let candidates = [
            self.env_config.clone(),
            self.xdg_config_home
                .as_ref()
                .map(|p| p.join("aptlyctl/config.toml")),
            self.home.as_ref().map(|p| p.join(".aptlyctl/config.toml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }
}

impl Config {
    /// Load from an explicit path or the standard locations
    pub fn load(explicit: Option<&Path>, search: &SearchPaths) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config {
                        path: path.to_path_buf(),
                        message: "file not found".to_string(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => search.locate(),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Ok((Self::default(), None));
        };

        debug!("Loading config from {}", path.display());
        let config = Self::read(&path)?;
        Ok((config, Some(path)))
    }

    /// Read, parse and validate one config file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(bin) = &self.aptly_bin
            && bin.trim().is_empty()
        {
            return Err("aptly_bin must not be empty".to_string());
        }
        if let Some(format) = &self.suffix_format {
            if !crate::naming::is_valid_suffix_format(format) {
                return Err(format!("suffix_format '{}' is not a valid strftime format", format));
            }
            let sample = crate::naming::today_suffix(format);
            if sample.is_empty() || sample.contains('-') {
                return Err(format!(
                    "suffix_format '{}' must render a non-empty value without hyphens",
                    format
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    pub fn aptly_bin(&self) -> &str {
        self.aptly_bin.as_deref().unwrap_or("aptly")
    }

    pub fn suffix_format(&self) -> &str {
        self.suffix_format
            .as_deref()
            .unwrap_or(crate::naming::DEFAULT_SUFFIX_FORMAT)
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn publish_options(&self) -> PublishOptions {
        let publish = self.publish.clone().unwrap_or_default();
        PublishOptions {
            architectures: publish.architectures.unwrap_or_default(),
            gpg_key: publish.gpg_key,
            skip_signing: publish.skip_signing.unwrap_or(false),
        }
    }

    /// Apply CLI flags over file values
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(bin) = &overrides.aptly_bin {
            self.aptly_bin = Some(bin.clone());
        }
        if let Some(config) = &overrides.aptly_config {
            self.aptly_config = Some(config.clone());
        }
        if overrides.dry_run {
            self.dry_run = Some(true);
        }
    }

    pub fn exec_mode(&self) -> ExecMode {
        if self.dry_run() {
            ExecMode::DryRun
        } else {
            ExecMode::Live
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.aptly_bin(), "aptly");
        assert_eq!(config.suffix_format(), "%Y%m%d");
        assert!(!config.dry_run());
        assert_eq!(config.exec_mode(), ExecMode::Live);
        assert_eq!(config.publish_options(), PublishOptions::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::parse(
            r#"
            aptly_bin = "/usr/local/bin/aptly"
            aptly_config = "/etc/aptly.conf"
            suffix_format = "%Y%m%d%H%M"
            dry_run = true

            [publish]
            architectures = ["amd64", "arm64"]
            gpg_key = "ABCD1234"
            "#,
        )
        .unwrap();
        assert_eq!(config.aptly_bin(), "/usr/local/bin/aptly");
        assert_eq!(config.aptly_config, Some(PathBuf::from("/etc/aptly.conf")));
        assert_eq!(config.exec_mode(), ExecMode::DryRun);
        let options = config.publish_options();
        assert_eq!(options.architectures, vec!["amd64", "arm64"]);
        assert_eq!(options.gpg_key.as_deref(), Some("ABCD1234"));
        assert!(!options.skip_signing);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(Config::parse("unknown = 1").is_err());
        assert!(Config::parse("aptly_bin = \"  \"").is_err());
        assert!(Config::parse("suffix_format = \"%Y-%m-%d\"").is_err());
        assert!(Config::parse("suffix_format = \"%Q\"").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::parse("aptly_bin = \"aptly-old\"\ndry_run = false").unwrap();
        config.apply(&Overrides {
            aptly_bin: Some("aptly-new".to_string()),
            aptly_config: None,
            dry_run: true,
        });
        assert_eq!(config.aptly_bin(), "aptly-new");
        assert!(config.dry_run());
    }

    #[test]
    fn test_locate_precedence() {
        let temp = TempDir::new().unwrap();
        let xdg = temp.path().join("xdg");
        let home = temp.path().join("home");
        fs::create_dir_all(xdg.join("aptlyctl")).unwrap();
        fs::create_dir_all(home.join(".aptlyctl")).unwrap();
        fs::write(home.join(".aptlyctl/config.toml"), "").unwrap();

        let search = SearchPaths {
            env_config: Some(temp.path().join("missing.toml")),
            xdg_config_home: Some(xdg.clone()),
            home: Some(home.clone()),
        };
        assert_eq!(search.locate(), Some(home.join(".aptlyctl/config.toml")));

        fs::write(xdg.join("aptlyctl/config.toml"), "").unwrap();
        assert_eq!(search.locate(), Some(xdg.join("aptlyctl/config.toml")));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("aptlyctl.toml");
        fs::write(&path, "suffix_format = \"%Y%m\"").unwrap();

        let (config, found) = Config::load(Some(&path), &SearchPaths::default()).unwrap();
        assert_eq!(found, Some(path));
        assert_eq!(config.suffix_format(), "%Y%m");

        let missing = Config::load(Some(&temp.path().join("nope.toml")), &SearchPaths::default());
        assert!(matches!(missing, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let (config, found) = Config::load(None, &SearchPaths::default()).unwrap();
        assert!(found.is_none());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_error_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        fs::write(&path, "dry_run = \"maybe\"").unwrap();
        let err = Config::read(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
