//! Configuration file support for the enricher.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `OPEB_`, e.g., `OPEB_GITHUB_TOKEN`)
//! 2. Local config file (./opeb-enricher.toml)
//! 3. XDG config file (~/.config/opeb-enricher/config.toml)
//! 4. Built-in defaults
//!
//! Sections are keyed by platform kind, with a `default` section providing
//! the fallback request quota:
//!
//! ```toml
//! [default]
//! numreq = 3600          # requests per hour when a platform sets no quota
//!
//! [github]
//! numreq = 5000
//! user = "someone"
//! token = "ghp_..."      # or use the OPEB_GITHUB_TOKEN env var
//!
//! [bitbucket]
//! user = "someone"
//! token = "..."
//!
//! [registry]
//! source_url = "https://openebench.bsc.es/monitor/rest/search"
//! save_path = "/tmp/opeb-payload.json"
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::matcher::DEFAULT_REQUESTS_PER_WINDOW;

/// Malformed or missing configuration. Fatal: surfaced at load time, before
/// any matcher is constructed.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] config::ConfigError);

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback section for values platform sections do not set.
    pub default: DefaultSection,
    /// GitHub section.
    pub github: PlatformSection,
    /// Bitbucket section.
    pub bitbucket: PlatformSection,
    /// Registry payload source settings.
    pub registry: RegistrySection,
}

/// The `default` section: quota fallback shared by all platforms.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultSection {
    /// Requests per hour when the platform section sets no `numreq`.
    pub numreq: u32,
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            numreq: DEFAULT_REQUESTS_PER_WINDOW,
        }
    }
}

/// A per-platform section: request quota plus credentials.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlatformSection {
    /// Requests per hour for this platform.
    pub numreq: Option<u32>,
    /// API user for HTTP Basic authentication.
    pub user: Option<String>,
    /// API token for HTTP Basic authentication.
    pub token: Option<String>,
}

/// The `registry` section: where the OpenEBench payload comes from and goes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Registry endpoint; defaults to the public OpenEBench search URL.
    pub source_url: Option<String>,
    /// Read the payload from this local file instead of the network.
    pub load_path: Option<PathBuf>,
    /// Persist the raw payload bytes here before parsing.
    pub save_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from layered sources.
    ///
    /// Sources are merged in order (later sources override earlier):
    /// built-in defaults, the XDG config file, `./opeb-enricher.toml`, then
    /// `OPEB_`-prefixed environment variables. Malformed configuration is a
    /// fatal [`ConfigError`].
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "opeb-enricher") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("opeb-enricher.toml");
        if local_config.exists() {
            tracing::debug!("loading config from ./opeb-enricher.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // OPEB_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix("OPEB")
                .separator("_")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize::<Config>()?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Ok(ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Config>()?)
    }

    /// The platform section for `kind`, if this build knows it.
    #[must_use]
    pub fn platform(&self, kind: &str) -> Option<&PlatformSection> {
        match kind {
            "github" => Some(&self.github),
            "bitbucket" => Some(&self.bitbucket),
            _ => None,
        }
    }

    /// Requests-per-hour for `kind`: the platform section's `numreq`,
    /// falling back to the `default` section, falling back to 3600.
    #[must_use]
    pub fn numreq_for(&self, kind: &str) -> u32 {
        self.platform(kind)
            .and_then(|section| section.numreq)
            .unwrap_or(self.default.numreq)
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "opeb-enricher")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_builtin_quota() {
        let config = Config::default();
        assert_eq!(config.default.numreq, DEFAULT_REQUESTS_PER_WINDOW);
        assert!(config.github.token.is_none());
        assert!(config.bitbucket.user.is_none());
        assert!(config.registry.source_url.is_none());
    }

    #[test]
    fn parses_full_toml() {
        let config = Config::from_toml_str(
            r#"
            [default]
            numreq = 1200

            [github]
            numreq = 5000
            user = "someone"
            token = "ghp_test"

            [bitbucket]
            user = "other"
            token = "bb_test"

            [registry]
            source_url = "https://registry.example.org/search"
            load_path = "/tmp/in.json.xz"
            save_path = "/tmp/out.json"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.default.numreq, 1200);
        assert_eq!(config.github.numreq, Some(5000));
        assert_eq!(config.github.user.as_deref(), Some("someone"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
        assert_eq!(config.bitbucket.token.as_deref(), Some("bb_test"));
        assert_eq!(
            config.registry.load_path,
            Some(PathBuf::from("/tmp/in.json.xz"))
        );
    }

    #[test]
    fn numreq_fallback_chain() {
        let config = Config::from_toml_str(
            r#"
            [default]
            numreq = 100

            [github]
            numreq = 50
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.numreq_for("github"), 50);
        assert_eq!(config.numreq_for("bitbucket"), 100);
        // Unknown kinds fall through to the default section too.
        assert_eq!(config.numreq_for("gitlab"), 100);
    }

    #[test]
    fn numreq_falls_back_to_builtin_without_default_section() {
        let config = Config::from_toml_str("").expect("empty config should parse");
        assert_eq!(config.numreq_for("github"), DEFAULT_REQUESTS_PER_WINDOW);
    }

    #[test]
    fn partial_sections_keep_defaults_elsewhere() {
        let config = Config::from_toml_str(
            r#"
            [github]
            token = "ghp_only_token"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.github.token.as_deref(), Some("ghp_only_token"));
        assert!(config.github.user.is_none());
        assert_eq!(config.default.numreq, DEFAULT_REQUESTS_PER_WINDOW);
    }

    #[test]
    fn malformed_toml_is_a_fatal_config_error() {
        let err = Config::from_toml_str("[github\ntoken = 1").expect_err("bad TOML should fail");
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn platform_lookup_by_kind() {
        let config = Config::from_toml_str(
            r#"
            [bitbucket]
            user = "ws-user"
            "#,
        )
        .expect("config should parse");

        assert_eq!(
            config.platform("bitbucket").and_then(|s| s.user.as_deref()),
            Some("ws-user")
        );
        assert!(config.platform("sourceforge").is_none());
    }
}
