//! Codec configuration
//!
//! Default ports and the subscription markers used to tell subscription
//! endpoints apart from single proxy URIs. Loaded from TOML, every field is
//! optional.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Port used for `http://` URIs without an explicit port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Port used for `https://` URIs without an explicit port
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Substrings marking a subscription endpoint, matched case-insensitively
pub const DEFAULT_SUBSCRIPTION_MARKERS: [&str; 2] = ["/sub", "subscription"];

// ============================================================================
// Codec Config Types
// ============================================================================

/// Configuration shared by the built-in codecs
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Port for `http://` URIs without one, default 8080
    #[serde(default = "default_http_port")]
    pub default_http_port: u16,

    /// Port for `https://` URIs without one, default 443
    #[serde(default = "default_https_port")]
    pub default_https_port: u16,

    /// Inputs containing any of these (ignoring case) are left to other codecs
    #[serde(default = "default_subscription_markers")]
    pub subscription_markers: Vec<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_http_port: default_http_port(),
            default_https_port: default_https_port(),
            subscription_markers: default_subscription_markers(),
        }
    }
}

// ============================================================================
// Codec Config Implementation
// ============================================================================

impl CodecConfig {
    /// Parse codec config from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CodecConfig =
            toml::from_str(content).context("Failed to parse codec config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load codec config from file path, `~` is expanded
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = expand_tilde(path);
        debug!("Loading codec config from: {}", expanded);
        let content = std::fs::read_to_string(Path::new(&expanded))
            .with_context(|| format!("Failed to read codec config from {:?}", expanded))?;
        Self::from_toml(&content)
    }

    /// Checks ports and markers
    pub fn validate(&self) -> Result<()> {
        if self.default_http_port == 0 || self.default_https_port == 0 {
            bail!("Default ports must be in 1-65535");
        }
        if self.subscription_markers.iter().any(|m| m.is_empty()) {
            bail!("Subscription markers must not be empty strings");
        }
        Ok(())
    }

    /// Returns true if the input looks like a subscription endpoint
    pub fn is_subscription_like(&self, input: &str) -> bool {
        let lowered = input.to_lowercase();
        self.subscription_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    }

    /// Default port for a scheme
    pub fn default_port(&self, scheme: &str) -> u16 {
        if scheme.eq_ignore_ascii_case("https") {
            self.default_https_port
        } else {
            self.default_http_port
        }
    }
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_https_port() -> u16 {
    DEFAULT_HTTPS_PORT
}

fn default_subscription_markers() -> Vec<String> {
    DEFAULT_SUBSCRIPTION_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

// ============================================================================
// Path Utilities
// ============================================================================

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Some(home) = dirs_home()
    {
        return path.replacen("~", &home, 1);
    }
    path.to_string()
}

fn dirs_home() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.default_http_port, 8080);
        assert_eq!(config.default_https_port, 443);
        assert_eq!(config.subscription_markers, vec!["/sub", "subscription"]);
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = CodecConfig::from_toml("").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_from_toml_overrides() {
        let toml_str = r#"
            default_http_port = 3128
            subscription_markers = ["/sub", "subscription", "/api/v1/client"]
        "#;
        let config = CodecConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.default_http_port, 3128);
        assert_eq!(config.default_https_port, 443);
        assert_eq!(config.subscription_markers.len(), 3);
    }

    #[test]
    fn test_from_toml_rejects_zero_port() {
        assert!(CodecConfig::from_toml("default_https_port = 0").is_err());
    }

    #[test]
    fn test_from_toml_rejects_empty_marker() {
        assert!(CodecConfig::from_toml(r#"subscription_markers = [""]"#).is_err());
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(CodecConfig::from_toml("default_http_port = \"abc\"").is_err());
        assert!(CodecConfig::from_toml("default_http_port = 70000").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(CodecConfig::from_file("/nonexistent/codec.toml").is_err());
    }

    #[test]
    fn test_is_subscription_like() {
        let config = CodecConfig::default();
        assert!(config.is_subscription_like("https://example.com/sub/abc"));
        assert!(config.is_subscription_like("https://example.com/SUB?token=1"));
        assert!(config.is_subscription_like("http://my-Subscription-host.com:80"));
        assert!(!config.is_subscription_like("http://proxy.example.com:8080"));
    }

    #[test]
    fn test_default_port() {
        let config = CodecConfig::default();
        assert_eq!(config.default_port("https"), 443);
        assert_eq!(config.default_port("HTTPS"), 443);
        assert_eq!(config.default_port("http"), 8080);
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/etc/codec.toml"), "/etc/codec.toml");
        assert_eq!(expand_tilde("relative/~/path"), "relative/~/path");
    }
}
