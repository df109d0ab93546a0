//! Proxy profile model
//!
//! The record every codec reads from and writes into. Only the fields that URI
//! based formats touch are modelled here.

use serde::{Deserialize, Serialize};

/// Value of `stream_security` for TLS-wrapped connections
pub const STREAM_SECURITY_TLS: &str = "tls";

/// Value of `security` when basic credentials are present
pub const SECURITY_BASIC: &str = "basic";

/// Proxy protocol of a profile
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    #[default]
    Http,
    Socks,
    Shadowsocks,
    VMess,
    VLess,
    Trojan,
}

impl std::fmt::Display for ConfigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigType::Http => write!(f, "HTTP"),
            ConfigType::Socks => write!(f, "SOCKS"),
            ConfigType::Shadowsocks => write!(f, "Shadowsocks"),
            ConfigType::VMess => write!(f, "VMess"),
            ConfigType::VLess => write!(f, "VLESS"),
            ConfigType::Trojan => write!(f, "Trojan"),
        }
    }
}

/// Connection parameters of a single proxy server
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyProfile {
    /// Protocol this profile speaks
    pub config_type: ConfigType,

    /// Server host, domain or IP literal (IPv6 keeps its brackets)
    pub address: String,

    /// Server port, never 0
    pub port: u16,

    /// Human readable label
    #[serde(default)]
    pub remarks: String,

    /// Transport security, `"tls"` or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_security: Option<String>,

    /// TLS server name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    /// Authentication scheme, `"basic"` when credentials are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,

    /// User identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Secret paired with `username` (password for HTTP and SOCKS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_credential: Option<String>,
}

impl ProxyProfile {
    /// Creates a profile with the required fields set
    pub fn new(config_type: ConfigType, address: &str, port: u16) -> Self {
        Self {
            config_type,
            address: address.to_string(),
            port,
            ..Default::default()
        }
    }

    /// Returns true when the profile carries a TLS stream security setting
    pub fn is_tls(&self) -> bool {
        self.stream_security.as_deref() == Some(STREAM_SECURITY_TLS)
    }
}
