//! HTTP/HTTPS proxy codec
//!
//! This module converts `http://` and `https://` proxy URIs to and from profiles.
//! Format: http[s]://[username[:password]@]host[:port]
//!
//! Subscription endpoints share the same schemes. Any input containing a
//! subscription marker (`/sub`, `subscription`, ignoring case) is rejected
//! before parsing so that the next codec in the registry gets a chance at it.

use anyhow::{Result, anyhow, bail};
use tracing::trace;
use url::Url;

use crate::config::CodecConfig;
use crate::profile::{ConfigType, ProxyProfile, SECURITY_BASIC, STREAM_SECURITY_TLS};

use super::{DecodeOutcome, ProfileCodec};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

// ============================================================================
// HTTP Codec
// ============================================================================

/// Codec for HTTP (http://) and HTTPS (https://) proxy URIs
///
/// Format: http[s]://[username[:password]@]host[:port]
#[derive(Debug, Clone, Default)]
pub struct HttpCodec {
    config: CodecConfig,
}

impl HttpCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl ProfileCodec for HttpCodec {
    fn scheme(&self) -> &str {
        "http"
    }

    fn config_type(&self) -> ConfigType {
        ConfigType::Http
    }

    fn can_decode(&self, input: &str) -> bool {
        if input.is_empty()
            || !(input.starts_with(HTTP_PREFIX) || input.starts_with(HTTPS_PREFIX))
        {
            return false;
        }
        if self.config.is_subscription_like(input) {
            trace!("Input looks like a subscription endpoint, skipping");
            return false;
        }
        true
    }

    fn parse(&self, input: &str) -> Result<ProxyProfile> {
        trace!("Parsing HTTP proxy URI");
        let url = Url::parse(input).map_err(|e| anyhow!("Failed to parse HTTP proxy URI: {}", e))?;

        let scheme = url.scheme();

        let address = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow!("HTTP proxy URI missing host"))?
            .to_string();

        let port = explicit_port(&url, input)
            .filter(|p| *p > 0)
            .unwrap_or_else(|| self.config.default_port(scheme));

        let mut profile = ProxyProfile {
            config_type: ConfigType::Http,
            remarks: format!("{}-{}:{}", scheme.to_uppercase(), address, port),
            address,
            port,
            ..Default::default()
        };

        if scheme.eq_ignore_ascii_case("https") {
            profile.stream_security = Some(STREAM_SECURITY_TLS.to_string());
            profile.sni = Some(profile.address.clone());
        }

        // Read from the raw input, url drops empty userinfo parts
        if let Some(userinfo) = raw_userinfo(input).filter(|u| !u.is_empty()) {
            let (username, password) = match userinfo.split_once(':') {
                Some((username, password)) => (username, Some(password)),
                None => (userinfo, None),
            };
            profile.security = Some(SECURITY_BASIC.to_string());
            profile.username = Some(unescape(username));
            profile.secondary_credential = password.map(unescape);
        }

        trace!("Decoded HTTP proxy profile '{}'", profile.remarks);
        Ok(profile)
    }

    fn to_uri(&self, profile: &ProxyProfile) -> Result<String> {
        if profile.config_type != ConfigType::Http {
            bail!(
                "Cannot encode {} profile as HTTP proxy URI",
                profile.config_type
            );
        }
        if profile.address.is_empty() {
            bail!("HTTP proxy profile missing address");
        }
        if profile.port == 0 {
            bail!("HTTP proxy profile has invalid port 0");
        }

        let mut uri = String::from(if profile.is_tls() {
            HTTPS_PREFIX
        } else {
            HTTP_PREFIX
        });

        if let Some(username) = profile.username.as_deref().filter(|u| !u.is_empty()) {
            uri.push_str(&urlencoding::encode(username));
            if let Some(secret) = profile
                .secondary_credential
                .as_deref()
                .filter(|s| !s.is_empty())
            {
                uri.push(':');
                uri.push_str(&urlencoding::encode(secret));
            }
            uri.push('@');
        }

        uri.push_str(&format!("{}:{}", bracket_ipv6(&profile.address), profile.port));
        Ok(uri)
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Decodes an HTTP/HTTPS proxy URI with default settings
pub fn decode(input: &str) -> DecodeOutcome {
    HttpCodec::default().decode(input)
}

/// Encodes a profile as an HTTP/HTTPS proxy URI with default settings
pub fn encode(profile: Option<&ProxyProfile>) -> Result<Option<String>> {
    HttpCodec::default().encode(profile)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Port written in the input, including one equal to the scheme default
fn explicit_port(url: &Url, input: &str) -> Option<u16> {
    if let Some(port) = url.port() {
        return Some(port);
    }
    // url drops ports equal to the scheme default
    if has_port_in_authority(input) {
        url.port_or_known_default()
    } else {
        None
    }
}

/// Raw authority of the input, delimited the way url delimits special schemes
fn raw_authority(input: &str) -> &str {
    let rest = input.split_once("://").map_or(input, |(_, r)| r);
    rest.split(['/', '\\', '?', '#']).next().unwrap_or("")
}

/// Raw `user[:password]` part of the input, still percent-encoded
fn raw_userinfo(input: &str) -> Option<&str> {
    raw_authority(input).rsplit_once('@').map(|(u, _)| u)
}

/// Checks whether the raw authority ends in `:<digits>`
fn has_port_in_authority(input: &str) -> bool {
    let authority = raw_authority(input);
    let hostport = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    match hostport.rsplit_once(':') {
        Some((host, port)) => {
            !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!host.starts_with('[') || host.ends_with(']'))
        }
        None => false,
    }
}

fn unescape(s: &str) -> String {
    urlencoding::decode(s)
        .unwrap_or_else(|_| s.into())
        .into_owned()
}

/// Wraps a bare IPv6 literal in brackets
fn bracket_ipv6(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{}]", address)
    } else {
        address.to_string()
    }
}
