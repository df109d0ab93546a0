//! Profile codecs
//!
//! A codec converts one URI based proxy format to and from [`ProxyProfile`].
//! The [`CodecRegistry`] tries each registered codec in order against an
//! unknown input, the first codec that recognises the format wins.

pub mod http;

pub use http::HttpCodec;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{debug, trace, warn};

use crate::config::CodecConfig;
use crate::profile::{ConfigType, ProxyProfile};

// ============================================================================
// Decode Outcome
// ============================================================================

/// Result of offering an input string to a codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The input is not in this codec's format
    NotApplicable,
    /// The input looked like this format but could not be parsed
    Malformed(String),
    /// The input was decoded
    Profile(ProxyProfile),
}

impl DecodeOutcome {
    /// Returns the profile, if any
    pub fn into_profile(self) -> Option<ProxyProfile> {
        match self {
            DecodeOutcome::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    /// Returns the parse error message, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Malformed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns false only for [`DecodeOutcome::NotApplicable`]
    pub fn is_applicable(&self) -> bool {
        !matches!(self, DecodeOutcome::NotApplicable)
    }
}

// ============================================================================
// Profile Codec Trait
// ============================================================================

/// A decode/encode pair for one URI based proxy format
pub trait ProfileCodec: Send + Sync {
    /// Name of the format this codec handles (e.g., "http")
    fn scheme(&self) -> &str;

    /// Profile type produced and consumed by this codec
    fn config_type(&self) -> ConfigType;

    /// Cheap format check run before any structural parsing
    fn can_decode(&self, input: &str) -> bool;

    /// Parses an input already accepted by [`ProfileCodec::can_decode`]
    fn parse(&self, input: &str) -> Result<ProxyProfile>;

    /// Serializes a profile back into a URI
    fn to_uri(&self, profile: &ProxyProfile) -> Result<String>;

    /// Offers an input to this codec
    fn decode(&self, input: &str) -> DecodeOutcome {
        if !self.can_decode(input) {
            return DecodeOutcome::NotApplicable;
        }
        match self.parse(input) {
            Ok(profile) => DecodeOutcome::Profile(profile),
            Err(e) => DecodeOutcome::Malformed(format!("{:#}", e)),
        }
    }

    /// Serializes an optional profile, `None` in gives `None` out
    fn encode(&self, profile: Option<&ProxyProfile>) -> Result<Option<String>> {
        profile.map(|p| self.to_uri(p)).transpose()
    }
}

// ============================================================================
// Codec Registry
// ============================================================================

/// Ordered set of codecs tried in turn against unknown inputs
#[derive(Default)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn ProfileCodec>>,
}

impl CodecRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Creates a registry with all built-in codecs using default settings
    pub fn with_builtin_codecs() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Creates a registry with all built-in codecs using the given settings
    pub fn with_config(config: CodecConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HttpCodec::new(config)));
        registry
    }

    /// Appends a codec, codecs are tried in registration order
    pub fn register(&mut self, codec: Arc<dyn ProfileCodec>) {
        self.codecs.push(codec);
    }

    /// Gets the first codec registered under a scheme name
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn ProfileCodec>> {
        self.codecs.iter().find(|c| c.scheme() == scheme)
    }

    /// Number of registered codecs
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns true if no codec is registered
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Decodes an input with the first codec that recognises it
    pub fn decode(&self, input: &str) -> DecodeOutcome {
        for codec in &self.codecs {
            let outcome = codec.decode(input);
            match &outcome {
                DecodeOutcome::NotApplicable => {
                    trace!("Codec '{}' does not apply", codec.scheme());
                    continue;
                }
                DecodeOutcome::Profile(profile) => {
                    debug!(
                        "Successfully decoded {} URI -> profile '{}'",
                        codec.scheme(),
                        profile.remarks
                    );
                }
                DecodeOutcome::Malformed(msg) => {
                    debug!("Failed to decode {} URI: {}", codec.scheme(), msg);
                }
            }
            return outcome;
        }
        DecodeOutcome::NotApplicable
    }

    /// Decodes multiple inputs from content (one per line)
    pub fn decode_list(&self, content: &str) -> Vec<DecodeOutcome> {
        let lines: Vec<&str> = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        debug!("Decoding {} URI lines from content", lines.len());

        lines.into_iter().map(|line| self.decode(line)).collect()
    }

    /// Decodes multiple inputs, collecting only successful results
    pub fn decode_list_lossy(&self, content: &str) -> Vec<ProxyProfile> {
        let results = self.decode_list(content);
        let total = results.len();

        let profiles: Vec<ProxyProfile> = results
            .into_iter()
            .filter_map(|outcome| match outcome {
                DecodeOutcome::Profile(profile) => Some(profile),
                DecodeOutcome::Malformed(msg) => {
                    warn!("Failed to decode URI: {}", msg);
                    None
                }
                DecodeOutcome::NotApplicable => None,
            })
            .collect();

        debug!(
            "URI list decoding complete: {} total, {} successful, {} skipped",
            total,
            profiles.len(),
            total - profiles.len()
        );

        profiles
    }

    /// Encodes a profile with the codec registered for its type
    pub fn encode(&self, profile: &ProxyProfile) -> Result<String> {
        let codec = self
            .codecs
            .iter()
            .find(|c| c.config_type() == profile.config_type)
            .ok_or_else(|| anyhow!("No codec registered for {} profiles", profile.config_type))?;
        codec.to_uri(profile)
    }
}
