use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};

use crate::codec::{CodecRegistry, DecodeOutcome};
use crate::config::{CodecConfig, expand_tilde};
use crate::profile::ProxyProfile;

#[derive(Parser)]
#[command(version, about = "Convert HTTP/HTTPS proxy URIs to and from proxy profiles", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Codec config TOML path")]
    pub config: Option<String>,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode proxy URIs into JSON profiles
    Decode {
        #[arg(help = "Proxy URIs, read from stdin (one per line) when omitted")]
        uris: Vec<String>,
    },
    /// Encode JSON profiles into proxy URIs
    Encode {
        #[arg(help = "JSON file with one profile or an array, stdin when omitted")]
        input: Option<String>,
    },
}

/// One profile or a list of profiles
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileInput {
    One(ProxyProfile),
    Many(Vec<ProxyProfile>),
}

pub fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };
    let registry = CodecRegistry::with_config(config);

    match args.command {
        Command::Decode { uris } => {
            let content = if uris.is_empty() {
                read_stdin()?
            } else {
                uris.join("\n")
            };
            let (profiles, failed) = decode_content(&registry, &content);
            for profile in &profiles {
                println!(
                    "{}",
                    serde_json::to_string_pretty(profile).context("Failed to serialize profile")?
                );
            }
            info!("Decoded {} profile(s)", profiles.len());
            if failed > 0 {
                bail!("{} input(s) could not be decoded", failed);
            }
        }
        Command::Encode { input } => {
            let content = match input {
                Some(path) => {
                    let expanded = expand_tilde(&path);
                    std::fs::read_to_string(&expanded)
                        .with_context(|| format!("Failed to read profiles from {:?}", expanded))?
                }
                None => read_stdin()?,
            };
            for uri in encode_content(&registry, &content)? {
                println!("{}", uri);
            }
        }
    }

    Ok(())
}

/// Decodes every line, returning the profiles and the number of failed lines
pub fn decode_content(registry: &CodecRegistry, content: &str) -> (Vec<ProxyProfile>, usize) {
    let mut profiles = Vec::new();
    let mut failed = 0;

    for outcome in registry.decode_list(content) {
        match outcome {
            DecodeOutcome::Profile(profile) => profiles.push(profile),
            DecodeOutcome::Malformed(msg) => {
                warn!("Malformed proxy URI: {}", msg);
                failed += 1;
            }
            DecodeOutcome::NotApplicable => {
                warn!("Input is not a supported proxy URI");
                failed += 1;
            }
        }
    }

    (profiles, failed)
}

/// Parses one profile or a JSON array of profiles and encodes each
pub fn encode_content(registry: &CodecRegistry, content: &str) -> Result<Vec<String>> {
    let input: ProfileInput =
        serde_json::from_str(content).context("Failed to parse profile JSON")?;
    let profiles = match input {
        ProfileInput::One(profile) => vec![profile],
        ProfileInput::Many(profiles) => profiles,
    };

    profiles
        .iter()
        .map(|profile| {
            registry
                .encode(profile)
                .with_context(|| format!("Failed to encode profile '{}'", profile.remarks))
        })
        .collect()
}

fn read_stdin() -> Result<String> {
    std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")
}
