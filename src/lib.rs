pub mod cli;
pub mod codec;
pub mod config;
pub mod profile;

pub use codec::http::{decode, encode};
pub use codec::{CodecRegistry, DecodeOutcome, HttpCodec, ProfileCodec};
pub use config::CodecConfig;
pub use profile::{ConfigType, ProxyProfile};
