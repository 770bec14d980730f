use anyhow::{Context, Result};
use tracing::debug;

use crate::constants::WireVersion;

pub const TRACK_DATA_TYPES_ENV: &str = "CODEC_TRACK_DATA_TYPES";

/// Settings shared by every writer a process creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub wire_version: WireVersion,
    /// Record a type tag per primitive write so the layout can be fingerprinted.
    pub track_data_types: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            wire_version: WireVersion::CURRENT,
            track_data_types: false,
        }
    }
}

impl CodecConfig {
    /// Loads `.env` if present, then reads `CODEC_TRACK_DATA_TYPES`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(raw) = std::env::var(TRACK_DATA_TYPES_ENV) {
            config.track_data_types = parse_flag(&raw)
                .with_context(|| format!("Invalid {} value: '{}'", TRACK_DATA_TYPES_ENV, raw))?;
        }

        debug!(?config, "codec config loaded");
        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean flag, got '{}'", other),
    }
}
