//! Per-parse configuration.
//!
//! The strict flag is the only option that changes build semantics: it
//! decides whether an attribute nobody handles aborts the parse or is
//! logged and skipped.

use log::warn;

/// Environment variable read by [`BuildConfig::from_env`].
pub const STRICT_ENV: &str = "TRELLIS_STRICT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    /// Unknown attributes are fatal when `true`, ignored with a warning when `false`.
    pub strict: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl BuildConfig {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Defaults, overridden by `TRELLIS_STRICT` when it holds a recognizable flag.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(STRICT_ENV) {
            match parse_flag(&raw) {
                Some(strict) => config.strict = strict,
                None => warn!("ignoring {}={:?}: expected true/false/1/0", STRICT_ENV, raw),
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
