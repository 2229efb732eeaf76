//! Model catalog: short, human-facing keys mapped to OpenRouter model ids.
//!
//! The analysis and enhancement flows were historically served from two
//! different tables. They stay separate here, keyed by [`UseCase`], and their
//! defaults are not merged:
//!
//! | use case    | default key when omitted | fallback on unknown key |
//! |-------------|--------------------------|-------------------------|
//! | analysis    | `llama-3.1-8b`           | `llama-3.1-8b`          |
//! | enhancement | `claude-instant`         | `llama-3.1-8b`          |
//!
//! `claude-instant` is not in the enhancement table, so an enhancement request
//! that omits `model` always resolves through the fallback.

use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Key used when a catalog lookup misses, for every use case.
pub const FALLBACK_KEY: &str = "llama-3.1-8b";

/// Marker OpenRouter appends to ids of free-tier models.
pub const FREE_TIER_SUFFIX: &str = ":free";

const ANALYSIS_MODELS: &[(&str, &str)] = &[
    ("llama-3.1-8b", "meta-llama/llama-3.1-8b-instruct:free"),
    ("mistral-7b", "mistralai/mistral-7b-instruct:free"),
    ("gemma-2b", "google/gemma-2b-it:free"),
    ("phi-3-mini", "microsoft/phi-3-mini-4k-instruct:free"),
    ("claude-instant", "anthropic/claude-instant-1:free"),
    ("llama-2-7b", "meta-llama/llama-2-7b-chat:free"),
];

const ENHANCEMENT_MODELS: &[(&str, &str)] = &[
    ("llama-3.1-8b", "meta-llama/llama-3.1-8b-instruct:free"),
    ("mistral-7b", "mistralai/mistral-7b-instruct:free"),
    ("qwen-3-14b", "qwen/qwen3-14b:free"),
    ("qwen-3-4b", "qwen/qwen3-4b:free"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Analysis,
    Enhancement,
}

impl UseCase {
    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            UseCase::Analysis => ANALYSIS_MODELS,
            UseCase::Enhancement => ENHANCEMENT_MODELS,
        }
    }

    /// Key assumed when the request does not name a model.
    pub fn default_key(self) -> &'static str {
        match self {
            UseCase::Analysis => "llama-3.1-8b",
            UseCase::Enhancement => "claude-instant",
        }
    }

    /// Picks the request's key, or the use case default when it is absent or blank.
    pub fn requested_key(self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(self.default_key())
            .to_string()
    }

    fn lookup(self, key: &str) -> Option<&'static str> {
        self.entries()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, id)| *id)
    }

    /// Resolves a key to a provider id. Unknown keys never fail: they fall back
    /// to [`FALLBACK_KEY`].
    pub fn resolve(self, key: &str) -> ResolvedModel {
        match self.lookup(key) {
            Some(provider_id) => ResolvedModel {
                key: key.to_string(),
                provider_id,
                fell_back: false,
            },
            None => {
                debug!("Unknown {:?} model key {:?}, using {}", self, key, FALLBACK_KEY);
                ResolvedModel {
                    key: key.to_string(),
                    provider_id: self.lookup(FALLBACK_KEY).unwrap_or(FALLBACK_PROVIDER_ID),
                    fell_back: true,
                }
            }
        }
    }
}

const FALLBACK_PROVIDER_ID: &str = "meta-llama/llama-3.1-8b-instruct:free";

/// Outcome of a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// The key the caller asked for, echoed back in responses.
    pub key: String,
    pub provider_id: &'static str,
    pub fell_back: bool,
}

impl fmt::Display for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.provider_id)?;
        if self.fell_back {
            f.write_str(" [fallback]")?;
        }
        Ok(())
    }
}

/// True when `id` is free-tier or named by either catalog.
pub fn is_listed(id: &str) -> bool {
    id.ends_with(FREE_TIER_SUFFIX)
        || ANALYSIS_MODELS
            .iter()
            .chain(ENHANCEMENT_MODELS)
            .any(|(_, provider_id)| *provider_id == id)
}
