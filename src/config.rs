//! # Criteria Configuration
//!
//! Backend settings that affect how criteria are compiled and executed.
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `CRITERIA_*` environment variables (`CRITERIA_WILDCARD`, `CRITERIA_SINGLE_WILDCARD`,
//!    `CRITERIA_FIND_ONE`)
//!
//! ```toml
//! wildcard = "%"
//! single_wildcard = "_"
//! find_one = "strict"
//! ```

use crate::error::{CriteriaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

const ENV_PREFIX: &str = "CRITERIA";

/// Behaviour of `find_one` when more than one row matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindOnePolicy {
    /// Fail with `NonUniqueResult`
    #[default]
    Strict,
    /// Return the first row in result order
    First,
}

impl FromStr for FindOnePolicy {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(FindOnePolicy::Strict),
            "first" => Ok(FindOnePolicy::First),
            other => Err(CriteriaError::ConfigurationError(format!(
                "Invalid find_one policy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaConfig {
    /// Multi-character LIKE wildcard
    pub wildcard: char,
    /// Single-character LIKE wildcard
    pub single_wildcard: char,
    pub find_one: FindOnePolicy,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            wildcard: '%',
            single_wildcard: '_',
            find_one: FindOnePolicy::Strict,
        }
    }
}

impl CriteriaConfig {
    /// Defaults overridden by `CRITERIA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(wildcard) = lookup("CRITERIA_WILDCARD") {
            config.wildcard = parse_char(&wildcard).map_err(|e| {
                CriteriaError::ConfigurationError(format!("Invalid wildcard: {e}"))
            })?;
        }

        if let Some(single) = lookup("CRITERIA_SINGLE_WILDCARD") {
            config.single_wildcard = parse_char(&single).map_err(|e| {
                CriteriaError::ConfigurationError(format!("Invalid single_wildcard: {e}"))
            })?;
        }

        if let Some(policy) = lookup("CRITERIA_FIND_ONE") {
            config.find_one = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the TOML file at `path` if it exists, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("wildcard", defaults.wildcard.to_string())?
            .set_default("single_wildcard", defaults.single_wildcard.to_string())?
            .set_default("find_one", "strict")?;

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let loaded: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        tracing::debug!(
            wildcard = %loaded.wildcard,
            single_wildcard = %loaded.single_wildcard,
            find_one = ?loaded.find_one,
            "Loaded criteria configuration"
        );
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wildcard == self.single_wildcard {
            return Err(CriteriaError::ConfigurationError(format!(
                "wildcard and single_wildcard must differ, both are '{}'",
                self.wildcard
            )));
        }
        for wildcard in [self.wildcard, self.single_wildcard] {
            if wildcard.is_alphanumeric() || wildcard.is_whitespace() {
                return Err(CriteriaError::ConfigurationError(format!(
                    "'{wildcard}' cannot be used as a wildcard"
                )));
            }
        }
        Ok(())
    }
}

fn parse_char(value: &str) -> std::result::Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("expected a single character, got '{value}'")),
    }
}
