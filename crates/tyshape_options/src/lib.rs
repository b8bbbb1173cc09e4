//! tyshape_options: Checker configuration.
//!
//! Options are read from a JSON object with camelCase keys. Every field is
//! optional; the accessor methods apply the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_MAX_RELATION_DEPTH: u32 = 100;
const DEFAULT_MAX_TYPE_DISPLAY_DEPTH: u32 = 20;

/// How parameter types are compared when relating two function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterVariance {
    /// Target parameters must be assignable to source parameters.
    Contravariant,
    /// Either direction is accepted.
    Bivariant,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckerOptions {
    /// Compare function parameters contravariantly. Defaults to `true`.
    pub strict_function_types: Option<bool>,
    /// Recursion bound for the assignability relation.
    pub max_relation_depth: Option<u32>,
    /// Nesting bound when rendering types into messages.
    pub max_type_display_depth: Option<u32>,
}

impl CheckerOptions {
    pub fn parameter_variance(&self) -> ParameterVariance {
        if self.strict_function_types.unwrap_or(true) {
            ParameterVariance::Contravariant
        } else {
            ParameterVariance::Bivariant
        }
    }

    pub fn max_relation_depth(&self) -> u32 {
        self.max_relation_depth.unwrap_or(DEFAULT_MAX_RELATION_DEPTH)
    }

    pub fn max_type_display_depth(&self) -> u32 {
        self.max_type_display_depth
            .unwrap_or(DEFAULT_MAX_TYPE_DISPLAY_DEPTH)
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid checker options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` must be at least 1")]
    ZeroLimit { field: &'static str },

    #[error("cannot read checker options: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse options from a JSON string.
pub fn parse_options(content: &str) -> Result<CheckerOptions, OptionsError> {
    let options: CheckerOptions = serde_json::from_str(content)?;
    if options.max_relation_depth == Some(0) {
        return Err(OptionsError::ZeroLimit {
            field: "maxRelationDepth",
        });
    }
    if options.max_type_display_depth == Some(0) {
        return Err(OptionsError::ZeroLimit {
            field: "maxTypeDisplayDepth",
        });
    }
    Ok(options)
}

/// Parse options from a JSON file.
pub fn parse_options_file(path: &std::path::Path) -> Result<CheckerOptions, OptionsError> {
    let content = std::fs::read_to_string(path)?;
    parse_options(&content)
}
