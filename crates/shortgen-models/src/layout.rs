//! Layout mode definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Composition mode for the vertical canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Whole frame in a banded 9:16 canvas (watermark / content / subtitle).
    #[default]
    Full,
    /// Stacked view: cropped top region over the letterboxed full frame.
    Split,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Full => "full",
            LayoutMode::Split => "split",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = LayoutModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LayoutMode::Full),
            "split" => Ok(LayoutMode::Split),
            _ => Err(LayoutModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown layout mode: {0}, expected 'full' or 'split'")]
pub struct LayoutModeParseError(String);
