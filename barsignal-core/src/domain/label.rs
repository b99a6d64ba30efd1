//! Trade-direction label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Discrete trade direction assigned to a bar.
///
/// Numeric codes follow the usual convention: BUY = +1, SELL = -1, HOLD = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Sell,
    Hold,
    Buy,
}

impl Label {
    /// All labels in ascending code order.
    pub const ALL: [Label; 3] = [Label::Sell, Label::Hold, Label::Buy];

    pub fn code(self) -> i8 {
        match self {
            Label::Buy => 1,
            Label::Sell => -1,
            Label::Hold => 0,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Label::Buy),
            -1 => Some(Label::Sell),
            0 => Some(Label::Hold),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Buy => "BUY",
            Label::Sell => "SELL",
            Label::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal label '{0}' (expected BUY, SELL or HOLD)")]
pub struct LabelParseError(pub String);

impl FromStr for Label {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Label::Buy),
            "SELL" => Ok(Label::Sell),
            "HOLD" => Ok(Label::Hold),
            _ => Err(LabelParseError(s.to_string())),
        }
    }
}
