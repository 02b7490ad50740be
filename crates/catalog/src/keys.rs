//! Well-known preference keys and their value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const VIEW_MODE_KEY: &str = "halodex-view-mode";
pub const FAVORITES_KEY: &str = "halodex-favorites";
pub const ACTIVE_TAB_KEY: &str = "halodex-active-tab";
pub const NOTES_KEY: &str = "halodex-character-notes";

pub const DEFAULT_ACTIVE_TAB: &str = "characters";

/// Layout of the character collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "grid" => Ok(ViewMode::Grid),
            other => Err(format!("unknown view mode: {other} (expected list or grid)")),
        }
    }
}
