use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence lifetime class of a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Survives for as long as the plugin stays installed.
    #[default]
    Extension,
    /// Saved with the currently open project.
    Project,
    /// Memory only; never read from or written to a backend.
    Transient,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Extension, Scope::Project, Scope::Transient];

    pub fn is_persistent(self) -> bool {
        !matches!(self, Scope::Transient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Extension => "extension",
            Scope::Project => "project",
            Scope::Transient => "transient",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scope '{0}' (expected extension, project or transient)")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| raw.trim().eq_ignore_ascii_case(scope.as_str()))
            .ok_or_else(|| UnknownScope(raw.to_string()))
    }
}
