use serde::{Deserialize, Serialize};

use crate::{domain::Scope, error::ErrorReport};

/// One persisted entry as seen by inspection tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub key: String,
    pub scope: Scope,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ToolResponse {
    Value {
        key: String,
        scope: Scope,
        value: Option<serde_json::Value>,
    },
    Updated {
        key: String,
        scope: Scope,
    },
    Entries(Vec<PreferenceEntry>),
    History {
        key: String,
        newest_first: Vec<String>,
    },
    Error(ErrorReport),
}
