use serde::{Deserialize, Serialize};

/// Configuration from checklist.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistConfig {
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub sort: SortPolicy,
    /// Maximum number of changes kept for undo
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            sort: SortPolicy::default(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    500
}

/// How rows are arranged for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortPolicy {
    /// Structural order only
    #[default]
    #[serde(rename = "plain")]
    Plain,
    /// Unchecked blocks first, children pinned to their parent
    #[serde(rename = "checked")]
    CheckedGrouping,
}

impl SortPolicy {
    pub fn parse(s: &str) -> Option<SortPolicy> {
        match s {
            "plain" => Some(SortPolicy::Plain),
            "checked" => Some(SortPolicy::CheckedGrouping),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortPolicy::Plain => "plain",
            SortPolicy::CheckedGrouping => "checked",
        }
    }
}
