//! Reported issues and the output matrix

use serde::Serialize;

use crate::config::HASH_PREFIX_LEN;

/// One outdated pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Issue {
    /// A newer tag exists upstream
    #[serde(rename_all = "camelCase")]
    Tag {
        engine_name: String,
        new_tag: String,
        old_tag: String,
    },
    /// A newer commit exists upstream; hashes are shortened
    #[serde(rename_all = "camelCase")]
    Commit {
        engine_name: String,
        new_hash: String,
        old_hash: String,
    },
}

impl Issue {
    pub fn tag(engine_name: &str, new_tag: &str, old_tag: &str) -> Self {
        Issue::Tag {
            engine_name: engine_name.to_string(),
            new_tag: new_tag.to_string(),
            old_tag: old_tag.to_string(),
        }
    }

    pub fn commit(engine_name: &str, new_hash: &str, old_hash: &str) -> Self {
        Issue::Commit {
            engine_name: engine_name.to_string(),
            new_hash: short_hash(new_hash),
            old_hash: short_hash(old_hash),
        }
    }

    pub fn engine_name(&self) -> &str {
        match self {
            Issue::Tag { engine_name, .. } | Issue::Commit { engine_name, .. } => engine_name,
        }
    }
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(HASH_PREFIX_LEN).collect()
}

/// Audit output: `{"include": [...]}`, or `{}` when nothing is outdated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Issue>,
}

impl Matrix {
    pub fn new(include: Vec<Issue>) -> Self {
        Self { include }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
