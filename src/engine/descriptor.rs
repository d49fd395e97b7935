//! Pin descriptor loading
//!
//! Each engine pins its upstream version in `env.json`:
//!
//! ```json
//! { "COMMIT_TAG": "v1.2.0", "COMMIT_HASH": "abc1234", "COMMIT_TAG_FREEZE": true }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::engine::error::EngineError;

/// File name of the pin descriptor inside an engine directory
pub const DESCRIPTOR_FILE: &str = "env.json";

/// File name of the build script inside an engine directory
pub const BUILD_SCRIPT_FILE: &str = "build.sh";

/// Pinned upstream version of one engine
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EngineDescriptor {
    #[serde(rename = "COMMIT_TAG")]
    pub commit_tag: Option<String>,
    #[serde(rename = "COMMIT_HASH")]
    pub commit_hash: Option<String>,
    #[serde(rename = "COMMIT_TAG_FREEZE", default)]
    pub tag_freeze: bool,
    #[serde(rename = "COMMIT_HASH_FREEZE", default)]
    pub hash_freeze: bool,
}

impl EngineDescriptor {
    /// Loads `env.json` from an engine directory.
    ///
    /// Returns `Ok(None)` when the engine has no descriptor.
    pub fn load(engine_dir: &Path) -> Result<Option<Self>, EngineError> {
        let path = engine_dir.join(DESCRIPTOR_FILE);

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(EngineError::Read { path, source }),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| EngineError::Descriptor { path, source })
    }

    /// Tag to check, unless absent or frozen
    pub fn tag_pin(&self) -> Option<&str> {
        if self.tag_freeze {
            return None;
        }
        non_empty(self.commit_tag.as_deref())
    }

    /// Commit hash to check, unless absent or frozen
    pub fn hash_pin(&self) -> Option<&str> {
        if self.hash_freeze {
            return None;
        }
        non_empty(self.commit_hash.as_deref())
    }

    /// Both axes frozen, or nothing pinned at all
    pub fn is_skipped(&self) -> bool {
        let both_frozen = self.tag_freeze && self.hash_freeze;
        let nothing_pinned = non_empty(self.commit_tag.as_deref()).is_none()
            && non_empty(self.commit_hash.as_deref()).is_none();
        both_frozen || nothing_pinned
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn descriptor(value: serde_json::Value) -> EngineDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_all_fields() {
        let result = descriptor(json!({
            "COMMIT_TAG": "v1.0.0",
            "COMMIT_HASH": "abc1234",
            "COMMIT_TAG_FREEZE": true,
            "COMMIT_HASH_FREEZE": false,
            "EXTRA": "ignored"
        }));

        assert_eq!(
            result,
            EngineDescriptor {
                commit_tag: Some("v1.0.0".to_string()),
                commit_hash: Some("abc1234".to_string()),
                tag_freeze: true,
                hash_freeze: false,
            }
        );
    }

    #[rstest]
    #[case::empty(json!({}), true)]
    #[case::empty_strings(json!({"COMMIT_TAG": "", "COMMIT_HASH": ""}), true)]
    #[case::both_frozen(
        json!({"COMMIT_TAG": "v1", "COMMIT_HASH": "abc", "COMMIT_TAG_FREEZE": true, "COMMIT_HASH_FREEZE": true}),
        true
    )]
    #[case::tag_only(json!({"COMMIT_TAG": "v1"}), false)]
    #[case::hash_only(json!({"COMMIT_HASH": "abc"}), false)]
    #[case::tag_frozen_hash_open(json!({"COMMIT_TAG": "v1", "COMMIT_TAG_FREEZE": true}), false)]
    fn is_skipped_returns_expected(#[case] value: serde_json::Value, #[case] expected: bool) {
        assert_eq!(descriptor(value).is_skipped(), expected);
    }

    #[test]
    fn frozen_tag_is_not_checked() {
        let result = descriptor(json!({
            "COMMIT_TAG": "v1.0.0",
            "COMMIT_HASH": "abc1234",
            "COMMIT_TAG_FREEZE": true
        }));

        assert_eq!(result.tag_pin(), None);
        assert_eq!(result.hash_pin(), Some("abc1234"));
    }

    #[test]
    fn frozen_hash_is_not_checked() {
        let result = descriptor(json!({
            "COMMIT_TAG": "v1.0.0",
            "COMMIT_HASH": "abc1234",
            "COMMIT_HASH_FREEZE": true
        }));

        assert_eq!(result.tag_pin(), Some("v1.0.0"));
        assert_eq!(result.hash_pin(), None);
    }

    #[test]
    fn load_returns_none_without_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(EngineDescriptor::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn load_reads_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), r#"{"COMMIT_TAG": "1.2"}"#).unwrap();

        let result = EngineDescriptor::load(dir.path()).unwrap().unwrap();

        assert_eq!(result.commit_tag.as_deref(), Some("1.2"));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), "{ not json").unwrap();

        assert!(matches!(
            EngineDescriptor::load(dir.path()),
            Err(EngineError::Descriptor { .. })
        ));
    }
}
