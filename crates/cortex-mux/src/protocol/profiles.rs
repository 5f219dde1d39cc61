//! Profile-related request and response types.

use serde::{Deserialize, Serialize};

/// A training profile as reported by `queryProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Profile UUID.
    pub uuid: String,

    /// Profile name.
    pub name: String,

    /// Whether the profile is read-only.
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,

    /// Unknown/extra fields from newer Cortex builds.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `getCurrentProfile` response.
///
/// `name` is `None` when no profile is loaded for the headset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentProfileInfo {
    /// Name of the loaded profile, if any.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the profile was loaded by this application. A profile
    /// loaded by another app must not be unloaded from here.
    #[serde(rename = "loadedByThisApp", default)]
    pub loaded_by_this_app: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Action for the `setupProfile` method's `status` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    Create,
    Load,
    Unload,
    Save,
}

impl ProfileAction {
    /// Wire value for the `status` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileAction::Create => "create",
            ProfileAction::Load => "load",
            ProfileAction::Unload => "unload",
            ProfileAction::Save => "save",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_action_wire_values() {
        assert_eq!(ProfileAction::Create.as_str(), "create");
        assert_eq!(ProfileAction::Load.as_str(), "load");
        assert_eq!(ProfileAction::Unload.as_str(), "unload");
        assert_eq!(ProfileAction::Save.as_str(), "save");
    }

    #[test]
    fn test_current_profile_deserialize() {
        let raw = r#"{"name": "alice", "loadedByThisApp": true}"#;
        let info: CurrentProfileInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.name.as_deref(), Some("alice"));
        assert!(info.loaded_by_this_app);
    }

    #[test]
    fn test_current_profile_empty() {
        let raw = r#"{"name": null}"#;
        let info: CurrentProfileInfo = serde_json::from_str(raw).unwrap();
        assert!(info.name.is_none());
        assert!(!info.loaded_by_this_app);
    }

    #[test]
    fn test_profile_info_tolerates_extra_fields() {
        let raw = r#"{"uuid": "u-1", "name": "alice", "readOnly": false, "eegChannels": 14}"#;
        let info: ProfileInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.name, "alice");
        assert!(info.extra.contains_key("eegChannels"));
    }
}
