//! `Extras`: caller-provided operation metadata, forwarded verbatim to hook
//! callbacks except for `commit_ids`, which the engine fills in itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which hook categories are enabled for the current operation. Mirrors the
/// `extras.hooks` list from the wire protocol: a hook whose category is not
/// present here is skipped without invoking any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookCategory {
    Pull,
    Push,
    RepoSize,
}

impl HookCategory {
    fn wire_name(&self) -> &'static str {
        match self {
            HookCategory::Pull => "pull",
            HookCategory::Push => "push",
            HookCategory::RepoSize => "repo_size",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extras {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub scm: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub hooks_uri: Option<String>,
    #[serde(default)]
    pub hooks_protocol: Option<String>,
    #[serde(default)]
    pub hooks_module: Option<String>,
    /// Enabled hook categories, by their wire name (`pull`, `push`,
    /// `repo_size`).
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub locked_by: Option<String>,
    #[serde(default)]
    pub make_lock: Option<bool>,
    /// Set only by Git's post-receive wrapper before `post_push` runs.
    #[serde(default)]
    pub commit_ids: Vec<String>,
    /// Escape hatch for upstream-app-specific keys this struct doesn't
    /// model by name, so forwarding to a hook transport never silently
    /// drops a caller field.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given hook category is enabled for this operation.
    pub fn hook_enabled(&self, category: HookCategory) -> bool {
        self.hooks.iter().any(|h| h == category.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_enabled_checks_category_membership() {
        let extras = Extras {
            hooks: vec!["push".to_string(), "repo_size".to_string()],
            ..Default::default()
        };

        assert!(extras.hook_enabled(HookCategory::Push));
        assert!(extras.hook_enabled(HookCategory::RepoSize));
        assert!(!extras.hook_enabled(HookCategory::Pull));
    }

    #[test]
    fn unknown_fields_land_in_the_escape_hatch() {
        let json = serde_json::json!({
            "username": "alice",
            "some_upstream_specific_key": 42
        });

        let extras: Extras = serde_json::from_value(json).unwrap();
        assert_eq!(extras.username.as_deref(), Some("alice"));
        assert_eq!(
            extras.extra.get("some_upstream_specific_key"),
            Some(&Value::from(42))
        );
    }
}
