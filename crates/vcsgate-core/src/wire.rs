//! The `Wire` descriptor: the sole shared input of every backend method.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single `(section, option, value)` config override, applied on top of
/// whatever the backend would otherwise read from disk (`.git/config`,
/// `hgrc`, `svn` runtime config).
pub type ConfigEntry = (String, String, String);

/// Per-call descriptor carrying the repository path, ad-hoc config
/// overrides, and an optional caller-scoped context used to share a repo
/// handle across calls. See [`crate::context::ContextId`] for the identifier
/// type and the context cache for how `context`/`cache` are honored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    pub path: PathBuf,
    #[serde(default)]
    pub config: Vec<ConfigEntry>,
    #[serde(default)]
    pub context: Option<Uuid>,
    #[serde(default)]
    pub cache: bool,
}

impl Wire {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Vec::new(),
            context: None,
            cache: false,
        }
    }

    pub fn with_context(mut self, context: Uuid) -> Self {
        self.context = Some(context);
        self.cache = true;
        self
    }

    pub fn with_config(mut self, config: Vec<ConfigEntry>) -> Self {
        self.config = config;
        self
    }

    /// Whether a repeated call with this wire should reuse a cached handle.
    pub fn wants_cache(&self) -> bool {
        self.context.is_some() && self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wants_cache_requires_both_context_and_flag() {
        let w = Wire::new("/repo");
        assert!(!w.wants_cache());

        let w = Wire::new("/repo").with_config(vec![]);
        assert!(!w.wants_cache());

        let ctx = Uuid::new_v4();
        let w = Wire::new("/repo").with_context(ctx);
        assert!(w.wants_cache());

        let mut w = Wire::new("/repo");
        w.context = Some(ctx);
        w.cache = false;
        assert!(!w.wants_cache());
    }
}
