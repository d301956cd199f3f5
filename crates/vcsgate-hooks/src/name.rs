use vcsgate_core::HookCategory;

/// The fixed set of hook names the gateway invokes. Git additionally wraps
/// `PrePull`/`PostPull`/`PrePush`/`PostPush` with protocol-specific response
/// shaping (see [`crate::git`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    RepoSize,
    PrePull,
    PostPull,
    PrePush,
    PostPush,
}

impl HookName {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::RepoSize => "repo_size",
            HookName::PrePull => "pre_pull",
            HookName::PostPull => "post_pull",
            HookName::PrePush => "pre_push",
            HookName::PostPush => "post_push",
        }
    }

    pub fn category(&self) -> HookCategory {
        match self {
            HookName::RepoSize => HookCategory::RepoSize,
            HookName::PrePull | HookName::PostPull => HookCategory::Pull,
            HookName::PrePush | HookName::PostPush => HookCategory::Push,
        }
    }
}
