//! The `RepoHandle` trait: a backend-specific handle owned by the repo
//! factory and context cache.

/// A backend-specific repository handle. Implementors must release any OS
/// resources they hold (pack-index file descriptors, subprocess handles)
/// either in `close` or in `Drop` — the context cache calls neither
/// preferentially and relies on `Drop` running when the last `Arc` to the
/// handle is released on eviction.
pub trait RepoHandle: Send + Sync + 'static {
    /// Backend discriminator, used to pick the cache region.
    fn region(&self) -> &'static str;

    /// Releases OS resources held by this handle (pack-index file
    /// descriptors, subprocess handles). Called by the context cache on
    /// eviction; the default no-op suits handles that release everything
    /// through `Drop` instead.
    fn close(&self) {}
}
