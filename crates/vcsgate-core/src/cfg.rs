//! `Cfg<T>`: a cheaply-cloneable, shared-ownership wrapper for rocket-managed
//! configuration state, matching the teacher's `upsilon-core::config::Cfg`.

use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct Cfg<T: Send + Sync>(Arc<T>);

impl<T: Send + Sync> Cfg<T> {
    pub fn new(cfg: T) -> Self {
        Self(Arc::new(cfg))
    }
}

impl<T> Deref for Cfg<T>
where
    T: Send + Sync,
{
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
