//! Git backend adapter.
//!
//! Grounded in `vcsserver/git.py`'s `GitRemote`, rebuilt on `git2` instead of
//! dulwich: repository access goes through [`GitFactory`]/[`GitRepoHandle`]
//! and the shared context cache, object/tree/ref manipulation is split
//! across [`objects`], [`tree`], [`refs`] and [`remote`], and the handful of
//! things that have no libgit2 equivalent (`update-server-info`,
//! `--version`) shell out through [`cli`].

pub mod bulk;
pub mod cli;
pub mod error;
pub mod factory;
pub mod handle;
pub mod objects;
pub mod refs;
pub mod remote;
pub mod tree;

pub use bulk::bulk_request;
pub use error::kind_for;
pub use factory::{init_fresh, open_fresh, GitFactory};
pub use handle::GitRepoHandle;
