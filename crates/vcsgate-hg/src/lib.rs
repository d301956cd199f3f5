//! Mercurial backend adapter.
//!
//! Grounded in `vcsserver/hg.py`'s `HgRemote`. Unlike the Git adapter there
//! is no safe Rust binding to Mercurial's library internals, so every
//! operation here shells out to the `hg` executable through
//! `vcsgate_subprocio::SubprocIo` — the same process-based shape the
//! original already uses for its own `run_git_command` and that Subversion
//! uses throughout.

pub mod archive;
pub mod bulk;
pub mod check_url;
pub mod cli;
pub mod config;
pub mod ctx;
pub mod diff;
pub mod factory;
pub mod file;
pub mod handle;
pub mod largefiles;
pub mod mutate;
pub mod refs;
pub mod revset;

pub use cli::HgCli;
pub use factory::HgFactory;
pub use handle::HgRepoHandle;
