//! Subversion backend adapter.
//!
//! Grounded in `vcsserver/svn.py`'s `SvnRemote` method surface, rebuilt as a
//! thin process wrapper: there is no safe, maintained Rust binding to
//! `libsvn_fs`/`libsvn_repos`, so every read goes through `svnlook` and every
//! mutation goes through `svnmucc`/`svnadmin`, the same native-executable
//! pattern the spec itself names for `svnrdump`/`svnadmin`.

pub mod changes;
pub mod check_url;
pub mod cli;
pub mod commit;
pub mod diff;
pub mod factory;
pub mod handle;
pub mod history;
pub mod import;
pub mod lookup;
pub mod nodes;
pub mod props;

pub use changes::{revision_changes, RevisionChanges};
pub use check_url::check_url;
pub use cli::SvnCli;
pub use commit::{commit, FileUpdate};
pub use diff::diff;
pub use factory::SvnFactory;
pub use handle::SvnRepoHandle;
pub use history::{file_annotate, node_history, AnnotateLine};
pub use import::{classify_rdump_error, import_remote_repository};
pub use lookup::{lookup, lookup_interval, youngest};
pub use nodes::{get_file_content, get_file_size, get_node_type, get_nodes, NodeType};
pub use props::{node_properties, revision_properties};
