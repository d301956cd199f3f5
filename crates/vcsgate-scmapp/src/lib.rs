//! Thin per-request factory layer sitting between the RPC dispatcher and
//! the two protocol engines (`vcsgate-pygrack`'s Git smart-HTTP and this
//! crate's Mercurial stdio pipe). Grounded on `vcsserver/scm_app.py`'s
//! `create_hg_wsgi_app`/`GitHandler`/`create_git_wsgi_app`.

pub mod git_handler;
pub mod hgweb;

pub use git_handler::GitHandler;
pub use hgweb::HgWebApp;
