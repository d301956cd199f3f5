//! Git smart-HTTP endpoint: serves `info/refs`, `git-upload-pack` and
//! `git-receive-pack` over the dumb-CGI-flavored protocol described in
//! `Documentation/technical/http-protocol.txt`, by shelling out to `git
//! ... --stateless-rpc`. Grounded on `GitRepository` in
//! `original_source/vcsserver/pygrack.py`; the CGI-subprocess plumbing it
//! shares with `upsilon-vcs`'s `http_backend.rs`.

pub mod capabilities;
pub mod engine;
pub mod error;
pub mod peek;
pub mod pktline;
pub mod response;

pub use capabilities::parse_want_line_capabilities;
pub use engine::{fixed_path, is_git_directory, BackendBody, BackendResponse, InfoRefsResponse, PygrackEngine};
pub use error::PygrackError;
pub use peek::peek_first_line;
pub use pktline::{flush_pkt, pkt_line, sideband_chunk_size, sideband_chunks, sideband_packet, EMPTY_PACK};
pub use response::{build_failed_pre_pull_response, inject_messages};
