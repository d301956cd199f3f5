//! Shared data model for the VCS gateway: the `Wire` call descriptor,
//! `Extras` metadata, the tagged error carrier, hook responses, RPC framing,
//! and the `RepoHandle` trait every cached repository handle implements.
//!
//! Every other crate in the workspace depends on this one so there is a
//! single definition of the wire format the RPC dispatcher, the backend
//! adapters, and the hook bridge agree on.

mod cfg;
mod error;
mod extras;
mod hook;
mod repo_handle;
mod rpc;
pub mod serde_b64;
mod wire;

pub use cfg::Cfg;
pub use error::{translate, ErrorKind, VcsError, VcsResult};
pub use extras::{Extras, HookCategory};
pub use hook::{HookResponse, HOOK_TRANSPORT_ERROR_STATUS};
pub use repo_handle::RepoHandle;
pub use rpc::{RpcError, RpcParams, RpcRequest, RpcResponse};
pub use wire::{ConfigEntry, Wire};
