//! Wire protocol types for the Cortex JSON-RPC interface.
//!
//! Submodules:
//! - [`rpc`] — JSON-RPC request/response envelopes
//! - [`constants`] — method names, stream names, error codes
//! - [`profiles`] — profile-related response types
//! - [`frames`] — unsolicited data-frame payload extraction

pub mod constants;
pub mod frames;
pub mod profiles;
pub mod rpc;

pub use constants::{ErrorCodes, Methods, Streams};
pub use frames::{frame_kind, FacialFrame};
pub use profiles::{CurrentProfileInfo, ProfileAction, ProfileInfo};
pub use rpc::{RpcError, RpcRequest, RpcResponse};
