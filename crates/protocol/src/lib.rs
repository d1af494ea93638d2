//! Wire types for the note-storage service protocol.
//!
//! This crate contains the serde-serializable types used for communication
//! with the remote note-storage service. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire once
//! the transport has decoded its framing.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization and
//!   content-hash bookkeeping
//! - **1:1 with protocol**: Match the service's operation schemas
//! - **Stable**: Changes only when the wire protocol changes
//!
//! Higher-level ergonomic APIs are built on top of these types in `ns`.

pub mod fault;
pub mod markup;
pub mod requests;
pub mod types;

pub use fault::*;
pub use markup::*;
pub use requests::*;
pub use types::*;

/// Protocol version this client speaks, sent with every version check.
pub const PROTOCOL_VERSION_MAJOR: u16 = 1;
/// Minor protocol version.
pub const PROTOCOL_VERSION_MINOR: u16 = 25;
