//! Read and write actions proxying to S3-compatible object storage.
//!
//! Each action takes the JSON parameter object of one invocation
//! ([`ActionArgs`]), resolves a storage connection, performs a single object
//! operation, and returns either a web-shaped result or an
//! [`ActionFailure`] result object.
//!
//! # Architecture
//!
//! ```text
//! ActionArgs (+ ProxyConfig fallbacks)
//!        |
//!        v
//! read_object / write_object ---- cosproxy-multipart (write path)
//!        |
//!        v
//! ConnectionParams -> StoreConnector -> ObjectStore (S3 or in-memory)
//! ```

// ActionFailure is returned by value as the Err side of every action; it is the
// serialized result object, so boxing it would only add indirection.
#![allow(clippy::result_large_err)]

pub mod args;
pub mod connection;
pub mod error;
pub mod media;
pub mod read;
pub mod store;
pub mod write;

pub use args::ActionArgs;
pub use connection::ConnectionParams;
pub use error::{ActionError, ActionFailure, FailureKind};
pub use read::{ReadOutput, read_object};
pub use store::{MemoryConnector, MemoryObjectStore, ObjectStore, S3Connector, StoreConnector};
pub use write::{WriteOutput, write_object};
