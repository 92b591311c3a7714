//! Core types, configuration, and errors for cosproxy.
//!
//! This crate provides the building blocks shared by the object storage
//! actions and the HTTP gateway: process configuration loaded from the
//! environment, object locations, and endpoint normalization.

mod config;
mod error;
mod types;

pub use config::{DEFAULT_COS_ENDPOINT, ProxyConfig, StorageBackend};
pub use error::{ProxyError, ProxyResult};
pub use types::{Endpoint, ObjectLocation};
