//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod host;
pub mod instance;
pub mod peer;
pub mod version;

pub use config::{DEFAULT_PORT, DEFAULT_STATUS_PORT, TidbConfig, resolve_listen_port};
pub use error::InstanceError;
pub use instance::{ComponentCommand, InstanceSpec, InstanceState, TIDB_COMPONENT};
pub use peer::{PdPeer, pd_endpoints};
pub use version::ComponentVersion;
