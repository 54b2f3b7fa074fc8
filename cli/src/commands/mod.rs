//! Command implementations

pub mod tidb;
pub mod version;
