//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process spawning, port
//! probing, config file reading, and interface enumeration.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod network;
pub mod port;
pub mod process;
pub mod store;
