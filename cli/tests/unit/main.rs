//! Unit tests for tiplay
//!
//! These tests use fake and mocked ports and run fast without spawning
//! processes.

mod helpers;
mod tidb_instance;
