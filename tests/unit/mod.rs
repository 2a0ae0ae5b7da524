// Test code is allowed to panic on failure
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

//! Unit tests for global-aurora-rds
//!
//! This module contains unit tests for:
//! - Primary cluster declaration and regional cluster registration
//! - Secondary region infrastructure
//! - Credential, parameter group and network resolution
//! - Build-time validation
//! - State machine transitions

#[path = "../common/mod.rs"]
mod common;

mod credentials;
mod master;
mod network;
mod slave;
