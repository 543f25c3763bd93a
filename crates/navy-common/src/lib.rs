//! # navy-common
//!
//! Shared error definitions, runtime settings, and constants used across
//! the entire Navy workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives that the topology builders,
//! the etcd client, and the CLI agree on (most importantly the store key
//! layout for container state documents).

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
