//! # navy-core
//!
//! Turns a per-environment application topology into container
//! specifications, a dependency graph of container names, and linear
//! container commands.
//!
//! Handles:
//! - **Configuration**: YAML topology parsing, environment selection, container naming.
//! - **Application**: immutable per-app settings and link partitioning.
//! - **Building**: the shared derivations plus the app and task container builders.
//! - **Container**: readiness gating against a [`StateStore`](store::StateStore)
//!   and execution through a [`ProcessLauncher`](launcher::ProcessLauncher).
//! - **Command**: linearisation of a specification into invocation tokens.
//! - **Deployment**: every container of a topology, ordered by the dependency graph.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod application;
pub mod building;
pub mod command;
pub mod configuration;
pub mod container;
pub mod deployment;
pub mod graph;
pub mod launcher;
pub mod specification;
pub mod store;
