//! Built containers: readiness gating and execution.

use navy_common::constants::{ERROR_STATE, actual_key, desired_key};
use navy_common::error::Result;
use serde::{Deserialize, Serialize};

use crate::command::{CommandBuilder, removal};
use crate::launcher::ProcessLauncher;
use crate::specification::Specification;
use crate::store::StateStore;

/// Start decision for a container at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Every dependency has converged.
    Ready,
    /// Some dependency has not converged yet.
    Waiting,
    /// A dependency is in the error state; the container can never start.
    Blocked {
        /// Name of the errored dependency container.
        dependency: String,
    },
}

/// A built specification plus the names of the containers it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    specification: Specification,
    dependencies: Vec<String>,
}

impl Container {
    /// Wraps a specification and its dependency container names.
    #[must_use]
    pub const fn new(specification: Specification, dependencies: Vec<String>) -> Self {
        Self {
            specification,
            dependencies,
        }
    }

    /// The built specification.
    #[must_use]
    pub const fn specification(&self) -> &Specification {
        &self.specification
    }

    /// Container names this container waits on, in build order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether this is a long-running application container.
    #[must_use]
    pub const fn is_daemon(&self) -> bool {
        self.specification.is_daemon()
    }

    /// Canonical container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.specification.container_name
    }

    /// Owning application name.
    #[must_use]
    pub fn app(&self) -> &str {
        &self.specification.name
    }

    /// Whether every dependency's desired and actual documents are equal.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a document cannot be fetched.
    pub fn can_be_started<S: StateStore + ?Sized>(&self, store: &S) -> Result<bool> {
        for dependency in &self.dependencies {
            if !converged(store, dependency)? {
                tracing::debug!(container = %self.name(), %dependency, "dependency not converged");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether any dependency's actual document is in the error state.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a document cannot be fetched.
    pub fn can_never_be_started<S: StateStore + ?Sized>(&self, store: &S) -> Result<bool> {
        Ok(self.errored_dependency(store)?.is_some())
    }

    /// Combines both checks, giving the permanent block precedence.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a document cannot be fetched.
    pub fn readiness<S: StateStore + ?Sized>(&self, store: &S) -> Result<Readiness> {
        if let Some(dependency) = self.errored_dependency(store)? {
            tracing::warn!(container = %self.name(), %dependency, "dependency errored");
            return Ok(Readiness::Blocked {
                dependency: dependency.to_string(),
            });
        }
        if self.can_be_started(store)? {
            Ok(Readiness::Ready)
        } else {
            Ok(Readiness::Waiting)
        }
    }

    /// Runs the container.
    ///
    /// Applications launch once. Tasks launch each command in order and
    /// stop at the first failure.
    pub fn start<L: ProcessLauncher + ?Sized>(&self, launcher: &L) -> bool {
        let builder = CommandBuilder::new(&self.specification);
        if self.is_daemon() {
            tracing::info!(container = %self.name(), "starting application container");
            return launcher.launch(&builder.build(None));
        }

        for (index, command) in self.specification.cmds().iter().enumerate() {
            tracing::info!(container = %self.name(), step = index + 1, %command, "running task");
            if !launcher.launch(&builder.build(Some(command))) {
                tracing::error!(container = %self.name(), %command, "task failed");
                return false;
            }
        }
        true
    }

    /// Force-removes the container.
    pub fn stop<L: ProcessLauncher + ?Sized>(&self, launcher: &L) -> bool {
        tracing::info!(container = %self.name(), "removing container");
        launcher.launch(&removal(self.name()))
    }

    fn errored_dependency<S: StateStore + ?Sized>(&self, store: &S) -> Result<Option<&str>> {
        for dependency in &self.dependencies {
            if errored(store, dependency)? {
                return Ok(Some(dependency.as_str()));
            }
        }
        Ok(None)
    }
}

fn converged<S: StateStore + ?Sized>(store: &S, container_name: &str) -> Result<bool> {
    let desired = store.get_json(&desired_key(container_name))?;
    let actual = store.get_json(&actual_key(container_name))?;
    Ok(desired == actual)
}

fn errored<S: StateStore + ?Sized>(store: &S, container_name: &str) -> Result<bool> {
    let actual = store.get_json(&actual_key(container_name))?;
    Ok(actual
        .as_ref()
        .and_then(|doc| doc.get("state"))
        .and_then(serde_json::Value::as_str)
        == Some(ERROR_STATE))
}
