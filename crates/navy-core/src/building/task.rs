//! Builder for one-shot pre-task and post-task containers.

use navy_common::constants::{POSTTASKS_MODE, PRETASKS_MODE};

use super::{
    BuildOptions, Derivation, dependency_containers, derive, with_app_links,
    with_dependency_links, with_docker_args, with_env_var, with_volumes,
};
use crate::application::Application;
use crate::configuration::{Configuration, NameOptions, container_name};
use crate::container::Container;
use crate::specification::Specification;

const PRE_DERIVATIONS: [Derivation; 4] = [
    with_dependency_links,
    with_env_var,
    with_volumes,
    with_docker_args,
];

const POST_DERIVATIONS: [Derivation; 5] = [
    with_app_links,
    with_dependency_links,
    with_env_var,
    with_volumes,
    with_docker_args,
];

/// Builds the task containers that run before and after an application.
///
/// Only `convoy` and `cluster` of the options are used.
#[derive(Debug, Clone)]
pub struct TaskContainerBuilder<'a> {
    app: &'a Application,
    config: &'a Configuration,
    options: BuildOptions,
}

impl<'a> TaskContainerBuilder<'a> {
    /// Creates a builder for `app` within `config`.
    #[must_use]
    pub const fn new(app: &'a Application, config: &'a Configuration, options: BuildOptions) -> Self {
        Self {
            app,
            config,
            options,
        }
    }

    /// Builds the pre-task container, or `None` when the app has no
    /// pre-tasks in the selected environment.
    ///
    /// The container waits on the same external dependencies as the app.
    #[must_use]
    pub fn build_pre(&self) -> Option<Container> {
        let tasks = self.config.pre_tasks(self.app.name());
        if tasks.is_empty() {
            return None;
        }
        let spec = self.task_spec(PRETASKS_MODE, tasks);
        let spec = derive(&PRE_DERIVATIONS, self.app, self.config, &self.options, spec);
        let dependencies = dependency_containers(self.app, self.config, &self.options);
        Some(Container::new(spec, dependencies))
    }

    /// Builds the post-task container, or `None` when the app has no
    /// post-tasks in the selected environment.
    ///
    /// The container waits on every mode's application container at
    /// scale 1, or on the unscoped one when the app declares no modes.
    #[must_use]
    pub fn build_post(&self) -> Option<Container> {
        let tasks = self.config.post_tasks(self.app.name());
        if tasks.is_empty() {
            return None;
        }
        let spec = self.task_spec(POSTTASKS_MODE, tasks);
        let spec = derive(&POST_DERIVATIONS, self.app, self.config, &self.options, spec);
        Some(Container::new(spec, self.mode_dependencies()))
    }

    fn task_spec(&self, mode: &str, tasks: &[String]) -> Specification {
        let scope = NameOptions::convoy(self.options.convoy.as_deref()).with_mode(Some(mode));
        let mut spec = Specification::task(
            self.app.name(),
            container_name(self.app.name(), &scope),
            tasks.to_vec(),
        );
        spec.image = self.app.image().map(str::to_string);
        tracing::debug!(container = %spec.container_name, tasks = tasks.len(), "task container");
        spec
    }

    fn mode_dependencies(&self) -> Vec<String> {
        let scope = NameOptions::convoy(self.options.convoy.as_deref()).with_scale(Some(1));
        match self.app.modes() {
            Some(modes) => modes
                .names()
                .map(|mode| container_name(self.app.name(), &scope.with_mode(Some(mode))))
                .collect(),
            None => vec![container_name(self.app.name(), &scope)],
        }
    }
}
