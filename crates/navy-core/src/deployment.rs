//! Every container of a topology, with a resolved start order.

use navy_common::error::{NavyError, Result};

use crate::building::{AppContainerBuilder, BuildOptions, TaskContainerBuilder};
use crate::configuration::Configuration;
use crate::container::Container;
use crate::graph::DependencyGraph;

/// The containers one convoy runs for the selected environment.
#[derive(Debug, Clone)]
pub struct Deployment {
    containers: Vec<Container>,
}

impl Deployment {
    /// Builds the pre-task, application and post-task containers of every
    /// declared app.
    ///
    /// Applications get one container per mode at scale 1, or a single
    /// unscoped one at scale 1 when they declare no modes. Only `convoy`
    /// and `cluster` of `options` are used.
    #[must_use]
    pub fn build(config: &Configuration, options: &BuildOptions) -> Self {
        let base = BuildOptions {
            convoy: options.convoy.clone(),
            cluster: options.cluster.clone(),
            mode: None,
            scale: None,
        };

        let mut containers = Vec::new();
        for app in config.applications() {
            let tasks = TaskContainerBuilder::new(app, config, base.clone());
            containers.extend(tasks.build_pre());

            let scoped = base.clone().with_scale(1);
            match app.modes() {
                Some(modes) => containers.extend(modes.names().map(|mode| {
                    AppContainerBuilder::new(app, config, scoped.clone().with_mode(mode)).build()
                })),
                None => containers.push(AppContainerBuilder::new(app, config, scoped).build()),
            }

            containers.extend(tasks.build_post());
        }

        tracing::info!(
            environment = config.environment().unwrap_or("<none>"),
            containers = containers.len(),
            "deployment built"
        );
        Self { containers }
    }

    /// Containers in build order.
    #[must_use]
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Looks a container up by its name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|container| container.name() == name)
    }

    /// Looks a container up by its name, failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`NavyError::NotFound`] if no container has that name.
    pub fn require(&self, name: &str) -> Result<&Container> {
        self.find(name).ok_or_else(|| NavyError::NotFound {
            kind: "container",
            id: name.to_string(),
        })
    }

    /// Containers ordered so that every in-plan dependency precedes its
    /// dependants.
    ///
    /// Dependencies outside the plan are run elsewhere and do not
    /// constrain the order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the containers depend on each
    /// other cyclically.
    pub fn start_order(&self) -> Result<Vec<&Container>> {
        let mut graph = DependencyGraph::new();
        for container in &self.containers {
            let _ = graph.add_container(container.name());
        }
        for container in &self.containers {
            let Some(dependent) = graph.index_of(container.name()) else {
                continue;
            };
            for dependency in container.dependencies() {
                if let Some(dependency) = graph.index_of(dependency) {
                    graph.add_dependency(dependent, dependency);
                }
            }
        }

        let order = graph.resolve_order()?;
        tracing::debug!(order = ?order, "resolved start order");
        Ok(order.iter().filter_map(|name| self.find(name)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r"
apps:
  web:
    image: web_image
    links: [db, api]
    modes:
      server: serve
      worker: work
    proxy_to:
      server: 8080
  api:
    image: api_image
    links: [db]
environments:
  production:
    dependencies:
      db:
        image: postgres
    pre:
      web: [migrate]
    post:
      web: [warm-cache]
";

    fn deployment() -> Deployment {
        let mut config = Configuration::parse(TOPOLOGY).expect("parse");
        config.set_env("production");
        let options = BuildOptions::default()
            .with_convoy("c1")
            .with_cluster("example.com");
        Deployment::build(&config, &options)
    }

    fn names(containers: &[&Container]) -> Vec<String> {
        containers.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn builds_every_container() {
        let deployment = deployment();
        let mut built: Vec<&str> = deployment.containers().iter().map(Container::name).collect();
        built.sort_unstable();
        assert_eq!(
            built,
            vec![
                "c1_api_1",
                "c1_web_posttasks",
                "c1_web_pretasks",
                "c1_web_server_1",
                "c1_web_worker_1",
            ]
        );
    }

    #[test]
    fn find_and_require() {
        let deployment = deployment();
        assert!(deployment.find("c1_web_server_1").is_some());
        assert!(deployment.find("nope").is_none());
        assert!(deployment.require("c1_api_1").is_ok());
        let err = deployment.require("nope").unwrap_err();
        assert!(err.to_string().contains("container not found"));
    }

    #[test]
    fn start_order_respects_dependencies() {
        let deployment = deployment();
        let order = names(&deployment.start_order().expect("order"));
        assert_eq!(order.len(), deployment.containers().len());

        let pos = |name: &str| order.iter().position(|n| n == name).expect(name);
        assert!(pos("c1_web_pretasks") < pos("c1_web_server_1"));
        assert!(pos("c1_web_pretasks") < pos("c1_web_worker_1"));
        assert!(pos("c1_web_server_1") < pos("c1_web_posttasks"));
        assert!(pos("c1_web_worker_1") < pos("c1_web_posttasks"));
    }

    #[test]
    fn external_dependencies_do_not_constrain_order() {
        let deployment = deployment();
        let web = deployment.require("c1_web_server_1").expect("built");
        assert!(web.dependencies().iter().any(|d| d == "c1_db"));
        assert!(deployment.find("c1_db").is_none());
        assert!(deployment.start_order().is_ok());
    }

    #[test]
    fn app_containers_follow_declared_mode_order() {
        let built: Vec<String> = deployment()
            .containers()
            .iter()
            .filter(|c| c.app() == "web" && c.is_daemon())
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(built, vec!["c1_web_server_1", "c1_web_worker_1"]);

        let config = Configuration::parse("apps:\n  web:\n    modes:\n      zeta: z\n      alpha: a\n")
            .expect("parse");
        let deployment = Deployment::build(&config, &BuildOptions::default());
        let names: Vec<&str> = deployment.containers().iter().map(Container::name).collect();
        assert_eq!(names, vec!["web_zeta_1", "web_alpha_1"]);
    }

    #[test]
    fn empty_topology_builds_nothing() {
        let config = Configuration::parse("apps: {}").expect("parse");
        let deployment = Deployment::build(&config, &BuildOptions::default());
        assert!(deployment.containers().is_empty());
        assert!(deployment.start_order().expect("order").is_empty());
    }
}
