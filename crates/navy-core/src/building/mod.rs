//! Derivations shared by the application and task container builders.
//!
//! Each derivation is a pure function from `(app, config, options, spec)`
//! to an updated specification. The concrete builders compose them in a
//! declared sequence; apart from link order, derivations touch disjoint
//! fields so the sequence does not change the resulting content.

pub mod app;
pub mod task;

pub use app::AppContainerBuilder;
pub use task::TaskContainerBuilder;

use navy_common::constants::HOST_PROXY_ALIAS;
use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::configuration::{Configuration, NameOptions, container_name};
use crate::specification::{Link, Specification};

/// One step of specification building.
pub type Derivation = fn(&Application, &Configuration, &BuildOptions, Specification) -> Specification;

/// Scope a container is built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Deployment instance prefixed into names.
    pub convoy: Option<String>,
    /// Domain suffix of derived host names.
    pub cluster: Option<String>,
    /// Mode of an application container.
    pub mode: Option<String>,
    /// Scale index of an application container.
    pub scale: Option<u32>,
}

impl BuildOptions {
    /// Sets the convoy.
    #[must_use]
    pub fn with_convoy(mut self, convoy: impl Into<String>) -> Self {
        self.convoy = Some(convoy.into());
        self
    }

    /// Sets the cluster.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Sets the scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Naming scope using every option.
    #[must_use]
    pub fn names(&self) -> NameOptions<'_> {
        NameOptions::convoy(self.convoy.as_deref())
            .with_mode(self.mode.as_deref())
            .with_scale(self.scale)
    }

    /// Naming scope limited to the convoy.
    #[must_use]
    pub fn convoy_scope(&self) -> NameOptions<'_> {
        NameOptions::convoy(self.convoy.as_deref())
    }
}

/// Fully qualified host name of `app`: `convoy-app-cluster`, skipping
/// absent parts.
#[must_use]
pub fn fqdn(app: &str, options: &BuildOptions) -> String {
    [options.convoy.as_deref(), Some(app), options.cluster.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("-")
}

/// Name of the variable carrying the address of a linked app.
#[must_use]
pub fn host_addr_var(app: &str) -> String {
    format!("{}_HOST_ADDR", app.to_uppercase())
}

/// Container names of the app's external dependencies, scoped to the convoy.
#[must_use]
pub fn dependency_containers(
    app: &Application,
    config: &Configuration,
    options: &BuildOptions,
) -> Vec<String> {
    app.dependencies(config)
        .into_iter()
        .map(|dep| container_name(dep, &options.convoy_scope()))
        .collect()
}

/// Links every external dependency's container under its raw name.
#[must_use]
pub fn with_dependency_links(
    app: &Application,
    config: &Configuration,
    options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    for dep in app.dependencies(config) {
        let name = container_name(dep, &options.convoy_scope());
        tracing::debug!(container = %spec.container_name, dependency = %name, "dependency link");
        spec.links.push(Link::new(name, dep));
    }
    spec
}

/// Routes every linked app through the host proxy and publishes its address.
#[must_use]
pub fn with_app_links(
    app: &Application,
    config: &Configuration,
    options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    for linked in app.linked_apps(config) {
        let host = fqdn(linked, options);
        let _ = spec
            .env
            .insert(host_addr_var(linked), format!("https://{host}"));
        spec.links.push(Link::new(HOST_PROXY_ALIAS, host));
    }
    spec
}

/// Exposes the active environment name under the app's `env_var`.
#[must_use]
pub fn with_env_var(
    app: &Application,
    config: &Configuration,
    _options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    if let (Some(var), Some(environment)) = (app.env_var(), config.environment()) {
        let _ = spec.env.insert(var.to_string(), environment.to_string());
    }
    spec
}

/// Appends the app's volume sources.
#[must_use]
pub fn with_volumes(
    app: &Application,
    _config: &Configuration,
    _options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    spec.volumes_from.extend(app.volumes_from().iter().cloned());
    spec
}

/// Copies the environment's extra docker arguments for the app.
#[must_use]
pub fn with_docker_args(
    app: &Application,
    config: &Configuration,
    _options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    spec.docker_args = config.docker_args(app.name()).map(str::to_string);
    spec
}

/// Runs `derivations` in order over `spec`.
fn derive(
    derivations: &[Derivation],
    app: &Application,
    config: &Configuration,
    options: &BuildOptions,
    spec: Specification,
) -> Specification {
    derivations
        .iter()
        .fold(spec, |spec, derivation| derivation(app, config, options, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r"
apps:
  web:
    image: example/web
    links: [db, api, cache]
    env_var: NAVY_ENV
    volumes_from: [data, logs]
  api:
    image: example/api
environments:
  staging:
    docker:
      web: --memory 512m
";

    fn config() -> Configuration {
        let mut config = Configuration::parse(TOPOLOGY).expect("parse");
        config.set_env("staging");
        config
    }

    fn options() -> BuildOptions {
        BuildOptions::default()
            .with_convoy("convoy_id")
            .with_cluster("the-cluster.com")
    }

    fn blank() -> Specification {
        Specification::application("web", "convoy_id_web")
    }

    #[test]
    fn fqdn_joins_present_parts() {
        assert_eq!(fqdn("app1", &options()), "convoy_id-app1-the-cluster.com");
        assert_eq!(fqdn("app1", &BuildOptions::default()), "app1");
        let no_cluster = BuildOptions::default().with_convoy("c");
        assert_eq!(fqdn("app1", &no_cluster), "c-app1");
    }

    #[test]
    fn host_addr_var_is_uppercased() {
        assert_eq!(host_addr_var("app1"), "APP1_HOST_ADDR");
    }

    #[test]
    fn dependency_containers_are_convoy_scoped() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let options = options().with_mode("server").with_scale(3);
        assert_eq!(
            dependency_containers(app, &config, &options),
            vec!["convoy_id_db", "convoy_id_cache"]
        );
    }

    #[test]
    fn dependency_links_use_raw_alias() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let spec = with_dependency_links(app, &config, &options(), blank());
        assert!(spec.has_link("convoy_id_db", "db"));
        assert!(spec.has_link("convoy_id_cache", "cache"));
        assert_eq!(spec.links.len(), 2);
    }

    #[test]
    fn app_links_go_through_host_proxy() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let spec = with_app_links(app, &config, &options(), blank());
        assert_eq!(
            spec.env.get("API_HOST_ADDR").map(String::as_str),
            Some("https://convoy_id-api-the-cluster.com")
        );
        assert!(spec.has_link("host_proxy", "convoy_id-api-the-cluster.com"));
        assert_eq!(spec.links.len(), 1);
    }

    #[test]
    fn env_var_receives_environment_name() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let spec = with_env_var(app, &config, &options(), blank());
        assert_eq!(spec.env.get("NAVY_ENV").map(String::as_str), Some("staging"));
    }

    #[test]
    fn env_var_absent_without_setting() {
        let config = config();
        let app = config.find_app("api").expect("api");
        let spec = with_env_var(app, &config, &options(), blank());
        assert!(spec.env.is_empty());
    }

    #[test]
    fn volumes_are_appended_in_order() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let spec = with_volumes(app, &config, &options(), blank());
        assert_eq!(spec.volumes_from, vec!["data", "logs"]);
    }

    #[test]
    fn docker_args_come_from_environment() {
        let config = config();
        let web = config.find_app("web").expect("web");
        let spec = with_docker_args(web, &config, &options(), blank());
        assert_eq!(spec.docker_args.as_deref(), Some("--memory 512m"));

        let api = config.find_app("api").expect("api");
        let spec = with_docker_args(api, &config, &options(), blank());
        assert!(spec.docker_args.is_none());
    }

    #[test]
    fn derive_applies_steps_in_sequence() {
        let config = config();
        let app = config.find_app("web").expect("web");
        let steps: [Derivation; 2] = [with_app_links, with_dependency_links];
        let spec = derive(&steps, app, &config, &options(), blank());
        assert_eq!(spec.links[0].from, "host_proxy");
        assert_eq!(spec.links[1].from, "convoy_id_db");
    }
}
