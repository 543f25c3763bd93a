//! Builder for long-running application containers.

use navy_common::constants::PRETASKS_MODE;

use super::{
    BuildOptions, Derivation, dependency_containers, derive, fqdn, with_app_links,
    with_dependency_links, with_docker_args, with_env_var, with_volumes,
};
use crate::application::Application;
use crate::configuration::{Configuration, NameOptions, container_name};
use crate::container::Container;
use crate::specification::{SpecKind, Specification};

/// Derivations applied to application containers, in link order.
const DERIVATIONS: [Derivation; 6] = [
    with_app_links,
    with_dependency_links,
    with_env_var,
    with_proxy,
    with_volumes,
    with_docker_args,
];

/// Builds the application container of one app for a mode, convoy,
/// cluster and scale.
#[derive(Debug, Clone)]
pub struct AppContainerBuilder<'a> {
    app: &'a Application,
    config: &'a Configuration,
    options: BuildOptions,
}

impl<'a> AppContainerBuilder<'a> {
    /// Creates a builder for `app` within `config`.
    #[must_use]
    pub const fn new(app: &'a Application, config: &'a Configuration, options: BuildOptions) -> Self {
        Self {
            app,
            config,
            options,
        }
    }

    /// Builds the container specification and its dependency list.
    ///
    /// An undeclared mode leaves the command unset.
    #[must_use]
    pub fn build(&self) -> Container {
        let (app, config, options) = (self.app, self.config, &self.options);
        let mode = options.mode.as_deref();

        let mut spec = Specification::application(
            app.name(),
            container_name(app.name(), &options.names()),
        );
        spec.image = app.image().map(str::to_string);
        spec.kind = SpecKind::Application {
            mode: options.mode.clone(),
            cmd: mode.and_then(|mode| app.mode_command(mode)).map(str::to_string),
        };
        let spec = derive(&DERIVATIONS, app, config, options, spec);

        let mut dependencies = dependency_containers(app, config, options);
        if !config.pre_tasks(app.name()).is_empty() {
            let scope = NameOptions::convoy(options.convoy.as_deref()).with_mode(Some(PRETASKS_MODE));
            dependencies.push(container_name(app.name(), &scope));
        }

        tracing::debug!(
            container = %spec.container_name,
            dependencies = ?dependencies,
            "built application container"
        );
        Container::new(spec, dependencies)
    }
}

/// Publishes the app through the host proxy when it is proxied in the
/// built mode.
fn with_proxy(
    app: &Application,
    _config: &Configuration,
    options: &BuildOptions,
    mut spec: Specification,
) -> Specification {
    let port = match options.mode.as_deref() {
        Some(mode) => app.proxy_for_mode(mode),
        None => app.default_proxy_port(),
    };
    if let Some(port) = port {
        let _ = spec
            .env
            .insert("VIRTUAL_HOST".into(), fqdn(app.name(), options));
        let _ = spec.env.insert("VIRTUAL_PORT".into(), port.to_string());
    }
    spec
}
