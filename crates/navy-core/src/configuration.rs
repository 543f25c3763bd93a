//! Topology document parsing, environment selection and container naming.
//!
//! A topology document declares every application once under `apps` and
//! layers per-environment overlays under `environments`:
//!
//! ```yaml
//! apps:
//!   web:
//!     image: example/web
//!     modes:
//!       server: bin/server
//!     links: [db, api]
//! environments:
//!   staging:
//!     dependencies:
//!       db:
//!     pre:
//!       web: [bin/migrate]
//!     post:
//!       web: [bin/notify]
//!     docker:
//!       web: --memory 512m
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use navy_common::error::{NavyError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::application::{AppSettings, Application};

/// Scoping used by [`container_name`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameOptions<'a> {
    /// Deployment instance prefix.
    pub convoy: Option<&'a str>,
    /// Mode suffix.
    pub mode: Option<&'a str>,
    /// Scale index suffix.
    pub scale: Option<u32>,
}

impl<'a> NameOptions<'a> {
    /// Options scoped to a convoy only.
    #[must_use]
    pub const fn convoy(convoy: Option<&'a str>) -> Self {
        Self {
            convoy,
            mode: None,
            scale: None,
        }
    }

    /// Sets the mode suffix.
    #[must_use]
    pub const fn with_mode(mut self, mode: Option<&'a str>) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the scale suffix.
    #[must_use]
    pub const fn with_scale(mut self, scale: Option<u32>) -> Self {
        self.scale = scale;
        self
    }
}

/// Canonical container name: the non-empty parts of
/// `[convoy, app, mode, scale]` joined with `_`.
///
/// The result is both the docker container name and the suffix of the
/// container's state keys in the store.
#[must_use]
pub fn container_name(app: &str, options: &NameOptions<'_>) -> String {
    let scale = options.scale.map(|scale| scale.to_string());
    [options.convoy, Some(app), options.mode, scale.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Raw shape of a topology document.
#[derive(Debug, Deserialize)]
struct TopologyDocument {
    #[serde(default)]
    apps: Option<Mapping>,
    #[serde(default)]
    environments: Option<Mapping>,
}

/// Raw shape of one environment section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvironmentSection {
    dependencies: Option<Mapping>,
    pre: Option<BTreeMap<String, Option<Vec<String>>>>,
    post: Option<BTreeMap<String, Option<Vec<String>>>>,
    docker: Option<BTreeMap<String, Option<String>>>,
}

/// Environment-scoped data selected by [`Configuration::set_env`].
#[derive(Debug, Clone, Default)]
struct Overlay {
    dependencies: Vec<Application>,
    pre: BTreeMap<String, Vec<String>>,
    post: BTreeMap<String, Vec<String>>,
    docker: BTreeMap<String, String>,
}

impl Overlay {
    fn from_section(name: &str, section: EnvironmentSection) -> Result<Self> {
        let dependencies = match section.dependencies {
            Some(mapping) => named_entries::<AppSettings>(
                &format!("environments.{name}.dependencies"),
                mapping,
            )?
            .into_iter()
            .map(|(dep, settings)| Application::new(dep, settings))
            .collect(),
            None => Vec::new(),
        };
        Ok(Self {
            dependencies,
            pre: declared(section.pre),
            post: declared(section.post),
            docker: declared(section.docker),
        })
    }
}

/// Drops entries written as `null`; they read as undeclared.
fn declared<T>(section: Option<BTreeMap<String, Option<T>>>) -> BTreeMap<String, T> {
    section
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(app, value)| value.map(|value| (app, value)))
        .collect()
}

/// A parsed topology with an optionally selected environment.
///
/// Environment-scoped queries ([`dependencies`](Self::dependencies),
/// [`pre_tasks`](Self::pre_tasks), [`post_tasks`](Self::post_tasks),
/// [`docker_args`](Self::docker_args)) answer for the environment chosen
/// with [`set_env`](Self::set_env). Before that, and for environments the
/// document does not declare, they answer with empty data.
#[derive(Debug, Clone)]
pub struct Configuration {
    apps: Vec<Application>,
    environments: BTreeMap<String, Overlay>,
    environment: Option<String>,
    empty: Overlay,
}

impl Configuration {
    /// Parses a YAML topology document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML, the `apps` section is
    /// missing, or any section has the wrong shape.
    pub fn parse(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Loads and parses a YAML topology file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading topology file");
        let content = std::fs::read_to_string(path).map_err(|e| NavyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Builds a configuration from an already parsed YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the `apps` section is missing or any section has
    /// the wrong shape.
    pub fn from_value(value: Value) -> Result<Self> {
        let document: TopologyDocument = serde_yaml::from_value(value)?;
        let apps = document.apps.ok_or_else(|| NavyError::Config {
            message: "missing required `apps` section".into(),
        })?;

        let apps: Vec<Application> = named_entries::<AppSettings>("apps", apps)?
            .into_iter()
            .map(|(name, settings)| Application::new(name, settings))
            .collect();

        let mut environments = BTreeMap::new();
        if let Some(sections) = document.environments {
            for (name, section) in named_entries::<EnvironmentSection>("environments", sections)? {
                let overlay = Overlay::from_section(&name, section)?;
                let _ = environments.insert(name, overlay);
            }
        }

        tracing::debug!(
            apps = apps.len(),
            environments = environments.len(),
            "parsed topology"
        );

        Ok(Self {
            apps,
            environments,
            environment: None,
            empty: Overlay::default(),
        })
    }

    /// Selects the environment whose overlays subsequent queries use.
    pub fn set_env(&mut self, environment: impl Into<String>) {
        let environment = environment.into();
        if !self.environments.contains_key(&environment) {
            tracing::warn!(%environment, "environment not declared, using empty overlays");
        }
        self.environment = Some(environment);
    }

    /// Name of the selected environment.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Names of the environments declared in the document.
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Applications in declaration order.
    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.apps.iter()
    }

    /// Application names in declaration order.
    pub fn application_names(&self) -> impl Iterator<Item = &str> {
        self.apps.iter().map(Application::name)
    }

    /// Whether `name` is one of the declared applications.
    #[must_use]
    pub fn is_application(&self, name: &str) -> bool {
        self.apps.iter().any(|app| app.name() == name)
    }

    /// Finds an application by name.
    #[must_use]
    pub fn find_app(&self, name: &str) -> Option<&Application> {
        self.apps.iter().find(|app| app.name() == name)
    }

    /// Dependencies declared by the selected environment.
    pub fn dependencies(&self) -> impl Iterator<Item = &Application> {
        self.overlay().dependencies.iter()
    }

    /// Pre-task commands of `app` in the selected environment.
    #[must_use]
    pub fn pre_tasks(&self, app: &str) -> &[String] {
        self.overlay()
            .pre
            .get(app)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Post-task commands of `app` in the selected environment.
    #[must_use]
    pub fn post_tasks(&self, app: &str) -> &[String] {
        self.overlay()
            .post
            .get(app)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Extra docker arguments of `app` in the selected environment.
    #[must_use]
    pub fn docker_args(&self, app: &str) -> Option<&str> {
        self.overlay().docker.get(app).map(String::as_str)
    }

    fn overlay(&self) -> &Overlay {
        self.environment
            .as_ref()
            .and_then(|env| self.environments.get(env))
            .unwrap_or(&self.empty)
    }
}

/// Converts a mapping of `name: settings` into ordered typed entries.
///
/// `null` settings stand for the default record.
fn named_entries<T>(section: &str, mapping: Mapping) -> Result<Vec<(String, T)>>
where
    T: DeserializeOwned + Default,
{
    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = match key {
                Value::String(name) => name,
                other => {
                    return Err(NavyError::Config {
                        message: format!("{section}: entry names must be strings, got {other:?}"),
                    });
                }
            };
            let settings = serde_yaml::from_value::<Option<T>>(value)
                .map_err(|e| NavyError::Config {
                    message: format!("{section}.{name}: {e}"),
                })?
                .unwrap_or_default();
            Ok((name, settings))
        })
        .collect()
}
