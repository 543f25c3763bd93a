//! Immutable view of one application's settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::configuration::Configuration;

/// Port an application is published on through the host proxy.
///
/// Applications usually map each mode to its own port. Environment
/// dependencies have no modes and give a single port instead, which then
/// answers for every mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxySetting {
    /// One port regardless of mode.
    Port(u16),
    /// Mode name to port.
    PerMode(BTreeMap<String, u16>),
}

/// Startup modes of an application in declaration order.
///
/// A mode written without a command (`worker:`) is declared but runs the
/// image's default command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Mapping", into = "Mapping")]
pub struct Modes(Vec<(String, Option<String>)>);

impl Modes {
    /// Mode names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Command of `mode`, if the mode is declared with one.
    #[must_use]
    pub fn command(&self, mode: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == mode)
            .and_then(|(_, command)| command.as_deref())
    }

    /// Whether `mode` is declared.
    #[must_use]
    pub fn contains(&self, mode: &str) -> bool {
        self.0.iter().any(|(name, _)| name == mode)
    }

    /// Number of declared modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no mode is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Mapping> for Modes {
    type Error = String;

    fn try_from(mapping: Mapping) -> Result<Self, Self::Error> {
        mapping
            .into_iter()
            .map(|(name, command)| {
                let name = match name {
                    Value::String(name) => name,
                    other => return Err(format!("mode name must be a string, got {other:?}")),
                };
                match command {
                    Value::Null => Ok((name, None)),
                    Value::String(command) => Ok((name, Some(command))),
                    other => Err(format!("command of mode {name} must be a string, got {other:?}")),
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Modes> for Mapping {
    fn from(modes: Modes) -> Self {
        modes
            .0
            .into_iter()
            .map(|(name, command)| (Value::String(name), command.map_or(Value::Null, Value::String)))
            .collect()
    }
}

/// Settings record of an application as written in the topology document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Container image reference.
    pub image: Option<String>,
    /// Startup modes and their commands.
    pub modes: Option<Modes>,
    /// Names this application wants to be bound to.
    pub links: Vec<String>,
    /// Proxy publication settings.
    pub proxy_to: Option<ProxySetting>,
    /// Variable receiving the active environment name.
    pub env_var: Option<String>,
    /// Containers whose volumes are mounted into this one.
    pub volumes_from: Vec<String>,
}

/// One application of a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    name: String,
    settings: AppSettings,
}

impl Application {
    /// Creates an application from its name and settings.
    #[must_use]
    pub fn new(name: impl Into<String>, settings: AppSettings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    /// Unique name of the application within its configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container image reference, if declared.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.settings.image.as_deref()
    }

    /// Declared modes, or `None` when the application has no modes.
    #[must_use]
    pub const fn modes(&self) -> Option<&Modes> {
        self.settings.modes.as_ref()
    }

    /// Command run in the given mode.
    #[must_use]
    pub fn mode_command(&self, mode: &str) -> Option<&str> {
        self.modes().and_then(|modes| modes.command(mode))
    }

    /// All declared links, in declaration order.
    #[must_use]
    pub fn links(&self) -> &[String] {
        &self.settings.links
    }

    /// Volume sources, in declaration order.
    #[must_use]
    pub fn volumes_from(&self) -> &[String] {
        &self.settings.volumes_from
    }

    /// Links that do not name an application of `config`.
    ///
    /// These are external units, expected to be declared as environment
    /// dependencies and started independently.
    #[must_use]
    pub fn dependencies(&self, config: &Configuration) -> Vec<&str> {
        self.links()
            .iter()
            .map(String::as_str)
            .filter(|link| !config.is_application(link))
            .collect()
    }

    /// Links that name another application of `config`.
    #[must_use]
    pub fn linked_apps(&self, config: &Configuration) -> Vec<&str> {
        self.links()
            .iter()
            .map(String::as_str)
            .filter(|link| config.is_application(link))
            .collect()
    }

    /// Whether any proxy setting exists at all.
    #[must_use]
    pub const fn has_any_proxy(&self) -> bool {
        self.settings.proxy_to.is_some()
    }

    /// Raw proxy setting.
    #[must_use]
    pub const fn proxy_setting(&self) -> Option<&ProxySetting> {
        self.settings.proxy_to.as_ref()
    }

    /// Port published for `mode`, if the application is proxied in it.
    #[must_use]
    pub fn proxy_for_mode(&self, mode: &str) -> Option<u16> {
        match self.proxy_setting()? {
            ProxySetting::Port(port) => Some(*port),
            ProxySetting::PerMode(ports) => ports.get(mode).copied(),
        }
    }

    /// Port published when no mode is involved.
    ///
    /// Only a single-port setting answers here; a per-mode map needs a mode.
    #[must_use]
    pub const fn default_proxy_port(&self) -> Option<u16> {
        match self.proxy_setting() {
            Some(ProxySetting::Port(port)) => Some(*port),
            _ => None,
        }
    }

    /// Whether an environment variable name is configured.
    #[must_use]
    pub const fn has_env_var(&self) -> bool {
        self.settings.env_var.is_some()
    }

    /// Name of the variable receiving the active environment name.
    #[must_use]
    pub fn env_var(&self) -> Option<&str> {
        self.settings.env_var.as_deref()
    }
}
