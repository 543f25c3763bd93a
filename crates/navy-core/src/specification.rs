//! Built container specifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Variant-specific part of a specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpecKind {
    /// Long-running application container.
    Application {
        /// Mode the container runs in.
        mode: Option<String>,
        /// Command of that mode.
        cmd: Option<String>,
    },
    /// One-shot container running a list of commands in order.
    Task {
        /// Commands, run sequentially.
        cmds: Vec<String>,
    },
}

/// A `--link` pair: container `from` reachable under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Linked container name.
    pub from: String,
    /// Alias inside this container.
    pub alias: String,
}

impl Link {
    /// Creates a link pair.
    #[must_use]
    pub fn new(from: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            alias: alias.into(),
        }
    }
}

/// Everything needed to run one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Application or task details.
    #[serde(flatten)]
    pub kind: SpecKind,
    /// Owning application name.
    pub name: String,
    /// Canonical container name.
    pub container_name: String,
    /// Image reference.
    pub image: Option<String>,
    /// Environment variables, rendered in key order.
    pub env: BTreeMap<String, String>,
    /// Links, in derivation order.
    pub links: Vec<Link>,
    /// Volume sources, in order.
    pub volumes_from: Vec<String>,
    /// Free-form extra docker arguments.
    pub docker_args: Option<String>,
}

impl Specification {
    /// Empty application specification.
    #[must_use]
    pub fn application(name: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self::with_kind(
            SpecKind::Application {
                mode: None,
                cmd: None,
            },
            name.into(),
            container_name.into(),
        )
    }

    /// Empty task specification running `cmds`.
    #[must_use]
    pub fn task(
        name: impl Into<String>,
        container_name: impl Into<String>,
        cmds: Vec<String>,
    ) -> Self {
        Self::with_kind(SpecKind::Task { cmds }, name.into(), container_name.into())
    }

    const fn with_kind(kind: SpecKind, name: String, container_name: String) -> Self {
        Self {
            kind,
            name,
            container_name,
            image: None,
            env: BTreeMap::new(),
            links: Vec::new(),
            volumes_from: Vec::new(),
            docker_args: None,
        }
    }

    /// Whether this describes a long-running application container.
    #[must_use]
    pub const fn is_daemon(&self) -> bool {
        matches!(self.kind, SpecKind::Application { .. })
    }

    /// Mode of an application container.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        match &self.kind {
            SpecKind::Application { mode, .. } => mode.as_deref(),
            SpecKind::Task { .. } => None,
        }
    }

    /// Command of an application container.
    #[must_use]
    pub fn cmd(&self) -> Option<&str> {
        match &self.kind {
            SpecKind::Application { cmd, .. } => cmd.as_deref(),
            SpecKind::Task { .. } => None,
        }
    }

    /// Commands of a task container; empty for applications.
    #[must_use]
    pub fn cmds(&self) -> &[String] {
        match &self.kind {
            SpecKind::Application { .. } => &[],
            SpecKind::Task { cmds } => cmds,
        }
    }

    /// Whether a link with exactly this pair exists.
    #[must_use]
    pub fn has_link(&self, from: &str, alias: &str) -> bool {
        self.links
            .iter()
            .any(|link| link.from == from && link.alias == alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_is_a_daemon() {
        let spec = Specification::application("web", "c_web");
        assert!(spec.is_daemon());
        assert!(spec.cmds().is_empty());
    }

    #[test]
    fn task_is_not_a_daemon() {
        let spec = Specification::task("web", "c_web_pretasks", vec!["a".into(), "b".into()]);
        assert!(!spec.is_daemon());
        assert_eq!(spec.cmds(), ["a", "b"]);
        assert_eq!(spec.cmd(), None);
        assert_eq!(spec.mode(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let mut spec = Specification::application("web", "c_web_server_1");
        spec.kind = SpecKind::Application {
            mode: Some("server".into()),
            cmd: Some("bin/server".into()),
        };
        let json = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(json["type"], "application");
        assert_eq!(json["mode"], "server");
        assert_eq!(json["cmd"], "bin/server");

        let task = Specification::task("web", "c_web_posttasks", vec!["notify".into()]);
        let json = serde_json::to_value(&task).expect("serialize");
        assert_eq!(json["type"], "task");
        assert_eq!(json["cmds"][0], "notify");
    }

    #[test]
    fn has_link_matches_whole_pair() {
        let mut spec = Specification::application("web", "web");
        spec.links.push(Link::new("c_db", "db"));
        assert!(spec.has_link("c_db", "db"));
        assert!(!spec.has_link("c_db", "database"));
    }
}
