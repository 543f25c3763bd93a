//! Linearisation of a specification into container command tokens.
//!
//! Token order is part of the contract: run mode, name, links, environment,
//! volumes, extra arguments, image, command. Consumers rely on the last two
//! tokens being the image and the command. The docker program itself is
//! not part of the output; the launcher prepends it.

use crate::specification::Specification;

/// Run mode of application containers.
pub const RUN_DAEMON: &str = "run -d";

/// Run mode of task containers.
pub const RUN_ONESHOT: &str = "run --rm";

/// Forced removal verb.
pub const REMOVE_FORCED: &str = "rm -f";

/// Builds command tokens for one specification.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    spec: &'a Specification,
}

impl<'a> CommandBuilder<'a> {
    /// Creates a builder over `spec`.
    #[must_use]
    pub const fn new(spec: &'a Specification) -> Self {
        Self { spec }
    }

    /// Builds the tokens, running `command` instead of the specification's
    /// own command when given.
    #[must_use]
    pub fn build(&self, command: Option<&str>) -> Vec<String> {
        let spec = self.spec;
        let run = if spec.is_daemon() { RUN_DAEMON } else { RUN_ONESHOT };

        let mut tokens: Vec<Option<String>> = vec![
            Some(run.to_string()),
            Some(format!("--name {}", spec.container_name)),
        ];
        tokens.extend(
            spec.links
                .iter()
                .map(|link| Some(format!("--link={}:{}", link.from, link.alias))),
        );
        tokens.extend(
            spec.env
                .iter()
                .map(|(key, value)| Some(format!("-e=\"{key}={value}\""))),
        );
        tokens.extend(
            spec.volumes_from
                .iter()
                .map(|volume| Some(format!("--volumes-from={volume}"))),
        );
        tokens.push(spec.docker_args.clone());
        tokens.push(spec.image.clone());
        tokens.push(command.or_else(|| spec.cmd()).map(str::to_string));

        tokens
            .into_iter()
            .flatten()
            .filter(|token| !token.is_empty())
            .collect()
    }
}

/// Tokens force-removing the container named `container_name`.
#[must_use]
pub fn removal(container_name: &str) -> Vec<String> {
    vec![REMOVE_FORCED.to_string(), container_name.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::{Link, SpecKind};

    fn spec() -> Specification {
        let mut spec = Specification::application("theapp", "the_app_container_name");
        spec.kind = SpecKind::Application {
            mode: Some("server".into()),
            cmd: Some("the specified command".into()),
        };
        let _ = spec.env.insert("VAR1".into(), "val1".into());
        let _ = spec.env.insert("VAR2".into(), "val2".into());
        spec.links = vec![
            Link::new("fromcontainer", "toalias"),
            Link::new("othercontainer", "otheralias"),
        ];
        spec.volumes_from = vec!["somecontainer".into()];
        spec.image = Some("the_image".into());
        spec.docker_args = Some("other docker args".into());
        spec
    }

    #[test]
    fn application_runs_detached() {
        let cmd = CommandBuilder::new(&spec()).build(None);
        assert_eq!(cmd[0], "run -d");
    }

    #[test]
    fn task_runs_throwaway() {
        let mut spec = spec();
        spec.kind = SpecKind::Task { cmds: vec![] };
        let cmd = CommandBuilder::new(&spec).build(Some("task"));
        assert_eq!(cmd[0], "run --rm");
    }

    #[test]
    fn ends_with_image_then_command() {
        let cmd = CommandBuilder::new(&spec()).build(None);
        assert_eq!(cmd[cmd.len() - 2], "the_image");
        assert_eq!(cmd[cmd.len() - 1], "the specified command");
    }

    #[test]
    fn override_replaces_command() {
        let cmd = CommandBuilder::new(&spec()).build(Some("the command to run"));
        assert_eq!(cmd[cmd.len() - 2], "the_image");
        assert_eq!(cmd[cmd.len() - 1], "the command to run");
    }

    #[test]
    fn full_token_order() {
        let cmd = CommandBuilder::new(&spec()).build(None);
        assert_eq!(
            cmd,
            vec![
                "run -d",
                "--name the_app_container_name",
                "--link=fromcontainer:toalias",
                "--link=othercontainer:otheralias",
                "-e=\"VAR1=val1\"",
                "-e=\"VAR2=val2\"",
                "--volumes-from=somecontainer",
                "other docker args",
                "the_image",
                "the specified command",
            ]
        );
    }

    #[test]
    fn absent_tokens_are_dropped() {
        let mut spec = spec();
        spec.docker_args = None;
        spec.kind = SpecKind::Application {
            mode: None,
            cmd: None,
        };
        let cmd = CommandBuilder::new(&spec).build(None);
        assert_eq!(cmd.last().map(String::as_str), Some("the_image"));
        assert!(!cmd.iter().any(|token| token == "other docker args"));
    }

    #[test]
    fn empty_docker_args_produce_no_token() {
        let mut spec = spec();
        spec.docker_args = Some(String::new());
        let cmd = CommandBuilder::new(&spec).build(None);
        assert!(cmd.iter().all(|token| !token.is_empty()));
        assert_eq!(cmd.len(), 9);
    }

    #[test]
    fn removal_forces() {
        assert_eq!(removal("the_container_name"), vec!["rm -f", "the_container_name"]);
    }
}
