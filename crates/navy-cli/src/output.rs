//! Formatted output helpers for CLI commands.

use navy_core::container::{Container, Readiness};
use navy_runtime::DockerLauncher;

/// Short label of a readiness answer.
#[must_use]
pub const fn readiness_label(readiness: &Readiness) -> &'static str {
    match readiness {
        Readiness::Ready => "ready",
        Readiness::Waiting => "waiting",
        Readiness::Blocked { .. } => "blocked",
    }
}

/// Kind label of a container.
#[must_use]
pub const fn kind_label(container: &Container) -> &'static str {
    if container.is_daemon() {
        "application"
    } else {
        "task"
    }
}

/// Shell lines a container starts with, one per launch.
#[must_use]
pub fn start_lines(container: &Container, launcher: &DockerLauncher) -> Vec<String> {
    let builder = navy_core::command::CommandBuilder::new(container.specification());
    if container.is_daemon() {
        vec![launcher.command_line(&builder.build(None))]
    } else {
        container
            .specification()
            .cmds()
            .iter()
            .map(|cmd| launcher.command_line(&builder.build(Some(cmd))))
            .collect()
    }
}

/// Comma-separated list, or `-` when empty.
#[must_use]
pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use navy_core::specification::Specification;

    use super::*;

    #[test]
    fn labels_readiness() {
        assert_eq!(readiness_label(&Readiness::Ready), "ready");
        assert_eq!(readiness_label(&Readiness::Waiting), "waiting");
        assert_eq!(
            readiness_label(&Readiness::Blocked {
                dependency: "db".into()
            }),
            "blocked"
        );
    }

    #[test]
    fn task_starts_with_one_line_per_command() {
        let mut spec = Specification::task("web", "c1_web_pretasks", vec!["a".into(), "b".into()]);
        spec.image = Some("web_image".into());
        let container = Container::new(spec, Vec::new());
        let launcher = DockerLauncher::with_program("navy-no-such-program");

        assert_eq!(kind_label(&container), "task");
        assert_eq!(
            start_lines(&container, &launcher),
            vec![
                "navy-no-such-program run --rm --name c1_web_pretasks web_image a",
                "navy-no-such-program run --rm --name c1_web_pretasks web_image b",
            ]
        );
    }

    #[test]
    fn empty_lists_render_as_dash() {
        assert_eq!(join_or_dash(&[]), "-");
        assert_eq!(join_or_dash(&["a".into(), "b".into()]), "a, b");
    }
}
