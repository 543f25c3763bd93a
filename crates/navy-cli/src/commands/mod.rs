//! CLI command definitions and dispatch.

pub mod plan;
pub mod start;
pub mod status;
pub mod stop;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use navy_common::config::NavyConfig;
use navy_common::constants::{DEFAULT_DOCKER_PROGRAM, DEFAULT_ETCD_HOST, DEFAULT_ETCD_PORT};
use navy_core::building::BuildOptions;
use navy_core::configuration::Configuration;
use navy_core::deployment::Deployment;

/// Navy: plan, gate and launch the containers of a convoy.
#[derive(Parser, Debug)]
#[command(name = "navy", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Host of the etcd server holding container state.
    #[arg(long, global = true, env = "NAVY_ETCD_HOST", default_value = DEFAULT_ETCD_HOST)]
    pub etcd_host: String,

    /// Client port of the etcd server.
    #[arg(long, global = true, env = "NAVY_ETCD_PORT", default_value_t = DEFAULT_ETCD_PORT)]
    pub etcd_port: u16,

    /// Program receiving the generated container commands.
    #[arg(long, global = true, env = "NAVY_DOCKER", default_value = DEFAULT_DOCKER_PROGRAM)]
    pub docker: String,
}

impl Cli {
    /// Collaborator settings selected on the command line.
    #[must_use]
    pub fn config(&self) -> NavyConfig {
        NavyConfig {
            etcd_host: self.etcd_host.clone(),
            etcd_port: self.etcd_port,
            docker_program: self.docker.clone(),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every container of the convoy in start order.
    Plan(plan::PlanArgs),
    /// Report whether each container may start now.
    Status(status::StatusArgs),
    /// Start one container once its dependencies have converged.
    Start(start::StartArgs),
    /// Force-remove one container.
    Stop(stop::StopArgs),
}

/// Topology selection shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct TopologyArgs {
    /// Path to the YAML topology file.
    #[arg(short, long, env = "NAVY_FILE", default_value = "navy.yml")]
    pub file: PathBuf,

    /// Environment whose dependencies, tasks and docker flags apply.
    #[arg(long, env = "NAVY_ENV")]
    pub env: Option<String>,

    /// Convoy (deployment instance) prefixed into container names.
    #[arg(long, env = "NAVY_CONVOY")]
    pub convoy: Option<String>,

    /// Cluster domain suffix of derived host names.
    #[arg(long, env = "NAVY_CLUSTER")]
    pub cluster: Option<String>,
}

impl TopologyArgs {
    /// Loads the topology and selects the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn configuration(&self) -> anyhow::Result<Configuration> {
        let mut config = Configuration::from_file(&self.file)
            .with_context(|| format!("failed to load topology {}", self.file.display()))?;
        if let Some(env) = &self.env {
            config.set_env(env.as_str());
        }
        Ok(config)
    }

    /// Build scope selected on the command line.
    #[must_use]
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            convoy: self.convoy.clone(),
            cluster: self.cluster.clone(),
            mode: None,
            scale: None,
        }
    }

    /// Loads the topology and builds its containers.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology cannot be loaded.
    pub fn deployment(&self) -> anyhow::Result<Deployment> {
        let config = self.configuration()?;
        Ok(Deployment::build(&config, &self.options()))
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();
    match cli.command {
        Command::Plan(args) => plan::execute(&args, &config),
        Command::Status(args) => status::execute(&args, &config),
        Command::Start(args) => start::execute(&args, &config),
        Command::Stop(args) => stop::execute(&args, &config),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_default_to_local_collaborators() {
        let cli = Cli::try_parse_from(["navy", "plan", "--file", "topology.yml"]).expect("parse");
        let config = cli.config();
        assert_eq!(config.etcd_port, DEFAULT_ETCD_PORT);
        assert_eq!(config.docker_program, DEFAULT_DOCKER_PROGRAM);
    }

    #[test]
    fn topology_args_select_scope() {
        let cli = Cli::try_parse_from([
            "navy",
            "--etcd-port",
            "2379",
            "start",
            "c1_web_1",
            "-f",
            "topology.yml",
            "--env",
            "production",
            "--convoy",
            "c1",
            "--cluster",
            "example.com",
            "--force",
        ])
        .expect("parse");
        assert_eq!(cli.config().etcd_port, 2379);
        let Command::Start(args) = cli.command else {
            panic!("expected start");
        };
        assert_eq!(args.container, "c1_web_1");
        assert!(args.force);
        assert_eq!(args.topology.file, PathBuf::from("topology.yml"));
        assert_eq!(args.topology.env.as_deref(), Some("production"));
        let options = args.topology.options();
        assert_eq!(options.convoy.as_deref(), Some("c1"));
        assert_eq!(options.cluster.as_deref(), Some("example.com"));
    }

    #[test]
    fn missing_topology_file_is_an_error() {
        let args = TopologyArgs {
            file: PathBuf::from("/nonexistent/navy.yml"),
            env: None,
            convoy: None,
            cluster: None,
        };
        let err = args.deployment().unwrap_err();
        assert!(format!("{err:#}").contains("failed to load topology"));
    }
}
