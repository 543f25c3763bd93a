//! `navy start`: launch one container once its dependencies converged.

use anyhow::bail;
use clap::Args;
use navy_common::config::NavyConfig;
use navy_core::container::Readiness;
use navy_runtime::{DockerLauncher, EtcdClient};

use super::TopologyArgs;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Name of the container to start.
    pub container: String,

    /// Topology selection.
    #[command(flatten)]
    pub topology: TopologyArgs,

    /// Start even if dependencies have not converged yet.
    #[arg(long)]
    pub force: bool,
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if the container is unknown, a dependency errored, a
/// dependency has not converged and `--force` is absent, or the launch
/// fails.
pub fn execute(args: &StartArgs, config: &NavyConfig) -> anyhow::Result<()> {
    let deployment = args.topology.deployment()?;
    let container = deployment.require(&args.container)?;
    let store = EtcdClient::new(config)?;

    match container.readiness(&store)? {
        Readiness::Blocked { dependency } => {
            bail!("{} can never start: dependency {dependency} errored", container.name())
        }
        Readiness::Waiting if !args.force => {
            bail!("{} is waiting on unconverged dependencies", container.name())
        }
        Readiness::Waiting => {
            tracing::warn!(container = %container.name(), "starting before dependencies converged");
        }
        Readiness::Ready => {}
    }

    let launcher = DockerLauncher::new(config);
    if !container.start(&launcher) {
        bail!("failed to start {}", container.name());
    }
    tracing::info!(container = %container.name(), "started");
    Ok(())
}
