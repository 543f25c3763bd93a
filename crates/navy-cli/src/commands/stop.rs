//! `navy stop`: force-remove one container.

use anyhow::bail;
use clap::Args;
use navy_common::config::NavyConfig;
use navy_runtime::DockerLauncher;

use super::TopologyArgs;

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Name of the container to remove.
    pub container: String,

    /// Topology selection.
    #[command(flatten)]
    pub topology: TopologyArgs,
}

/// Executes the `stop` command.
///
/// # Errors
///
/// Returns an error if the container is unknown or its removal fails.
pub fn execute(args: &StopArgs, config: &NavyConfig) -> anyhow::Result<()> {
    let deployment = args.topology.deployment()?;
    let container = deployment.require(&args.container)?;

    let launcher = DockerLauncher::new(config);
    if !container.stop(&launcher) {
        bail!("failed to remove {}", container.name());
    }
    tracing::info!(container = %container.name(), "removed");
    Ok(())
}
