//! `navy status`: report whether each container may start now.

use clap::Args;
use navy_common::config::NavyConfig;
use navy_core::container::Readiness;
use navy_runtime::EtcdClient;

use super::TopologyArgs;
use crate::output;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Topology selection.
    #[command(flatten)]
    pub topology: TopologyArgs,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the topology cannot be loaded or etcd cannot be
/// reached.
pub fn execute(args: &StatusArgs, config: &NavyConfig) -> anyhow::Result<()> {
    let deployment = args.topology.deployment()?;
    let store = EtcdClient::new(config)?;

    for container in deployment.start_order()? {
        let readiness = container.readiness(&store)?;
        match &readiness {
            Readiness::Blocked { dependency } => println!(
                "{:<40} {} (dependency {dependency} errored)",
                container.name(),
                output::readiness_label(&readiness)
            ),
            _ => println!(
                "{:<40} {}",
                container.name(),
                output::readiness_label(&readiness)
            ),
        }
    }
    Ok(())
}
