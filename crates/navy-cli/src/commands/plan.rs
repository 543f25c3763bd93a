//! `navy plan`: print the convoy's containers in start order.

use clap::Args;
use navy_common::config::NavyConfig;
use navy_runtime::DockerLauncher;

use super::TopologyArgs;
use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Topology selection.
    #[command(flatten)]
    pub topology: TopologyArgs,

    /// Print the built specifications as JSON instead.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if the topology cannot be loaded or its containers
/// depend on each other cyclically.
pub fn execute(args: &PlanArgs, config: &NavyConfig) -> anyhow::Result<()> {
    let deployment = args.topology.deployment()?;
    let order = deployment.start_order()?;

    if args.json {
        let specifications: Vec<_> = order.iter().map(|c| c.specification()).collect();
        println!("{}", serde_json::to_string_pretty(&specifications)?);
        return Ok(());
    }

    let launcher = DockerLauncher::new(config);
    println!("Deployment plan for: {}", args.topology.file.display());
    println!();
    for container in &order {
        println!("  + {} ({})", container.name(), output::kind_label(container));
        println!(
            "      waits on: {}",
            output::join_or_dash(container.dependencies())
        );
        for line in output::start_lines(container, &launcher) {
            println!("      $ {line}");
        }
    }
    println!();
    println!("  {} container(s) planned.", order.len());
    Ok(())
}
