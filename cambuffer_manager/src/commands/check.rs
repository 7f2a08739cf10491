//! Check the descriptor's parameters the way the recorder node will on configure

use anyhow::{bail, Result};
use cambuffer_core::core::{LifecycleState, ManagedNode, Transition};
use cambuffer_core::launch::{LaunchDescriptor, NodeLaunch};
use cambuffer_core::recorder::{validate_launch_parameters, RecorderConfig, RecorderNode};
use colored::*;

/// Result of configuring one node
#[derive(Debug)]
pub struct NodeCheck {
    pub fully_qualified_name: String,
    pub outcome: Result<RecorderConfig, String>,
}

/// Run the configure transition of a fresh recorder node against `node`'s parameters.
///
/// The launch must set width, height and fps itself; the node's defaults
/// are not accepted in their place.
pub fn check_node(node: &NodeLaunch) -> NodeCheck {
    if let Err(e) = validate_launch_parameters(node.parameters()) {
        return NodeCheck {
            fully_qualified_name: node.fully_qualified_name(),
            outcome: Err(e.to_string()),
        };
    }

    let mut managed = ManagedNode::new(node.name(), RecorderNode::new(), node.parameters().clone());

    let outcome = match managed.trigger(Transition::Configure) {
        Ok(LifecycleState::Inactive) => managed
            .node()
            .config()
            .cloned()
            .ok_or_else(|| "configure succeeded without a configuration".to_string()),
        // a failed configure leaves the node unconfigured; re-run validation for the reason
        Ok(_) => Err(RecorderConfig::from_parameters(node.parameters())
            .err()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "configure failed".to_string())),
        Err(e) => Err(e.to_string()),
    };

    NodeCheck {
        fully_qualified_name: node.fully_qualified_name(),
        outcome,
    }
}

pub fn run_check(descriptor: &LaunchDescriptor) -> Result<()> {
    let checks: Vec<NodeCheck> = descriptor.nodes().iter().map(check_node).collect();
    let mut failed = 0;

    for check in &checks {
        match &check.outcome {
            Ok(config) => println!(
                "{} {} {}x{} @ {} fps, backend {}, output {}",
                "ok".green().bold(),
                check.fully_qualified_name.yellow(),
                config.width,
                config.height,
                config.fps,
                config.backend,
                config.output_path.display()
            ),
            Err(reason) => {
                failed += 1;
                println!(
                    "{} {} {}",
                    "invalid".red().bold(),
                    check.fully_qualified_name.yellow(),
                    reason
                );
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} node(s) would fail to configure", failed, checks.len());
    }
    Ok(())
}
