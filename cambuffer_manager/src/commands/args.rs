use anyhow::Result;
use cambuffer_core::launch::{LaunchDescriptor, NodeLaunch};
use colored::*;

/// One line per node: fully-qualified name, then the command line
pub fn render_command_line(node: &NodeLaunch) -> String {
    let mut parts = vec![node.executable().to_string()];
    parts.extend(node.command_args());
    parts.join(" ")
}

/// Print the argument vector each node would be started with
pub fn run_args(descriptor: &LaunchDescriptor) -> Result<()> {
    for node in descriptor.nodes() {
        println!("{} {}", "#".dimmed(), node.fully_qualified_name().yellow());
        println!("{}", render_command_line(node));
    }
    Ok(())
}
