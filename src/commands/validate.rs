//! `healthcheck validate` command.

use std::path::Path;

use super::load_config;
use crate::context::ServiceContext;
use crate::node::Node;

/// Execute the `validate` command.
///
/// Loads the config and builds the check tree without running it.
///
/// # Errors
///
/// Returns an error string describing the first configuration or build
/// error.
pub fn run(config_path: &Path) -> Result<(), String> {
    let config = load_config(config_path)?;
    let ctx = ServiceContext::simulated();
    let subsystems = config.declarations(|id, params| ctx.device(id, params));
    let root = ctx
        .builder(config.settings.check_settings())
        .build(&subsystems)
        .map_err(|e| e.to_string())?;
    println!("{}", summary(&root));
    Ok(())
}

fn summary(root: &Node) -> String {
    let cases = root.cases();
    let followers: usize = cases.iter().map(|c| c.followers().len()).sum();
    let subsystems = match root {
        Node::Composite(robot) => robot.children().len(),
        _ => 0,
    };
    format!("OK: {subsystems} subsystems, {} cases, {followers} follower bindings", cases.len())
}
