use schemars::schema_for;

use crate::run::config::Deployment;

/// Generate and print the JSON Schema for the deployment manifest.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(Deployment);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
