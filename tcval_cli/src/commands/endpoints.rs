use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use tcval_core::derive_endpoint_id;

use crate::keyfile;

#[derive(Debug, Serialize)]
struct DerivedEndpoint {
    name: String,
    address: String,
}

/// Derive the endpoint ids for a set of endpoint names under an API title
/// and write them to a JSON file.
pub fn run_endpoints_command(title: &str, endpoints: &[String], path: &Path) -> Result<()> {
    let derived: Vec<DerivedEndpoint> = endpoints
        .iter()
        .map(|name| DerivedEndpoint {
            name: name.clone(),
            address: format!("{:?}", derive_endpoint_id(title, name)),
        })
        .collect();

    for endpoint in &derived {
        println!("{}: {}", endpoint.name.bold(), endpoint.address);
    }

    keyfile::write_json_file(path, &serde_json::json!({ "endpoints": derived }))?;
    println!("{}", format!("Endpoints written to {}", path.display()).green());

    Ok(())
}
