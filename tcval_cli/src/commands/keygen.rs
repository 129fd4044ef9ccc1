use std::path::PathBuf;

use anyhow::Result;
use base64::Engine;
use colored::Colorize;
use rand::RngCore;
use serde_json::{Map, Value};

use crate::keyfile;

/// Generate a random key of the requested size and print it base64
/// encoded. When a key-file path is given the key is merged into it under
/// `name`, preserving any keys already stored there.
pub fn run_keygen_command(size: usize, name: String, path: Option<PathBuf>) -> Result<()> {
    let mut buffer = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buffer);
    let key = base64::engine::general_purpose::STANDARD.encode(&buffer);

    println!("{}", key);

    if let Some(path) = path {
        let mut entry = Map::new();
        entry.insert(name, Value::String(key));
        keyfile::merge_json_file(&path, &Value::Object(entry))?;
        println!("{}", format!("Key saved to {}", path.display()).green());
    }

    Ok(())
}
