use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load a JSON document from a path.
pub fn load_json_file(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Write a JSON document, replacing any existing file. Missing parent
/// directories are created.
pub fn write_json_file(path: &Path, data: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Merge the top-level keys of `data` into an existing JSON object file,
/// creating the file when absent. Keys in `data` replace keys already
/// present; everything else is preserved.
pub fn merge_json_file(path: &Path, data: &Value) -> Result<Value> {
    let mut document = if path.exists() {
        load_json_file(path)?
    } else {
        Value::Object(Default::default())
    };

    let (Value::Object(base), Value::Object(update)) = (&mut document, data) else {
        return Err(anyhow!("Key files must contain JSON objects"));
    };
    for (key, value) in update {
        base.insert(key.clone(), value.clone());
    }

    write_json_file(path, &document)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys/api.json");

        write_json_file(&path, &json!({ "apiKey": "abc" })).unwrap();
        let loaded = load_json_file(&path).unwrap();
        assert_eq!(loaded, json!({ "apiKey": "abc" }));
    }

    #[test]
    fn test_merge_preserves_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");

        write_json_file(&path, &json!({ "first": 1 })).unwrap();
        let merged = merge_json_file(&path, &json!({ "second": 2 })).unwrap();

        assert_eq!(merged, json!({ "first": 1, "second": 2 }));
        assert_eq!(load_json_file(&path).unwrap(), merged);
    }

    #[test]
    fn test_merge_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");

        merge_json_file(&path, &json!({ "key": "value" })).unwrap();
        assert_eq!(load_json_file(&path).unwrap(), json!({ "key": "value" }));
    }

    #[test]
    fn test_merge_rejects_non_object_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");

        write_json_file(&path, &json!([1, 2, 3])).unwrap();
        assert!(merge_json_file(&path, &json!({ "key": 1 })).is_err());
    }
}
