use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON scenario file as a generic value, so partial records can be
/// merged over the defaults.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.exists() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {}", resolved.display()).into());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = read_json_value("/no/such/scenario.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_reads_partial_record() {
        let path = std::env::temp_dir().join(format!("scfi-input-{}.json", std::process::id()));
        fs::write(&path, r#"{"program": {"new_dpo": "120"}}"#).unwrap();
        let value = read_json_value(path.to_str().unwrap()).unwrap();
        assert_eq!(value["program"]["new_dpo"], "120");
        let _ = fs::remove_file(&path);
    }
}
