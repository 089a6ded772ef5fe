pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into `section.field` rows.
///
/// Arrays of objects are indexed (`results[0].output_value`); arrays of
/// scalars are joined into one cell.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, val, rows);
            }
        }
        Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{}[{}]", prefix, i), item, rows);
            }
        }
        other => rows.push((prefix.to_string(), format_value(other))),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_sections() {
        let rows = flatten(&json!({
            "summary": {"total_pl_impact": "12.5"},
            "values": ["1", "2"],
            "results": [{"output_value": "3"}],
            "name": null,
        }));
        assert!(rows.contains(&("summary.total_pl_impact".into(), "12.5".into())));
        assert!(rows.contains(&("values".into(), "1, 2".into())));
        assert!(rows.contains(&("results[0].output_value".into(), "3".into())));
        assert!(rows.contains(&("name".into(), String::new())));
    }
}
