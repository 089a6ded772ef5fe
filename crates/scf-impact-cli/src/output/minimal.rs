use serde_json::Value;

use super::format_value;

/// Headline figures, in order of preference.
const PRIORITY_PATHS: [&str; 6] = [
    "summary.total_annual_benefit",
    "base_case_value",
    "summary.total_pl_impact",
    "saved",
    "reset",
    "statement.turnover",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", minimal_line(result));
}

fn minimal_line(result: &Value) -> String {
    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            if !val.is_null() {
                return format_value(val);
            }
        }
    }

    match result {
        Value::Object(map) => match map.iter().next() {
            Some((key, val)) => format!("{}: {}", key, format_value(val)),
            None => String::new(),
        },
        other => format_value(other),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}
