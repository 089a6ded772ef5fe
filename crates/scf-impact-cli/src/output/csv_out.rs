use serde_json::Value;
use std::io;

use super::{flatten, format_value};

/// Write output as CSV to stdout.
///
/// Sweep results become one row per grid point; everything else becomes
/// `field,value` rows with dotted field paths.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(rows)) = body.get("results") {
        write_array_csv(&mut wtr, rows);
    } else {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten(body) {
            let _ = wtr.write_record([key, val]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
