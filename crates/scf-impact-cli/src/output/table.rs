use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_value};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_field_table(value);
            }
        }
        _ => println!("{}", format_value(value)),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result.get("matrix") {
        Some(Value::Array(matrix)) if !matrix.is_empty() => print_matrix(result, matrix),
        _ => match result.get("results") {
            Some(Value::Array(rows)) => print_array_table(rows),
            _ => print_field_table(result),
        },
    }

    if let Some(Value::Array(lines)) = envelope.get("statement_lines") {
        println!("\nAdjusted statements:");
        print_array_table(lines);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(value: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(value) {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

/// Two-way sweep grid: variable 1 down the side, variable 2 across the top.
fn print_matrix(result: &Value, matrix: &[Value]) {
    let empty = Vec::new();
    let v1_values = result
        .get("variable_1_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let v2_values = result
        .get("variable_2_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let corner = format!(
        "{} \\ {}",
        result.get("variable_1_name").map(format_value).unwrap_or_default(),
        result.get("variable_2_name").map(format_value).unwrap_or_default(),
    );

    let mut builder = Builder::default();
    let mut header = vec![corner];
    header.extend(v2_values.iter().map(format_value));
    builder.push_record(header);

    for (v1, row) in v1_values.iter().zip(matrix) {
        let mut record = vec![format_value(v1)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));

    if let Some(metric) = result.get("output_metric") {
        println!("Metric: {}", format_value(metric));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        // Row labels read best in the first column
        let mut headers: Vec<String> = first.keys().cloned().collect();
        if let Some(pos) = headers.iter().position(|h| h == "label") {
            let label = headers.remove(pos);
            headers.insert(0, label);
        }
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}
