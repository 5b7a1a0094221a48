use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a result: the JSON value verbatim, or the text line.
pub fn print(output_format: OutputFormat, text: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

/// Print a failure; JSON output keeps the API's `{"error": ...}` shape.
pub fn print_error(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "error": message }))?),
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
    Ok(())
}
