//! Response schema for schema-constrained generation.
//!
//! Uses the OpenAPI subset understood by the Gemini API (`OBJECT`, `STRING`).

use serde_json::{json, Value};

/// Field names of the verdict object, all required strings
pub const VERDICT_FIELDS: [&str; 4] = ["winner", "sentence", "roast", "detailed_verdict"];

pub fn verdict_response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = VERDICT_FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "STRING" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": VERDICT_FIELDS,
    })
}
