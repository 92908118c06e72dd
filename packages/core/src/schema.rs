//! JSON Schema for the configuration file.

use crate::config::DeskmateConfig;

const SCHEMA_ID: &str =
    "https://raw.githubusercontent.com/deskmate-app/deskmate/main/deskmate.schema.json";

/// Generates a JSON Schema for the Deskmate configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(DeskmateConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Generates a pretty-printed JSON Schema string.
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}
