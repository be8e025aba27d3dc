use super::record::{FIELD_NAMES, NOT_FOUND};

pub const SYSTEM_PROMPT: &str = "You are an expert at extracting information from insurance documents. Always return valid JSON. Handle OCR-extracted text that may have some formatting issues.";

/// Builds the user message: provenance, the field list, the document text
/// and a JSON template with every key.
pub fn build_user_prompt(text: &str, context: &str) -> String {
    let field_list = FIELD_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");

    let template = FIELD_NAMES
        .iter()
        .map(|name| format!("    \"{}\": \"\"", name))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "{context}\n\n\
         Analyze the following insurance document text and extract these specific fields. \
         Return the response in JSON format with exact field names:\n\n\
         {field_list}\n\n\
         Document text:\n\
         {text}\n\n\
         Please return only a JSON object with these exact keys:\n\
         {{\n{template}\n}}\n\n\
         If any field is not found, use \"{NOT_FOUND}\" as the value."
    )
}

/// JSON schema for the `response_format` of providers with structured output.
pub fn response_schema() -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = FIELD_NAMES
        .iter()
        .map(|name| (name.to_string(), serde_json::json!({ "type": "string" })))
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": FIELD_NAMES,
        "additionalProperties": false
    })
}
