use serde::{Deserialize, Deserializer, Serialize};

/// Value used for any field the document does not contain.
pub const NOT_FOUND: &str = "Not Found";

/// Field names in column order; these are also the JSON keys.
pub const FIELD_NAMES: [&str; 11] = [
    "Current Policy number",
    "Previous Policy number",
    "Customer Name",
    "Vehicle Number",
    "Sum Insured",
    "OD premium",
    "TP premium",
    "Net Premium(Before Taxes)",
    "Total Premium(After Taxes)",
    "Insurance Company name",
    "Intermediary Name",
];

/// The eleven insurance fields extracted from one document.
///
/// Deserialization is lenient: numbers and booleans are stringified, and
/// missing, `null` or blank values become [`NOT_FOUND`]. Unknown keys are
/// dropped, so a parsed record always carries exactly the eleven fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRecord {
    #[serde(
        rename = "Current Policy number",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub current_policy_number: String,

    #[serde(
        rename = "Previous Policy number",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub previous_policy_number: String,

    #[serde(
        rename = "Customer Name",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub customer_name: String,

    #[serde(
        rename = "Vehicle Number",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub vehicle_number: String,

    #[serde(
        rename = "Sum Insured",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub sum_insured: String,

    #[serde(
        rename = "OD premium",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub od_premium: String,

    #[serde(
        rename = "TP premium",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub tp_premium: String,

    #[serde(
        rename = "Net Premium(Before Taxes)",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub net_premium: String,

    #[serde(
        rename = "Total Premium(After Taxes)",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub total_premium: String,

    #[serde(
        rename = "Insurance Company name",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub insurance_company: String,

    #[serde(
        rename = "Intermediary Name",
        default = "not_found",
        deserialize_with = "lenient_field"
    )]
    pub intermediary_name: String,
}

impl Default for InsuranceRecord {
    fn default() -> Self {
        Self {
            current_policy_number: not_found(),
            previous_policy_number: not_found(),
            customer_name: not_found(),
            vehicle_number: not_found(),
            sum_insured: not_found(),
            od_premium: not_found(),
            tp_premium: not_found(),
            net_premium: not_found(),
            total_premium: not_found(),
            insurance_company: not_found(),
            intermediary_name: not_found(),
        }
    }
}

impl InsuranceRecord {
    /// `(name, value)` pairs in column order.
    pub fn fields(&self) -> [(&'static str, &str); 11] {
        [
            (FIELD_NAMES[0], self.current_policy_number.as_str()),
            (FIELD_NAMES[1], self.previous_policy_number.as_str()),
            (FIELD_NAMES[2], self.customer_name.as_str()),
            (FIELD_NAMES[3], self.vehicle_number.as_str()),
            (FIELD_NAMES[4], self.sum_insured.as_str()),
            (FIELD_NAMES[5], self.od_premium.as_str()),
            (FIELD_NAMES[6], self.tp_premium.as_str()),
            (FIELD_NAMES[7], self.net_premium.as_str()),
            (FIELD_NAMES[8], self.total_premium.as_str()),
            (FIELD_NAMES[9], self.insurance_company.as_str()),
            (FIELD_NAMES[10], self.intermediary_name.as_str()),
        ]
    }

    pub fn values(&self) -> Vec<String> {
        self.fields().iter().map(|(_, v)| v.to_string()).collect()
    }

    /// Number of fields holding something other than [`NOT_FOUND`].
    pub fn found_count(&self) -> usize {
        self.fields().iter().filter(|(_, v)| *v != NOT_FOUND).count()
    }

    /// Builds a record from a JSON object of field names to values.
    ///
    /// Anything other than an object is rejected, including arrays the
    /// derived impl would otherwise map onto fields by position.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object of insurance fields, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn not_found() -> String {
    NOT_FOUND.to_string()
}

fn lenient_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(field_text(value))
}

fn field_text(value: Option<serde_json::Value>) -> String {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => not_found(),
        Some(Value::String(s)) if s.trim().is_empty() => not_found(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
