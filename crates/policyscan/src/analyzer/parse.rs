use crate::analyzer::record::InsuranceRecord;
use crate::error::AnalysisError;

/// Parses a model reply into a record.
///
/// The reply is tried as strict JSON first. Failing that, the substring from
/// the first `{` to the last `}` is parsed, which tolerates prose or code
/// fences around the object.
pub fn parse_reply(reply: &str) -> Result<InsuranceRecord, AnalysisError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(reply.trim()) {
        return record_from_value(value);
    }

    let json = embedded_object(reply).ok_or_else(|| {
        AnalysisError::MalformedReply("no JSON object found in reply".to_string())
    })?;

    let value = serde_json::from_str::<serde_json::Value>(json)
        .map_err(|e| AnalysisError::MalformedReply(e.to_string()))?;
    record_from_value(value)
}

fn embedded_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

fn record_from_value(value: serde_json::Value) -> Result<InsuranceRecord, AnalysisError> {
    InsuranceRecord::from_json_value(value).map_err(|e| AnalysisError::MalformedReply(e.to_string()))
}
