//! Transforms shared by provider mapping tables.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::TransformError;
use crate::field::FieldValue;
use crate::mapping::Inbound;

/// Outbound transform for local-only fields: never sent to the provider.
pub fn omit(_: &FieldValue) -> Result<Option<Value>, TransformError> {
    Ok(None)
}

/// Outbound timestamp as RFC 3339 in UTC with millisecond precision.
/// `Null` stays an explicit `null`.
pub fn timestamp_to_rfc3339(value: &FieldValue) -> Result<Option<Value>, TransformError> {
    match value {
        FieldValue::Timestamp(t) => Ok(Some(Value::String(format_rfc3339(t)))),
        FieldValue::Null => Ok(Some(Value::Null)),
        other => Err(unexpected(other)),
    }
}

/// Inbound RFC 3339 timestamp under the entry's own key.
pub fn rfc3339_to_timestamp(inbound: &Inbound<'_>) -> Result<Option<FieldValue>, TransformError> {
    inbound.raw.map(parse_timestamp).transpose()
}

/// Parse a JSON timestamp. Accepts full RFC 3339 and bare `YYYY-MM-DD`
/// (midnight UTC). `null` and `""` are `Null`.
pub fn parse_timestamp(value: &Value) -> Result<FieldValue, TransformError> {
    let s = match value {
        Value::Null => return Ok(FieldValue::Null),
        Value::String(s) => s.trim(),
        other => {
            return Err(TransformError::new(format!(
                "expected a timestamp string, got {other}"
            )));
        }
    };

    if s.is_empty() {
        return Ok(FieldValue::Null);
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(FieldValue::Timestamp(t.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| FieldValue::Timestamp(dt.and_utc()))
        .ok_or_else(|| TransformError::new(format!("invalid timestamp '{s}'")))
}

pub fn format_rfc3339(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Inbound text where an empty string means "no value".
pub fn text_or_null(value: &Value) -> Result<FieldValue, TransformError> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::String(s) if s.is_empty() => Ok(FieldValue::Null),
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        other => Err(TransformError::new(format!(
            "expected a string, got {other}"
        ))),
    }
}

pub fn unexpected(value: &FieldValue) -> TransformError {
    TransformError::new(format!("unexpected {} value", value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_normalizes_offsets_and_dates() {
        assert_eq!(
            parse_timestamp(&json!("2024-01-05T01:30:00-05:00")).unwrap(),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 5, 6, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(&json!("2024-01-05")).unwrap(),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(&json!("")).unwrap(), FieldValue::Null);
        assert_eq!(parse_timestamp(&Value::Null).unwrap(), FieldValue::Null);
        assert!(parse_timestamp(&json!("next week")).is_err());
        assert!(parse_timestamp(&json!(1704412800)).is_err());
    }

    #[test]
    fn test_timestamp_reformat_is_canonical() {
        let parsed = parse_timestamp(&json!("2024-01-05T10:00:00.123456+01:00")).unwrap();
        assert_eq!(
            timestamp_to_rfc3339(&parsed).unwrap(),
            Some(json!("2024-01-05T09:00:00.123Z"))
        );
        assert_eq!(
            timestamp_to_rfc3339(&FieldValue::Null).unwrap(),
            Some(Value::Null)
        );
    }

    #[test]
    fn test_text_or_null() {
        assert_eq!(text_or_null(&json!("")).unwrap(), FieldValue::Null);
        assert_eq!(
            text_or_null(&json!("notes")).unwrap(),
            FieldValue::Text("notes".into())
        );
        assert!(text_or_null(&json!({"content": "x"})).is_err());
    }
}
