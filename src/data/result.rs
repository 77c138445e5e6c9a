//! Decoding of verification payloads into [`ValidationResult`]
//!
//! Both live API responses and cached entries go through [`ValidationResult::parse`],
//! so an address read back from the cache is field-identical to the one that was
//! fetched from the API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{ParseError, ValidationStatus};

/// Naive date-time layouts accepted for `dateAdded`, interpreted as UTC
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Outcome of verifying one email address
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Local part of the address, e.g. `mail` in `mail@example.com`
    pub account: String,
    /// Domain part of the address
    pub domain: String,
    /// The full address that was verified
    pub email: String,
    /// Suggested address when a typo was detected, otherwise empty
    pub suggested_spelling: String,
    /// Whether the address belongs to a disposable mail provider
    pub disposable: bool,
    /// Whether the address is a role account such as `support@`
    pub role: bool,
    /// Free-text diagnostic from the API, possibly empty
    pub reason: String,
    /// Verification outcome
    pub result: ValidationStatus,
    /// When the API ran the verification
    pub date_added: DateTime<Utc>,
}

impl ValidationResult {
    /// Builds a result from a field map
    ///
    /// Keys are matched case-insensitively in either camelCase or snake_case.
    /// Unrecognized keys are ignored. A missing or unparsable `dateAdded` falls back
    /// to the current time; a missing or blank `result` becomes
    /// [`ValidationStatus::None`].
    ///
    /// # Errors
    /// * `ParseError::UnknownStatus` if `result` holds a value outside the known set
    pub fn parse(fields: &Map<String, Value>) -> Result<Self, ParseError> {
        let mut account = String::new();
        let mut domain = String::new();
        let mut email = String::new();
        let mut suggested_spelling = String::new();
        let mut disposable = false;
        let mut role = false;
        let mut reason = String::new();
        let mut status = None;
        let mut date_added = None;

        for (key, value) in fields {
            match normalize_key(key).as_str() {
                "account" => account = string_value(value),
                "domain" => domain = string_value(value),
                "email" => email = string_value(value),
                "suggestedspelling" => suggested_spelling = string_value(value),
                "disposable" => disposable = bool_value(value),
                "role" => role = bool_value(value),
                "reason" => reason = string_value(value),
                "result" => status = Some(value),
                "dateadded" => date_added = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            account,
            domain,
            email,
            suggested_spelling,
            disposable,
            role,
            reason,
            result: parse_status(status)?,
            date_added: date_added_or_now(date_added),
        })
    }

    /// Builds a result from a raw JSON response body
    ///
    /// # Errors
    /// * `ParseError::InvalidResponse` if the body is not a JSON object
    /// * `ParseError::UnknownStatus` if `result` is outside the known set
    pub fn from_response_body(body: &[u8]) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ParseError::InvalidResponse(e.to_string()))?;

        match value {
            Value::Object(fields) => Self::parse(&fields),
            other => Err(ParseError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Flattens the result into the map written to the cache
    ///
    /// `result` is stored as its lower-case string and `dateAdded` as RFC 3339,
    /// so [`ValidationResult::parse`] restores an equal value.
    pub fn to_cacheable_mapping(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("account".into(), Value::String(self.account.clone()));
        map.insert("domain".into(), Value::String(self.domain.clone()));
        map.insert("email".into(), Value::String(self.email.clone()));
        map.insert(
            "suggestedSpelling".into(),
            Value::String(self.suggested_spelling.clone()),
        );
        map.insert("disposable".into(), Value::Bool(self.disposable));
        map.insert("role".into(), Value::Bool(self.role));
        map.insert("reason".into(), Value::String(self.reason.clone()));
        map.insert("result".into(), Value::String(self.result.as_str().into()));
        map.insert(
            "dateAdded".into(),
            Value::String(self.date_added.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        map
    }
}

/// Folds `suggestedSpelling`, `suggested_spelling` and `SUGGESTED_SPELLING` together
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn string_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn bool_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

fn parse_status(value: Option<&Value>) -> Result<ValidationStatus, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(ValidationStatus::None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(ValidationStatus::None),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(ParseError::UnknownStatus(other.to_string())),
    }
}

fn date_added_or_now(value: Option<&Value>) -> DateTime<Utc> {
    match value.and_then(parse_timestamp) {
        Some(timestamp) => timestamp,
        None => {
            debug!(value = ?value, "dateAdded missing or unparsable, using current time");
            Utc::now()
        }
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be a JSON object"),
        }
    }

    fn sample_response() -> Map<String, Value> {
        fields(json!({
            "account": "mail",
            "domain": "jojostx.co.uk",
            "email": "mail@jojostx.co.uk",
            "suggestedSpelling": "mail@jojostx.co.uk",
            "disposable": false,
            "role": true,
            "reason": "invalid email",
            "result": "Risky",
            "dateAdded": "2024-03-05T10:20:30Z"
        }))
    }

    #[test]
    fn test_parse_sets_every_field() {
        let result = ValidationResult::parse(&sample_response()).unwrap();

        assert_eq!(result.account, "mail");
        assert_eq!(result.domain, "jojostx.co.uk");
        assert_eq!(result.email, "mail@jojostx.co.uk");
        assert_eq!(result.suggested_spelling, "mail@jojostx.co.uk");
        assert!(!result.disposable);
        assert!(result.role);
        assert_eq!(result.reason, "invalid email");
        assert_eq!(result.result, ValidationStatus::Risky);
        assert_eq!(
            result.date_added,
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_accepts_snake_case_and_mixed_case_keys() {
        let result = ValidationResult::parse(&fields(json!({
            "EMAIL": "a@b.co",
            "suggested_spelling": "a@b.com",
            "Date_Added": "2024-01-01 08:00:00",
            "RESULT": "VALID"
        })))
        .unwrap();

        assert_eq!(result.email, "a@b.co");
        assert_eq!(result.suggested_spelling, "a@b.com");
        assert_eq!(result.result, ValidationStatus::Valid);
        assert_eq!(
            result.date_added,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let mut map = sample_response();
        map.insert("smtpProvider".into(), json!("gmail"));
        map.insert("score".into(), json!(0.87));

        let result = ValidationResult::parse(&map).unwrap();
        assert_eq!(result, ValidationResult::parse(&sample_response()).unwrap());
    }

    #[test]
    fn test_missing_result_maps_to_none() {
        let mut map = sample_response();
        map.remove("result");

        let result = ValidationResult::parse(&map).unwrap();
        assert_eq!(result.result, ValidationStatus::None);
    }

    #[test]
    fn test_empty_or_null_result_maps_to_none() {
        for empty in [json!(""), json!("   "), Value::Null] {
            let mut map = sample_response();
            map.insert("result".into(), empty);
            let result = ValidationResult::parse(&map).unwrap();
            assert_eq!(result.result, ValidationStatus::None);
        }
    }

    #[test]
    fn test_result_is_parsed_case_insensitively() {
        for raw in ["RISKY", "risky", "RiSkY"] {
            let mut map = sample_response();
            map.insert("result".into(), json!(raw));
            let result = ValidationResult::parse(&map).unwrap();
            assert_eq!(result.result, ValidationStatus::Risky);
        }
    }

    #[test]
    fn test_unrecognized_result_is_an_error() {
        let mut map = sample_response();
        map.insert("result".into(), json!("deliverable"));

        let err = ValidationResult::parse(&map).unwrap_err();
        assert!(matches!(err, ParseError::UnknownStatus(ref v) if v == "deliverable"));
    }

    #[test]
    fn test_non_string_result_is_an_error() {
        let mut map = sample_response();
        map.insert("result".into(), json!(3));

        let err = ValidationResult::parse(&map).unwrap_err();
        assert!(matches!(err, ParseError::UnknownStatus(_)));
    }

    #[test]
    fn test_missing_date_added_defaults_to_now() {
        let mut map = sample_response();
        map.remove("dateAdded");

        let before = Utc::now();
        let result = ValidationResult::parse(&map).unwrap();
        let after = Utc::now();

        assert!(result.date_added >= before && result.date_added <= after);
    }

    #[test]
    fn test_unparsable_date_added_defaults_to_now() {
        let mut map = sample_response();
        map.insert("dateAdded".into(), json!("last tuesday"));

        let before = Utc::now();
        let result = ValidationResult::parse(&map).unwrap();
        let after = Utc::now();

        assert!(result.date_added >= before && result.date_added <= after);
    }

    #[test]
    fn test_date_added_accepted_formats() {
        let cases = [
            (json!("2024-01-01T00:00:00Z"), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)),
            (json!("2024-01-01T02:00:00+02:00"), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)),
            (json!("2024-06-15 12:30:45"), Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45)),
            (json!("2024-06-15T12:30:45"), Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45)),
            (json!("2024-06-15"), Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0)),
            (json!(1_704_067_200), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)),
        ];

        for (raw, expected) in cases {
            let mut map = sample_response();
            map.insert("dateAdded".into(), raw.clone());
            let result = ValidationResult::parse(&map).unwrap();
            assert_eq!(result.date_added, expected.unwrap(), "input: {}", raw);
        }
    }

    #[test]
    fn test_bool_fields_accept_loose_values() {
        let result = ValidationResult::parse(&fields(json!({
            "disposable": 1,
            "role": "TRUE"
        })))
        .unwrap();
        assert!(result.disposable);
        assert!(result.role);

        let result = ValidationResult::parse(&fields(json!({
            "disposable": "no",
            "role": null
        })))
        .unwrap();
        assert!(!result.disposable);
        assert!(!result.role);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let result = ValidationResult::parse(&Map::new()).unwrap();
        assert!(result.email.is_empty());
        assert!(result.account.is_empty());
        assert!(result.reason.is_empty());
        assert!(!result.disposable);
        assert_eq!(result.result, ValidationStatus::None);
    }

    #[test]
    fn test_cacheable_mapping_round_trips() {
        let original = ValidationResult::parse(&sample_response()).unwrap();

        let mapping = original.to_cacheable_mapping();
        let restored = ValidationResult::parse(&mapping).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn test_cacheable_mapping_preserves_subsecond_timestamps() {
        let mut original = ValidationResult::parse(&sample_response()).unwrap();
        original.date_added = Utc::now();

        let restored = ValidationResult::parse(&original.to_cacheable_mapping()).unwrap();
        assert_eq!(restored.date_added, original.date_added);
    }

    #[test]
    fn test_cacheable_mapping_stores_status_as_string() {
        let mut map = sample_response();
        map.remove("result");
        let result = ValidationResult::parse(&map).unwrap();

        let mapping = result.to_cacheable_mapping();
        assert_eq!(mapping.get("result"), Some(&json!("none")));
        assert_eq!(mapping.get("suggestedSpelling"), Some(&json!("mail@jojostx.co.uk")));
        assert_eq!(mapping.get("dateAdded"), Some(&json!("2024-03-05T10:20:30Z")));
        assert_eq!(mapping.len(), 9);
    }

    #[test]
    fn test_from_response_body() {
        let body = br#"{"email":"x@y.co","result":"valid","dateAdded":"2024-01-01T00:00:00Z"}"#;
        let result = ValidationResult::from_response_body(body).unwrap();

        assert_eq!(result.email, "x@y.co");
        assert_eq!(result.result, ValidationStatus::Valid);
        assert_eq!(result.date_added, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_response_body_rejects_non_object() {
        let err = ValidationResult::from_response_body(b"[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::InvalidResponse(ref m) if m.contains("an array")));

        let err = ValidationResult::from_response_body(b"not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidResponse(_)));
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let result = ValidationResult::parse(&sample_response()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["suggestedSpelling"], "mail@jojostx.co.uk");
        assert_eq!(json["result"], "risky");
        assert!(json.get("dateAdded").is_some());
    }
}
