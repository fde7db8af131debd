//! Request validation: untyped [`Fields`] in, typed domain values out.
//!
//! Numeric fields accept integers, floats and numeric text. Floats are
//! truncated toward zero, never rounded (`7.9` becomes `7`, `-3.9` becomes
//! `-3`). Dates use the fixed `YYYY-MM-DD` format and land on midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use super::event::MAX_CONTENT_LEN;
use super::{ChangeSet, Event, FieldValue, Fields, Operation, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates `fields` for `operation` and returns a partially filled event.
///
/// For [`Operation::Create`] the returned event always has `event_id == 0`;
/// a client-supplied identifier is ignored. For the other operations
/// `event_id` is copied when present.
///
/// # Errors
///
/// Returns a [`ValidationError`] when a required field is missing or a
/// present field cannot be coerced.
pub fn validate(operation: Operation, fields: &Fields) -> Result<Event, ValidationError> {
    require(operation, fields)?;

    let mut event = Event::new(0, DateTime::<Utc>::default(), String::new());

    if let Some(user_id) = integer(fields, "user_id")? {
        event.user_id = user_id;
    }
    if operation != Operation::Create
        && let Some(event_id) = integer(fields, "event_id")?
    {
        event.event_id = event_id;
    }
    if let Some(date) = date(fields)? {
        event.date = date;
    }
    if let Some(content) = content(fields)? {
        event.content = content;
    }

    Ok(event)
}

/// Validates an update request and returns the change-set to apply.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] when `event_id` is absent, or
/// another [`ValidationError`] when a present field cannot be coerced.
pub fn validate_changes(fields: &Fields) -> Result<ChangeSet, ValidationError> {
    require(Operation::Update, fields)?;

    let event_id = integer(fields, "event_id")?.ok_or(ValidationError::MissingField {
        field: "event_id",
    })?;

    Ok(ChangeSet {
        user_id: integer(fields, "user_id")?,
        date: date(fields)?,
        content: content(fields)?,
        ..ChangeSet::new(event_id)
    })
}

fn require(operation: Operation, fields: &Fields) -> Result<(), ValidationError> {
    match operation
        .required_fields()
        .iter()
        .copied()
        .find(|field| !fields.contains(field))
    {
        Some(field) => Err(ValidationError::MissingField { field }),
        None => Ok(()),
    }
}

fn integer(fields: &Fields, name: &str) -> Result<Option<i64>, ValidationError> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    let invalid = || ValidationError::InvalidNumber {
        field: name.to_string(),
        raw: value.to_string(),
    };

    let n = match value {
        FieldValue::Integer(i) => *i,
        FieldValue::Float(x) => truncate(*x).ok_or_else(invalid)?,
        FieldValue::Text(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => s
                    .parse::<f64>()
                    .ok()
                    .and_then(truncate)
                    .ok_or_else(invalid)?,
            }
        }
    };
    Ok(Some(n))
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(x: f64) -> Option<i64> {
    // `as` saturates out-of-range values and maps NaN to 0, so reject
    // non-finite input first.
    x.is_finite().then(|| x.trunc() as i64)
}

fn date(fields: &Fields) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(value) = fields.get("date") else {
        return Ok(None);
    };
    let raw = value.to_string();
    if !has_date_shape(&raw) {
        return Err(ValidationError::InvalidDate {
            reason: "expected YYYY-MM-DD".to_string(),
            raw,
        });
    }
    let day = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|err| {
        ValidationError::InvalidDate {
            reason: err.to_string(),
            raw: raw.clone(),
        }
    })?;
    Ok(Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))))
}

/// Exactly `DDDD-DD-DD`. `%Y-%m-%d` alone also takes signed years, leading
/// whitespace and unpadded fields.
fn has_date_shape(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn content(fields: &Fields) -> Result<Option<String>, ValidationError> {
    let Some(value) = fields.get("content") else {
        return Ok(None);
    };
    let content = value.to_string();
    let len = content.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(ValidationError::ContentTooLong {
            len,
            max: MAX_CONTENT_LEN,
        });
    }
    Ok(Some(content))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn json_fields(value: serde_json::Value) -> Fields {
        let serde_json::Value::Object(map) = value else {
            panic!("expected object");
        };
        let Ok(fields) = Fields::from_json(map) else {
            panic!("valid fields");
        };
        fields
    }

    fn may_first() -> DateTime<Utc> {
        let Some(date) = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single() else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn create_builds_unstored_event() {
        let fields = json_fields(serde_json::json!({
            "user_id": 3, "date": "2024-05-01", "content": "standup", "event_id": 99
        }));
        let Ok(event) = validate(Operation::Create, &fields) else {
            panic!("valid create");
        };
        assert_eq!(event.user_id, 3);
        assert_eq!(event.event_id, 0);
        assert_eq!(event.date, may_first());
        assert_eq!(event.content, "standup");
    }

    #[test]
    fn create_requires_user_id_then_date() {
        let fields = json_fields(serde_json::json!({"date": "2024-05-01"}));
        assert!(matches!(
            validate(Operation::Create, &fields),
            Err(ValidationError::MissingField { field: "user_id" })
        ));

        let fields = json_fields(serde_json::json!({"user_id": 1}));
        assert!(matches!(
            validate(Operation::Create, &fields),
            Err(ValidationError::MissingField { field: "date" })
        ));
    }

    #[test]
    fn update_and_delete_require_event_id() {
        let fields = json_fields(serde_json::json!({"user_id": 1}));
        assert!(matches!(
            validate(Operation::Delete, &fields),
            Err(ValidationError::MissingField { field: "event_id" })
        ));
        assert!(matches!(
            validate_changes(&fields),
            Err(ValidationError::MissingField { field: "event_id" })
        ));
    }

    #[test]
    fn queries_require_user_id() {
        for op in [
            Operation::EventsForDay,
            Operation::EventsForWeek,
            Operation::EventsForMonth,
        ] {
            let err = validate(op, &Fields::default());
            assert!(matches!(err, Err(ValidationError::MissingField { field: "user_id" })));
        }
    }

    #[test]
    fn floats_truncate_toward_zero() {
        let fields = json_fields(serde_json::json!({"event_id": 7.9, "user_id": -3.9}));
        let Ok(event) = validate(Operation::Delete, &fields) else {
            panic!("valid delete");
        };
        assert_eq!(event.event_id, 7);
        assert_eq!(event.user_id, -3);
    }

    #[test]
    fn query_text_is_parsed_as_number() {
        let fields = Fields::from_pairs([("user_id", "7")]);
        let Ok(event) = validate(Operation::EventsForDay, &fields) else {
            panic!("valid query");
        };
        assert_eq!(event.user_id, 7);

        let fields = Fields::from_pairs([("user_id", "7.99")]);
        let Ok(event) = validate(Operation::EventsForDay, &fields) else {
            panic!("valid query");
        };
        assert_eq!(event.user_id, 7);
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        for raw in ["seven", "NaN", "inf", ""] {
            let fields = Fields::from_pairs([("user_id", raw)]);
            let err = validate(Operation::EventsForDay, &fields);
            assert!(
                matches!(err, Err(ValidationError::InvalidNumber { ref field, .. }) if field == "user_id"),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_date_is_rejected() {
        let fields = json_fields(serde_json::json!({"user_id": 3, "date": "05/01/2024"}));
        let err = validate(Operation::Create, &fields);
        let Err(ValidationError::InvalidDate { raw, .. }) = err else {
            panic!("expected invalid date, got {err:?}");
        };
        assert_eq!(raw, "05/01/2024");

        for raw in ["2024-5-1", " 2024-05-01", "+2024-05-01", "2024-05-01 ", "2024-13-01", "2024-02-30"] {
            let fields = json_fields(serde_json::json!({"user_id": "1", "date": raw}));
            assert!(
                matches!(
                    validate(Operation::Create, &fields),
                    Err(ValidationError::InvalidDate { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn numeric_date_is_rejected() {
        let fields = json_fields(serde_json::json!({"user_id": 3, "date": 20240501}));
        assert!(matches!(
            validate(Operation::Create, &fields),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn content_length_is_bounded() {
        let long = "x".repeat(MAX_CONTENT_LEN + 1);
        let fields = json_fields(serde_json::json!({"user_id": 1, "date": "2024-05-01", "content": long}));
        assert!(matches!(
            validate(Operation::Create, &fields),
            Err(ValidationError::ContentTooLong { len: 129, max: 128 })
        ));

        let exact = "é".repeat(MAX_CONTENT_LEN);
        let fields = json_fields(serde_json::json!({"user_id": 1, "date": "2024-05-01", "content": exact}));
        assert!(validate(Operation::Create, &fields).is_ok());
    }

    #[test]
    fn numeric_content_uses_display_form() {
        let fields = json_fields(serde_json::json!({"user_id": 1, "date": "2024-05-01", "content": 42}));
        let Ok(event) = validate(Operation::Create, &fields) else {
            panic!("valid create");
        };
        assert_eq!(event.content, "42");
    }

    #[test]
    fn change_set_carries_only_present_fields() {
        let fields = json_fields(serde_json::json!({"event_id": 1, "content": "standup moved"}));
        let Ok(changes) = validate_changes(&fields) else {
            panic!("valid update");
        };
        assert_eq!(changes.event_id, 1);
        assert_eq!(changes.user_id, None);
        assert_eq!(changes.date, None);
        assert_eq!(changes.content.as_deref(), Some("standup moved"));
    }

    #[test]
    fn change_set_validates_present_date() {
        let fields = json_fields(serde_json::json!({"event_id": 1, "date": "2024-13-01"}));
        assert!(matches!(
            validate_changes(&fields),
            Err(ValidationError::InvalidDate { .. })
        ));
    }
}
