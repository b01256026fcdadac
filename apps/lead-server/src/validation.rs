//! Lead payload validation.
//!
//! Lead bodies arrive as raw JSON so that missing fields, wrong types and
//! out-of-enum values can each be reported with their own message. The
//! presence check stops at the first failure; every later rule is evaluated
//! and all violations are returned together.

use entities::{Lead, LeadFields, LeadPriority, LeadSource, LeadStatus};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Wire names of the fields every lead must carry.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "source",
    "salesAgent",
    "status",
    "tags",
    "timeToClose",
    "priority",
];

/// Largest `timeToClose` a store column can hold.
pub const MAX_TIME_TO_CLOSE: u64 = i64::MAX as u64;

/// Category of a rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    InvalidType,
    InvalidEnum,
    InvalidRange,
    InvalidReference,
    InvalidFormat,
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

/// Why a lead payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more required fields are absent or null.
    #[error("All fields are required.")]
    MissingFields(Vec<&'static str>),

    /// Fields are present but break the type, enum, or range rules.
    #[error("Invalid input")]
    Invalid(Vec<Violation>),
}

impl ValidationError {
    /// Returns one message per problem.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::MissingFields(fields) => fields
                .iter()
                .map(|field| format!("'{field}' is required"))
                .collect(),
            Self::Invalid(violations) => violations.iter().map(|v| v.message.clone()).collect(),
        }
    }

    /// Returns the violations, empty for missing fields.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::MissingFields(_) => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

fn one_of(field: &str, names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("\"{name}\"")).collect();
    format!(
        "Invalid input: '{field}' must be one of [{}]",
        quoted.join(",")
    )
}

/// Validates a lead payload and converts it to typed fields.
pub fn validate_lead(payload: &Value) -> Result<LeadFields, ValidationError> {
    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| object.get(*field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut violations = Vec::new();

    let name = payload["name"].as_str().map(str::to_string);
    if name.is_none() {
        violations.push(Violation::new(
            "name",
            ViolationKind::InvalidType,
            "Invalid input: 'name' must be a string",
        ));
    }

    let source = payload["source"].as_str().and_then(LeadSource::parse);
    if source.is_none() {
        violations.push(Violation::new(
            "source",
            ViolationKind::InvalidEnum,
            one_of("source", &LeadSource::names()),
        ));
    }

    let status = payload["status"].as_str().and_then(LeadStatus::parse);
    if status.is_none() {
        violations.push(Violation::new(
            "status",
            ViolationKind::InvalidEnum,
            one_of("status", &LeadStatus::names()),
        ));
    }

    let priority = payload["priority"].as_str().and_then(LeadPriority::parse);
    if priority.is_none() {
        violations.push(Violation::new(
            "priority",
            ViolationKind::InvalidEnum,
            one_of("priority", &LeadPriority::names()),
        ));
    }

    let tags = parse_tags(&payload["tags"]);
    if tags.is_none() {
        violations.push(Violation::new(
            "tags",
            ViolationKind::InvalidType,
            "Invalid input: 'tags' must be an array of strings",
        ));
    }

    let time_to_close = match parse_time_to_close(&payload["timeToClose"]) {
        Ok(days) => Some(days),
        Err(violation) => {
            violations.push(violation);
            None
        }
    };

    let sales_agent_ids = parse_agent_ids(&payload["salesAgent"]);
    if sales_agent_ids.is_none() {
        violations.push(Violation::new(
            "salesAgent",
            ViolationKind::InvalidReference,
            "Invalid input: 'salesAgent' must be a non-empty array of valid ids",
        ));
    }

    match (name, source, status, priority, tags, time_to_close, sales_agent_ids) {
        (
            Some(name),
            Some(source),
            Some(status),
            Some(priority),
            Some(tags),
            Some(time_to_close),
            Some(sales_agent_ids),
        ) if violations.is_empty() => Ok(LeadFields {
            name,
            source,
            sales_agent_ids,
            status,
            tags,
            time_to_close,
            priority,
        }),
        _ => Err(ValidationError::Invalid(violations)),
    }
}

/// Accepts an array of strings; duplicates are dropped, order kept.
fn parse_tags(value: &Value) -> Option<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();
    for tag in value.as_array()? {
        let tag = tag.as_str()?;
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Some(tags)
}

/// Accepts integral JSON numbers from 1 up to [`MAX_TIME_TO_CLOSE`],
/// including `10.0`.
fn parse_time_to_close(value: &Value) -> Result<u64, Violation> {
    let not_positive = || {
        Violation::new(
            "timeToClose",
            ViolationKind::InvalidRange,
            "Invalid input: 'timeToClose' must be a positive integer",
        )
    };
    let too_large = || {
        Violation::new(
            "timeToClose",
            ViolationKind::InvalidRange,
            format!("Invalid input: 'timeToClose' must not exceed {MAX_TIME_TO_CLOSE}"),
        )
    };

    let days = match value.as_u64() {
        Some(days) => days,
        None => {
            let f = value.as_f64().ok_or_else(not_positive)?;
            if f.fract() != 0.0 || f < 1.0 {
                return Err(not_positive());
            }
            // 2^63, the first float past the limit.
            if f >= 9_223_372_036_854_775_808.0 {
                return Err(too_large());
            }
            f as u64
        }
    };

    match days {
        0 => Err(not_positive()),
        days if days > MAX_TIME_TO_CLOSE => Err(too_large()),
        days => Ok(days),
    }
}

/// Accepts a non-empty array of ids, or a single id string.
fn parse_agent_ids(value: &Value) -> Option<Vec<Uuid>> {
    let raw: Vec<&Value> = match value {
        Value::String(_) => vec![value],
        Value::Array(items) if !items.is_empty() => items.iter().collect(),
        _ => return None,
    };

    let mut ids: Vec<Uuid> = Vec::with_capacity(raw.len());
    for item in raw {
        let id: Uuid = item.as_str()?.parse().ok()?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(ids)
}

/// Validates a new sales agent's name and email, returning them trimmed.
pub fn validate_sales_agent(
    name: Option<&str>,
    email: Option<&str>,
) -> Result<(String, String), ValidationError> {
    let name = name.map(str::trim).unwrap_or_default();
    let email = email.map(str::trim).unwrap_or_default();

    let mut violations = Vec::new();
    if name.is_empty() {
        violations.push(Violation::new(
            "name",
            ViolationKind::InvalidType,
            "Invalid input: 'name' must be a non-empty string",
        ));
    }
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        violations.push(Violation::new(
            "email",
            ViolationKind::InvalidFormat,
            "Invalid input: 'email' must be a valid email address",
        ));
    }

    if violations.is_empty() {
        Ok((name.to_string(), email.to_string()))
    } else {
        Err(ValidationError::Invalid(violations))
    }
}

/// Renders the editable fields of `lead` in wire form.
pub fn lead_payload(lead: &Lead) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("name".into(), Value::from(lead.name.clone()));
    payload.insert("source".into(), Value::from(lead.source.as_str()));
    payload.insert(
        "salesAgent".into(),
        Value::from(
            lead.sales_agent_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>(),
        ),
    );
    payload.insert("status".into(), Value::from(lead.status.as_str()));
    payload.insert("tags".into(), Value::from(lead.tags.clone()));
    payload.insert("timeToClose".into(), Value::from(lead.time_to_close));
    payload.insert("priority".into(), Value::from(lead.priority.as_str()));
    payload
}

/// Overlays the editable fields of `patch` on the stored lead.
///
/// Keys outside [`REQUIRED_FIELDS`] are ignored; an explicit `null` clears a
/// field, which the validator then reports as missing.
pub fn merge_lead_payload(prior: &Lead, patch: &Map<String, Value>) -> Value {
    let mut merged = lead_payload(prior);
    for field in REQUIRED_FIELDS {
        if let Some(value) = patch.get(field) {
            merged.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_payload() -> Value {
        json!({
            "name": "Acme",
            "source": "Website",
            "salesAgent": [Uuid::new_v4().to_string()],
            "status": "New",
            "tags": ["hot", "enterprise"],
            "timeToClose": 10,
            "priority": "High"
        })
    }

    fn kinds(err: &ValidationError) -> Vec<(&'static str, ViolationKind)> {
        err.violations().iter().map(|v| (v.field, v.kind)).collect()
    }

    #[test]
    fn test_valid_payload() {
        let fields = validate_lead(&valid_payload()).unwrap();

        assert_eq!(fields.name, "Acme");
        assert_eq!(fields.source, LeadSource::Website);
        assert_eq!(fields.status, LeadStatus::New);
        assert_eq!(fields.priority, LeadPriority::High);
        assert_eq!(fields.tags, vec!["hot", "enterprise"]);
        assert_eq!(fields.time_to_close, 10);
        assert_eq!(fields.sales_agent_ids.len(), 1);
    }

    #[test]
    fn test_missing_fields_short_circuit() {
        let mut payload = valid_payload();
        payload["priority"] = Value::Null;
        payload.as_object_mut().unwrap().remove("tags");
        payload["source"] = json!("Carrier Pigeon");

        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["tags", "priority"])
        );
        assert_eq!(err.to_string(), "All fields are required.");
        assert_eq!(err.details(), vec!["'tags' is required", "'priority' is required"]);
    }

    #[test]
    fn test_non_object_is_all_missing() {
        let err = validate_lead(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(REQUIRED_FIELDS.to_vec()));
    }

    #[test]
    fn test_all_violations_reported() {
        let payload = json!({
            "name": 42,
            "source": "Carrier Pigeon",
            "salesAgent": [],
            "status": "Won",
            "tags": ["ok", 7],
            "timeToClose": 0,
            "priority": "Urgent"
        });

        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![
                ("name", ViolationKind::InvalidType),
                ("source", ViolationKind::InvalidEnum),
                ("status", ViolationKind::InvalidEnum),
                ("priority", ViolationKind::InvalidEnum),
                ("tags", ViolationKind::InvalidType),
                ("timeToClose", ViolationKind::InvalidRange),
                ("salesAgent", ViolationKind::InvalidReference),
            ]
        );
    }

    #[test]
    fn test_enum_messages_list_allowed_values() {
        let mut payload = valid_payload();
        payload["source"] = json!("Billboard");

        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            err.details(),
            vec![
                "Invalid input: 'source' must be one of \
                 [\"Website\",\"Referral\",\"Advertisement\",\"Cold Call\",\"Email\",\"Other\"]"
            ]
        );
    }

    #[test]
    fn test_time_to_close_rules() {
        for (value, ok) in [
            (json!(1), true),
            (json!(10.0), true),
            (json!(-3), false),
            (json!(2.5), false),
            (json!("10"), false),
            (json!(5_000_000_000u64), true),
            (json!(MAX_TIME_TO_CLOSE), true),
            (json!(0), false),
            (json!(MAX_TIME_TO_CLOSE + 1), false),
        ] {
            let mut payload = valid_payload();
            payload["timeToClose"] = value.clone();
            assert_eq!(validate_lead(&payload).is_ok(), ok, "timeToClose = {value}");
        }
    }

    #[test]
    fn test_time_to_close_cap_has_own_message() {
        let mut payload = valid_payload();
        payload["timeToClose"] = json!(u64::MAX);

        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            err.details(),
            vec![format!(
                "Invalid input: 'timeToClose' must not exceed {MAX_TIME_TO_CLOSE}"
            )]
        );

        payload["timeToClose"] = json!(-4);
        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            err.details(),
            vec!["Invalid input: 'timeToClose' must be a positive integer"]
        );
    }

    #[test]
    fn test_sales_agent_forms() {
        let id = Uuid::new_v4();

        let mut payload = valid_payload();
        payload["salesAgent"] = json!(id.to_string());
        assert_eq!(validate_lead(&payload).unwrap().sales_agent_ids, vec![id]);

        payload["salesAgent"] = json!([id.to_string(), id.to_string()]);
        assert_eq!(validate_lead(&payload).unwrap().sales_agent_ids, vec![id]);

        payload["salesAgent"] = json!([id.to_string(), "not-an-id"]);
        let err = validate_lead(&payload).unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("salesAgent", ViolationKind::InvalidReference)]
        );
    }

    #[test]
    fn test_duplicate_tags_collapsed() {
        let mut payload = valid_payload();
        payload["tags"] = json!(["hot", "hot", "warm"]);
        assert_eq!(validate_lead(&payload).unwrap().tags, vec!["hot", "warm"]);
    }

    #[test]
    fn test_sales_agent_rules() {
        assert_eq!(
            validate_sales_agent(Some(" Alice "), Some("alice@example.com")).unwrap(),
            ("Alice".to_string(), "alice@example.com".to_string())
        );

        let err = validate_sales_agent(Some("  "), Some("alice.example.com")).unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![
                ("name", ViolationKind::InvalidType),
                ("email", ViolationKind::InvalidFormat),
            ]
        );

        let err = validate_sales_agent(None, Some("@example.com")).unwrap_err();
        assert_eq!(err.details().len(), 2);
    }

    #[test]
    fn test_merge_overlays_patch() {
        let fields = validate_lead(&valid_payload()).unwrap();
        let lead = Lead::new(fields);

        let patch = json!({"status": "Closed", "createdAt": "1970-01-01T00:00:00Z"});
        let merged = merge_lead_payload(&lead, patch.as_object().unwrap());

        assert_eq!(merged["status"], "Closed");
        assert_eq!(merged["name"], "Acme");
        assert!(merged.get("createdAt").is_none());

        let fields = validate_lead(&merged).unwrap();
        assert_eq!(fields.status, LeadStatus::Closed);
        assert_eq!(fields.sales_agent_ids, lead.sales_agent_ids);
    }

    #[test]
    fn test_merge_null_clears_field() {
        let lead = Lead::new(validate_lead(&valid_payload()).unwrap());
        let patch = json!({"name": null});
        let merged = merge_lead_payload(&lead, patch.as_object().unwrap());

        assert_eq!(
            validate_lead(&merged).unwrap_err(),
            ValidationError::MissingFields(vec!["name"])
        );
    }
}
