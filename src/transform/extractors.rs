//! Batch extractors for deployment-specific issue fields.
//!
//! Each extractor returns exactly one cell per input issue. A failure on any
//! single issue degrades the whole batch to `"None"` labels.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::ExtractError;
use crate::models::issue::IssueFields;
use crate::models::row::{Cell, NONE_LABEL};
use crate::transform::timefmt::format_work_time;

fn sprint_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"name=(.*?),").expect("sprint pattern is valid"))
}

pub fn sprint_names(batch: &[&IssueFields], field_id: &str) -> Vec<String> {
    run_batch("Sprint", batch, |fields| Ok(sprint_name(fields.custom_field(field_id))))
        .into_iter()
        .map(|cell| cell.unwrap_or_else(|| NONE_LABEL.to_string()))
        .collect()
}

pub fn bug_sources(batch: &[&IssueFields], field_id: &str) -> Vec<String> {
    run_batch("Bug Source", batch, |fields| {
        bug_source(field_id, fields.custom_field(field_id))
    })
    .into_iter()
    .map(|cell| cell.unwrap_or_else(|| NONE_LABEL.to_string()))
    .collect()
}

/// `timespent` formatted as work time. Missing gives `"None"`; present but
/// non-positive gives an empty cell.
pub fn time_spent(batch: &[&IssueFields]) -> Vec<Cell> {
    let extracted = run_batch("timespent", batch, |fields| match &fields.timespent {
        None | Some(Value::Null) => Ok(Some(Cell::none_label())),
        Some(Value::Number(n)) => Ok(Some(format_work_time(n.as_f64()).into())),
        Some(other) => Err(ExtractError::NotANumber {
            field: "timespent".to_string(),
            value: other.to_string(),
        }),
    });

    extracted
        .into_iter()
        .map(|cell| cell.unwrap_or_else(Cell::none_label))
        .collect()
}

/// Runs `extract` over the batch, or returns all `None` if any record fails.
fn run_batch<T, F>(name: &str, batch: &[&IssueFields], extract: F) -> Vec<Option<T>>
where
    F: Fn(&IssueFields) -> Result<Option<T>, ExtractError>,
{
    let result: Result<Vec<Option<T>>, ExtractError> =
        batch.iter().map(|fields| extract(fields)).collect();

    match result {
        Ok(values) => values,
        Err(e) => {
            log::warn!("{} Error: {}", name, e);
            batch.iter().map(|_| None).collect()
        }
    }
}

fn sprint_name(field: Option<&Value>) -> Option<String> {
    let field = field?;

    // Jira Cloud returns sprint objects rather than the legacy toString blob
    if let Some(name) = first_sprint_object_name(field) {
        return Some(name);
    }

    let blob = render_blob(field);
    sprint_name_pattern()
        .captures(&blob)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn first_sprint_object_name(field: &Value) -> Option<String> {
    let object = match field {
        Value::Object(_) => field,
        Value::Array(items) => items.first().filter(|v| v.is_object())?,
        _ => return None,
    };
    object.get("name").and_then(Value::as_str).map(str::to_string)
}

fn render_blob(field: &Value) -> String {
    match field {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_blob)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// `{value: ...}` -> value. Text or lists without a `value` entry fall back to
/// `None` for that record; anything that cannot be looked up by key is an error.
fn bug_source(field_id: &str, field: Option<&Value>) -> Result<Option<String>, ExtractError> {
    let unexpected = |other: &Value| ExtractError::UnexpectedShape {
        field: field_id.to_string(),
        found: json_kind(other),
    };

    let Some(value) = field else {
        return Ok(None);
    };

    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Object(map) => Ok(map.get("value").and_then(scalar_text)),
        Value::String(s) if s.contains("value") => Err(unexpected(value)),
        Value::String(_) => Ok(None),
        Value::Array(items) if items.iter().any(|i| i.as_str() == Some("value")) => {
            Err(unexpected(value))
        }
        Value::Array(_) => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        other => Err(unexpected(other)),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPRINT: &str = "customfield_10018";
    const BUG: &str = "customfield_11504";

    fn fields(value: Value) -> IssueFields {
        serde_json::from_value(value).unwrap()
    }

    fn refs(items: &[IssueFields]) -> Vec<&IssueFields> {
        items.iter().collect()
    }

    #[test]
    fn test_sprint_name_from_legacy_blob() {
        let batch = vec![
            fields(json!({SPRINT: [
                "com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=42,rapidViewId=3,state=ACTIVE,name=DEV Sprint 12,startDate=2024-03-04]"
            ]})),
            fields(json!({SPRINT: "Sprint@9[id=1,name=Hotfix,goal=]"})),
        ];

        assert_eq!(sprint_names(&refs(&batch), SPRINT), vec!["DEV Sprint 12", "Hotfix"]);
    }

    #[test]
    fn test_sprint_name_from_cloud_objects() {
        let batch = vec![fields(json!({SPRINT: [{"id": 5, "name": "Cloud Sprint 3", "state": "closed"}]}))];
        assert_eq!(sprint_names(&refs(&batch), SPRINT), vec!["Cloud Sprint 3"]);
    }

    #[test]
    fn test_sprint_malformed_blobs_yield_none() {
        let batch = vec![
            fields(json!({SPRINT: "no sprint here"})),
            fields(json!({SPRINT: "name=missing-trailing-comma"})),
            fields(json!({})),
            fields(json!({SPRINT: null})),
        ];

        assert_eq!(sprint_names(&refs(&batch), SPRINT), vec!["None"; 4]);
    }

    #[test]
    fn test_bug_source_values() {
        let batch = vec![
            fields(json!({BUG: {"value": "Customer", "id": "10100"}})),
            fields(json!({BUG: {"id": "10101"}})),
            fields(json!({})),
        ];

        assert_eq!(bug_sources(&refs(&batch), BUG), vec!["Customer", "None", "None"]);
    }

    #[test]
    fn test_bug_source_text_or_list_falls_back_per_record() {
        let batch = vec![
            fields(json!({BUG: {"value": "QA"}})),
            fields(json!({BUG: "free text"})),
            fields(json!({BUG: ["Customer", "Internal"]})),
            fields(json!({BUG: ""})),
        ];

        assert_eq!(
            bug_sources(&refs(&batch), BUG),
            vec!["QA", "None", "None", "None"]
        );
    }

    #[test]
    fn test_bug_source_unreadable_value_degrades_whole_batch() {
        let batch = vec![
            fields(json!({BUG: {"value": "QA"}})),
            fields(json!({BUG: 42})),
        ];
        assert_eq!(bug_sources(&refs(&batch), BUG), vec!["None", "None"]);

        let batch = vec![
            fields(json!({BUG: {"value": "QA"}})),
            fields(json!({BUG: "a value string"})),
        ];
        assert_eq!(bug_sources(&refs(&batch), BUG), vec!["None", "None"]);
    }

    #[test]
    fn test_time_spent_formats_and_sentinels() {
        let batch = vec![
            fields(json!({"timespent": 3661})),
            fields(json!({"timespent": 57600})),
            fields(json!({"timespent": 0})),
            fields(json!({})),
        ];

        assert_eq!(
            time_spent(&refs(&batch)),
            vec![
                Cell::text("01:01:01"),
                Cell::text("2 days, 00:00:00"),
                Cell::Empty,
                Cell::text("None"),
            ]
        );
    }

    #[test]
    fn test_time_spent_non_numeric_degrades_whole_batch() {
        let batch = vec![
            fields(json!({"timespent": 3600})),
            fields(json!({"timespent": "an hour"})),
        ];

        assert_eq!(time_spent(&refs(&batch)), vec![Cell::text("None"); 2]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(sprint_names(&[], SPRINT).is_empty());
        assert!(bug_sources(&[], BUG).is_empty());
        assert!(time_spent(&[]).is_empty());
    }
}
