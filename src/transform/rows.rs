use crate::config::settings::FieldsConfig;
use crate::models::issue::{Issue, IssueFields, Named, User};
use crate::models::row::{Cell, Row, NONE_LABEL};
use crate::transform::extractors;
use crate::transform::timefmt::{format_original_estimate, parse_jira_date};

/// `https://jira.example.com/rest/api/2/search?...` -> `https://jira.example.com/browse/KEY`
pub fn browse_url(base_url: &str, key: &str) -> String {
    let host = base_url.split("/rest").next().unwrap_or(base_url);
    format!("{}/browse/{}", host.trim_end_matches('/'), key)
}

/// One row per issue, in input order. `Time_Spent` and `Estimated_Time`
/// are left empty for `transform::sla`.
pub fn build_rows(issues: &[Issue], base_url: &str, custom_fields: &FieldsConfig) -> Vec<Row> {
    let batch: Vec<&IssueFields> = issues.iter().map(|issue| &issue.fields).collect();

    let sprints = extractors::sprint_names(&batch, &custom_fields.sprint);
    let bug_sources = extractors::bug_sources(&batch, &custom_fields.bug_source);
    let spent = extractors::time_spent(&batch);

    issues
        .iter()
        .zip(sprints)
        .zip(bug_sources)
        .zip(spent)
        .enumerate()
        .map(|(i, (((issue, sprint), bug_source), time_spent_logged))| {
            let fields = &issue.fields;
            let updated_date = parse_jira_date(fields.updated.as_deref());

            Row {
                index: i + 1,
                assignee_name: user_email(&fields.assignee),
                project_name: name_or(&fields.project, ""),
                issue_type: name_or(&fields.issuetype, ""),
                issue_key: issue.key.clone(),
                priority: name_or(&fields.priority, ""),
                status: name_or(&fields.status, ""),
                reporter_name: display_name(&fields.reporter),
                creator_name: display_name(&fields.creator),
                resolution: name_or(&fields.resolution, NONE_LABEL),
                resolution_date: parse_jira_date(fields.resolutiondate.as_deref()),
                activity_date: updated_date.clone(),
                created_date: parse_jira_date(fields.created.as_deref()),
                updated_date,
                link: browse_url(base_url, &issue.key),
                time_original_estimate: format_original_estimate(fields.timeoriginalestimate),
                time_estimate: fields.timeestimate.unwrap_or(0.0),
                aggregate_time_original_estimate: fields
                    .aggregatetimeoriginalestimate
                    .unwrap_or(0.0),
                time_spent_logged,
                aggregate_time_spent: fields.aggregatetimespent.unwrap_or(0.0),
                sprint,
                bug_source,
                labels: fields.labels.join(", "),
                time_spent: Cell::Empty,
                estimated_time: Cell::Empty,
            }
        })
        .collect()
}

fn name_or(named: &Option<Named>, default: &str) -> String {
    named
        .as_ref()
        .and_then(|n| n.name.clone())
        .unwrap_or_else(|| default.to_string())
}

fn user_email(user: &Option<User>) -> String {
    user.as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or_else(|| NONE_LABEL.to_string())
}

fn display_name(user: &Option<User>) -> String {
    user.as_ref()
        .and_then(|u| u.display_name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(value: serde_json::Value) -> Issue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_browse_url() {
        assert_eq!(
            browse_url("https://jira.example.com", "DEV-1"),
            "https://jira.example.com/browse/DEV-1"
        );
        assert_eq!(
            browse_url("https://jira.example.com/rest/api/2/search?jql=project=DEV", "DEV-2"),
            "https://jira.example.com/browse/DEV-2"
        );
    }

    #[test]
    fn test_build_row_from_full_issue() {
        let issues = vec![issue(json!({
            "key": "DEV-7",
            "fields": {
                "assignee": {"emailAddress": "dev@example.com"},
                "project": {"name": "Development"},
                "issuetype": {"name": "Bug"},
                "priority": {"name": "High"},
                "status": {"name": "Done"},
                "reporter": {"displayName": "Rita Reporter"},
                "creator": {"displayName": "Carl Creator"},
                "resolution": {"name": "Fixed"},
                "resolutiondate": "2024-03-08T17:00:00.000+0000",
                "created": "2024-03-04T09:00:00.000+0000",
                "updated": "2024-03-08T17:30:00.000+0000",
                "timeoriginalestimate": 57600,
                "timeestimate": 0,
                "aggregatetimeoriginalestimate": 57600,
                "timespent": 3600,
                "aggregatetimespent": 3600,
                "labels": ["backend", "regression"],
                "customfield_10018": ["Sprint@1[id=1,name=Sprint 4,state=CLOSED]"],
                "customfield_11504": {"value": "Customer"}
            }
        }))];

        let rows = build_rows(&issues, "https://jira.example.com", &FieldsConfig::default());
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.index, 1);
        assert_eq!(row.assignee_name, "dev@example.com");
        assert_eq!(row.project_name, "Development");
        assert_eq!(row.status, "Done");
        assert_eq!(row.reporter_name, "Rita Reporter");
        assert_eq!(row.resolution, "Fixed");
        assert_eq!(row.created_date, "2024-03-04 09:00:00");
        assert_eq!(row.activity_date, "2024-03-08 17:30:00");
        assert_eq!(row.activity_date, row.updated_date);
        assert_eq!(row.link, "https://jira.example.com/browse/DEV-7");
        assert_eq!(row.time_original_estimate, "2 days, 00:00:00");
        assert_eq!(row.time_spent_logged, Cell::text("01:00:00"));
        assert_eq!(row.aggregate_time_spent, 3600.0);
        assert_eq!(row.sprint, "Sprint 4");
        assert_eq!(row.bug_source, "Customer");
        assert_eq!(row.labels, "backend, regression");
        assert_eq!(row.time_spent, Cell::Empty);
        assert_eq!(row.estimated_time, Cell::Empty);
    }

    #[test]
    fn test_missing_sub_objects_use_defaults() {
        let issues = vec![issue(json!({"key": "DEV-8", "fields": {}}))];
        let row = &build_rows(&issues, "https://jira.example.com", &FieldsConfig::default())[0];

        assert_eq!(row.assignee_name, "None");
        assert_eq!(row.project_name, "");
        assert_eq!(row.reporter_name, "");
        assert_eq!(row.resolution, "None");
        assert_eq!(row.resolution_date, "");
        assert_eq!(row.time_original_estimate, "None");
        assert_eq!(row.time_estimate, 0.0);
        assert_eq!(row.time_spent_logged, Cell::text("None"));
        assert_eq!(row.sprint, "None");
        assert_eq!(row.bug_source, "None");
        assert_eq!(row.labels, "");
    }

    #[test]
    fn test_row_count_and_order_follow_input() {
        let issues: Vec<Issue> = (1..=5)
            .map(|n| issue(json!({"key": format!("DEV-{}", n), "fields": {}})))
            .collect();

        let rows = build_rows(&issues, "https://jira.example.com", &FieldsConfig::default());
        assert_eq!(rows.len(), issues.len());
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.index, i + 1);
            assert_eq!(row.issue_key, format!("DEV-{}", i + 1));
        }

        assert!(build_rows(&[], "https://jira.example.com", &FieldsConfig::default()).is_empty());
    }
}
