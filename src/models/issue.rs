use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IssueFields {
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub project: Option<Named>,
    #[serde(default)]
    pub issuetype: Option<Named>,
    #[serde(default)]
    pub priority: Option<Named>,
    #[serde(default)]
    pub status: Option<Named>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub creator: Option<User>,
    #[serde(default)]
    pub resolution: Option<Named>,

    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default, deserialize_with = "lenient_seconds")]
    pub timeoriginalestimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub timeestimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub aggregatetimeoriginalestimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub aggregatetimespent: Option<f64>,

    /// Kept raw: the spent-time extractor reports malformed values itself.
    #[serde(default)]
    pub timespent: Option<Value>,

    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: Vec<String>,

    /// Everything else, including `customfield_*` entries.
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

impl IssueFields {
    pub fn custom_field(&self, id: &str) -> Option<&Value> {
        self.custom.get(id).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "emailAddress", default)]
    pub email: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

/// Numbers of the wrong type read as absent instead of failing the whole page.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}
