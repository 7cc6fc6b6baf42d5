/// Output columns, in sheet order.
pub const HEADERS: [&str; 25] = [
    "index",
    "Assignee_name",
    "Project_name",
    "Issue_type",
    "Issue_key",
    "Priority",
    "Status",
    "Reporter_name",
    "Creator_name",
    "Resolution",
    "Resolution_date",
    "Activity_date",
    "Created_date",
    "Updated_date",
    "Link",
    "timeoriginalestimate",
    "timeestimate",
    "aggregatetimeoriginalestimate",
    "timespent",
    "aggregatetimespent",
    "Sprint",
    "bug_source",
    "labels",
    "Time_Spent",
    "Estimated_Time",
];

/// Placeholder for missing data.
pub const NONE_LABEL: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn none_label() -> Self {
        Cell::Text(NONE_LABEL.to_string())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

/// One flattened issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub assignee_name: String,
    pub project_name: String,
    pub issue_type: String,
    pub issue_key: String,
    pub priority: String,
    pub status: String,
    pub reporter_name: String,
    pub creator_name: String,
    pub resolution: String,
    pub resolution_date: String,
    pub activity_date: String,
    pub created_date: String,
    pub updated_date: String,
    pub link: String,
    pub time_original_estimate: String,
    pub time_estimate: f64,
    pub aggregate_time_original_estimate: f64,
    pub time_spent_logged: Cell,
    pub aggregate_time_spent: f64,
    pub sprint: String,
    pub bug_source: String,
    pub labels: String,
    /// Filled by `transform::sla`
    pub time_spent: Cell,
    /// Filled by `transform::sla`
    pub estimated_time: Cell,
}

impl Row {
    /// Cells in `HEADERS` order.
    pub fn cells(&self) -> [Cell; 25] {
        [
            Cell::Number(self.index as f64),
            Cell::text(&self.assignee_name),
            Cell::text(&self.project_name),
            Cell::text(&self.issue_type),
            Cell::text(&self.issue_key),
            Cell::text(&self.priority),
            Cell::text(&self.status),
            Cell::text(&self.reporter_name),
            Cell::text(&self.creator_name),
            Cell::text(&self.resolution),
            Cell::text(&self.resolution_date),
            Cell::text(&self.activity_date),
            Cell::text(&self.created_date),
            Cell::text(&self.updated_date),
            Cell::text(&self.link),
            Cell::text(&self.time_original_estimate),
            Cell::Number(self.time_estimate),
            Cell::Number(self.aggregate_time_original_estimate),
            self.time_spent_logged.clone(),
            Cell::Number(self.aggregate_time_spent),
            Cell::text(&self.sprint),
            Cell::text(&self.bug_source),
            Cell::text(&self.labels),
            self.time_spent.clone(),
            self.estimated_time.clone(),
        ]
    }
}
