pub mod extractors;
pub mod rows;
pub mod sla;
pub mod timefmt;

use crate::config::settings::Settings;
use crate::models::issue::Issue;
use crate::models::row::Row;
use sla::SlaSummary;

/// Issues -> flat rows with SLA columns filled in.
pub fn issues_to_rows(issues: &[Issue], settings: &Settings) -> (Vec<Row>, SlaSummary) {
    let mut rows = rows::build_rows(issues, &settings.jira.url, &settings.fields);
    let summary = sla::derive_durations(&mut rows, &settings.sla);
    debug_assert_eq!(rows.len(), issues.len());
    (rows, summary)
}
