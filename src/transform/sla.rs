use chrono::TimeDelta;

use crate::config::settings::SlaConfig;
use crate::models::row::{Cell, Row};
use crate::transform::timefmt::parse_output_date;

pub const IN_TIME_LABEL: &str = "In Time";

const DAY_SECONDS: i64 = 86_400;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SlaSummary {
    pub in_time: usize,
    pub over_sla: usize,
    pub within_sla: usize,
    pub undated: usize,
}

/// Fills `Time_Spent` and `Estimated_Time` on every row.
pub fn derive_durations(rows: &mut [Row], sla: &SlaConfig) -> SlaSummary {
    let mut summary = SlaSummary::default();
    let threshold = TimeDelta::days(sla.threshold_days);

    for row in rows.iter_mut() {
        let Some(span) = elapsed(row) else {
            row.time_spent = Cell::Empty;
            row.estimated_time = Cell::Empty;
            summary.undated += 1;
            continue;
        };

        let adjusted = skip_weekends(span);
        let estimated = adjusted - threshold;

        row.time_spent = Cell::Text(day_label(adjusted));
        row.estimated_time = if row.status == sla.done_status && estimated < TimeDelta::zero() {
            summary.in_time += 1;
            Cell::text(IN_TIME_LABEL)
        } else {
            if estimated > TimeDelta::zero() {
                summary.over_sla += 1;
            } else {
                summary.within_sla += 1;
            }
            Cell::Text(day_label(estimated))
        };
    }

    log::debug!("SLA derivation: {:?}", summary);
    summary
}

/// Last activity (or last update) minus creation.
pub fn elapsed(row: &Row) -> Option<TimeDelta> {
    let created = parse_output_date(&row.created_date)?;
    let end = parse_output_date(&row.activity_date)
        .or_else(|| parse_output_date(&row.updated_date))?;
    Some(end - created)
}

/// Drops 2 days per whole week in the span, plus 1 when the leftover
/// day count is 5 or 6.
pub fn skip_weekends(span: TimeDelta) -> TimeDelta {
    let days = floor_days(span);
    let mut skipped = days.div_euclid(7) * 2;
    if days.rem_euclid(7) >= 5 {
        skipped += 1;
    }
    span - TimeDelta::days(skipped)
}

pub fn floor_days(span: TimeDelta) -> i64 {
    span.num_seconds().div_euclid(DAY_SECONDS)
}

fn day_label(span: TimeDelta) -> String {
    format!("{} days", floor_days(span))
}
