use chrono::{DateTime, NaiveDateTime, Utc};

/// One working day, in seconds.
pub const WORKDAY_SECONDS: i64 = 8 * 3600;

pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const JIRA_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// `2024-03-04T09:15:00.000+0200` -> `2024-03-04 07:15:00` (UTC, offset dropped).
/// Anything unparseable becomes an empty string.
pub fn parse_jira_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    match DateTime::parse_from_str(raw, JIRA_DATE_FORMAT) {
        Ok(dt) => dt.with_timezone(&Utc).format(OUTPUT_DATE_FORMAT).to_string(),
        Err(e) => {
            log::debug!("Unparseable Jira timestamp {:?}: {}", raw, e);
            String::new()
        }
    }
}

/// Reads back a value produced by `parse_jira_date`.
pub fn parse_output_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), OUTPUT_DATE_FORMAT).ok()
}

/// Logged work: `HH:MM:SS` up to one working day, `N day(s), HH:MM:SS` above it.
/// Missing or non-positive input gives `None` so "no work logged" stays distinct
/// from a zero duration.
pub fn format_work_time(seconds: Option<f64>) -> Option<String> {
    let total = positive_seconds(seconds)?;

    if total <= WORKDAY_SECONDS {
        Some(clock(total))
    } else {
        Some(with_days(total))
    }
}

/// Original estimate: any whole working day switches to the day form.
/// Missing or non-positive input gives the `"None"` label.
pub fn format_original_estimate(seconds: Option<f64>) -> String {
    let Some(total) = positive_seconds(seconds) else {
        return crate::models::row::NONE_LABEL.to_string();
    };

    if total >= WORKDAY_SECONDS {
        with_days(total)
    } else {
        clock(total)
    }
}

fn positive_seconds(seconds: Option<f64>) -> Option<i64> {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => Some(s.trunc() as i64),
        _ => None,
    }
}

fn clock(total: i64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

fn with_days(total: i64) -> String {
    let days = total / WORKDAY_SECONDS;
    let unit = if days == 1 { "day" } else { "days" };
    format!("{} {}, {}", days, unit, clock(total % WORKDAY_SECONDS))
}
