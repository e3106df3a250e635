use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// One bookable day as returned by the activities API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClassDate {
    pub(crate) raw: String,
    #[serde(default)]
    pub(crate) full_date_pretty: String,
    #[serde(default)]
    pub(crate) today: bool,
}

#[derive(Debug, Default, Deserialize)]
struct DatesPayload {
    #[serde(default)]
    data: Vec<ClassDate>,
}

/// Decodes the feed body. A missing `data` key is an empty feed, not an error.
pub(crate) fn parse_dates_payload(raw: &str) -> Result<Vec<ClassDate>> {
    let payload: DatesPayload =
        serde_json::from_str(raw).context("failed to decode dates response as JSON")?;
    Ok(payload.data)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DateComparison {
    pub(crate) previous: Option<String>,
    pub(crate) latest: String,
    pub(crate) changed: bool,
}

/// A first run (no previous value) is never a change.
pub(crate) fn compare_with_previous(previous: Option<String>, latest: &str) -> DateComparison {
    let changed = previous.as_deref().is_some_and(|prev| prev != latest);
    DateComparison {
        previous,
        latest: latest.to_string(),
        changed,
    }
}

/// The upstream API does not document that `data` is sorted ascending; the
/// last element is still taken as the latest, but a broken assumption is
/// worth a warning.
pub(crate) fn ordering_warning(dates: &[ClassDate]) -> Option<String> {
    let parsed: Vec<NaiveDate> = dates
        .iter()
        .filter_map(|date| NaiveDate::parse_from_str(&date.raw, "%Y-%m-%d").ok())
        .collect();

    if parsed.len() != dates.len() {
        return Some(format!(
            "{} feed date(s) are not in YYYY-MM-DD form; latest-date selection may be wrong",
            dates.len() - parsed.len()
        ));
    }
    if parsed.windows(2).any(|pair| pair[0] > pair[1]) {
        return Some(
            "feed dates are not in ascending order; the last entry may not be the latest"
                .to_string(),
        );
    }
    None
}

pub(crate) fn format_feed_line(date: &ClassDate) -> String {
    let mut line = if date.full_date_pretty.is_empty() {
        date.raw.clone()
    } else {
        format!("{} ({})", date.raw, date.full_date_pretty)
    };
    if date.today {
        line.push_str(" [today]");
    }
    line
}
