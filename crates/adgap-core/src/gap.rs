//! Gap computation between consecutive sessions of a device/title pair.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

use crate::session::SessionRecord;

/// Timestamp layouts accepted in the source data. `%.f` tolerates an
/// optional fractional-seconds suffix.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("missing {field} timestamp for device {device_id}, content {content_id}")]
    MissingTimestamp {
        field: &'static str,
        device_id: String,
        content_id: String,
    },
    #[error("invalid {field} timestamp {value:?} for device {device_id}, content {content_id}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        device_id: String,
        content_id: String,
    },
}

/// A computed inter-session gap.
///
/// `gap_seconds` is `None` for the first session of a group, which has no
/// predecessor. Negative values mean the next session started before the
/// previous one ended (overlapping or out-of-order source data) and are
/// preserved as computed so the problem stays visible downstream.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GapRecord {
    pub device_id: String,
    pub content_id: String,
    pub gap_seconds: Option<i64>,
}

/// Trim and parse one timestamp field, or fail the run.
///
/// Malformed time data is not locally recoverable: a partial gap table
/// computed over corrupt timestamps would be silently wrong.
fn parse_timestamp(
    raw: &str,
    field: &'static str,
    record: &SessionRecord,
) -> Result<NaiveDateTime, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MissingTimestamp {
            field,
            device_id: record.device_id.clone(),
            content_id: record.content_id.clone(),
        });
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    // RFC 3339 carries an offset; the listed time is kept as-is beyond that.
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }

    Err(AnalysisError::InvalidTimestamp {
        field,
        value: raw.to_string(),
        device_id: record.device_id.clone(),
        content_id: record.content_id.clone(),
    })
}

/// Compute inter-session gaps per device/title pair.
///
/// Records are partitioned by `(device_id, content_id)` in first-encounter
/// order, each group sorted ascending by parsed `start_time`. The first
/// member of a group gets a null gap; each subsequent member gets
/// `start_time[i] - end_time[i-1]` in whole seconds. Groups with a single
/// member contribute nothing; one session on a title yields no gap.
pub fn compute_gaps(records: &[SessionRecord]) -> Result<Vec<GapRecord>, AnalysisError> {
    let mut group_order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<&SessionRecord>> = HashMap::new();

    for record in records {
        let key = (record.device_id.clone(), record.content_id.clone());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                group_order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut gaps = Vec::new();

    for key in &group_order {
        // Every retained session must carry well-formed timestamps, even in
        // groups too small to produce a gap.
        let mut timed: Vec<(NaiveDateTime, NaiveDateTime, &SessionRecord)> = groups[key]
            .iter()
            .map(|record| {
                let start = parse_timestamp(&record.start_time, "start_time", record)?;
                let end = parse_timestamp(&record.end_time, "end_time", record)?;
                Ok((start, end, *record))
            })
            .collect::<Result<_, AnalysisError>>()?;

        if timed.len() < 2 {
            continue;
        }

        timed.sort_by_key(|(start, _, _)| *start);

        let mut previous_end: Option<NaiveDateTime> = None;
        for (start, end, record) in timed {
            gaps.push(GapRecord {
                device_id: record.device_id.clone(),
                content_id: record.content_id.clone(),
                gap_seconds: previous_end.map(|prev| (start - prev).num_seconds()),
            });
            previous_end = Some(end);
        }
    }

    tracing::debug!(gap_records = gaps.len(), "computed inter-session gaps");
    Ok(gaps)
}
