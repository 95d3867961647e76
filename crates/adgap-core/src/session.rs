//! Viewing-session records and the filters that scope them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One observed viewing session, as read from the source table.
///
/// Timestamps stay textual here; the gap calculator trims and parses them
/// when (and only when) a record reaches gap computation. `duration` is
/// carried through to the export untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The playback device (`tv_id` in the source table).
    pub device_id: String,
    pub content_id: String,
    pub title: String,
    pub season_id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    /// Provider name (`application` in the source table).
    pub application: String,
}

/// Scope records to a single streaming provider (exact match).
///
/// An empty result is valid and propagates as "no data" through the
/// downstream stages.
pub fn filter_to_service(records: &[SessionRecord], service: &str) -> Vec<SessionRecord> {
    records
        .iter()
        .filter(|r| r.application == service)
        .cloned()
        .collect()
}

/// Drop every record belonging to a device with only one session.
///
/// A single session yields no gap, so such devices can never be classified
/// and are excluded entirely before gap computation.
pub fn retain_multi_session_devices(records: Vec<SessionRecord>) -> Vec<SessionRecord> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in &records {
        *counts.entry(record.device_id.as_str()).or_insert(0) += 1;
    }

    let multi: std::collections::HashSet<String> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(device, _)| device.to_string())
        .collect();

    records
        .into_iter()
        .filter(|r| multi.contains(&r.device_id))
        .collect()
}
