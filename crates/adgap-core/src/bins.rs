//! Histogram binning of gap durations into fixed 15-second ranges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gap::GapRecord;

/// Width of every gap bin, in seconds.
pub const BIN_WIDTH_SECONDS: i64 = 15;

/// Ceiling used when the maximum observed gap is negative, so degenerate
/// data still produces a sane, non-empty edge set.
const FALLBACK_CEILING_SECONDS: i64 = 60;

/// A half-open interval `[low, high)` of gap durations in seconds.
///
/// The numeric bounds are the source of truth; the display label is derived
/// from them, never parsed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapRange {
    pub low: i64,
    pub high: i64,
}

impl GapRange {
    /// The nth bin of the run's edge sequence: `[n*15, (n+1)*15)`.
    #[allow(clippy::cast_possible_wrap)]
    fn nth(index: usize) -> Self {
        let low = index as i64 * BIN_WIDTH_SECONDS;
        Self {
            low,
            high: low + BIN_WIDTH_SECONDS,
        }
    }

    /// Display label, e.g. `"0-15"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

impl std::fmt::Display for GapRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Frequency of one device's gaps within one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapBinRecord {
    pub device_id: String,
    pub range: GapRange,
    pub frequency: u64,
}

/// Histogram non-null gaps per device.
///
/// The edge set is derived once from the global maximum gap, so every device
/// shares the same ranges for the run. The sequence runs 0, 15, 30, … up to
/// the first multiple of 15 strictly above the maximum, so no observed gap
/// can fall outside it. The lowest bin additionally captures values below 0
/// (overlapping sessions; see `GapRecord`). Devices appear in
/// first-encounter order, ranges within a device likewise; empty
/// combinations are omitted rather than zero-filled.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn bin_gaps(gaps: &[GapRecord]) -> Vec<GapBinRecord> {
    let observed: Vec<(&str, i64)> = gaps
        .iter()
        .filter_map(|g| g.gap_seconds.map(|seconds| (g.device_id.as_str(), seconds)))
        .collect();

    if observed.is_empty() {
        return Vec::new();
    }

    let max_gap = observed.iter().map(|&(_, s)| s).max().unwrap_or(0);
    // Top edge must strictly exceed max_gap; a negative maximum falls back
    // to the 60-second ceiling.
    let top_edge = if max_gap < 0 {
        FALLBACK_CEILING_SECONDS
    } else {
        max_gap + BIN_WIDTH_SECONDS
    };
    let bin_count = (top_edge / BIN_WIDTH_SECONDS) as usize;

    let mut device_order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, Vec<(usize, u64)>> = HashMap::new();

    for (device, seconds) in observed {
        let index = if seconds < 0 {
            0
        } else {
            (seconds / BIN_WIDTH_SECONDS) as usize
        };
        debug_assert!(index < bin_count, "gap {seconds} fell outside the edge set");

        let device_bins = counts.entry(device).or_insert_with(|| {
            device_order.push(device);
            Vec::new()
        });
        match device_bins.iter_mut().find(|(i, _)| *i == index) {
            Some((_, frequency)) => *frequency += 1,
            None => device_bins.push((index, 1)),
        }
    }

    let records: Vec<GapBinRecord> = device_order
        .iter()
        .flat_map(|device| {
            counts[device].iter().map(|&(index, frequency)| GapBinRecord {
                device_id: (*device).to_string(),
                range: GapRange::nth(index),
                frequency,
            })
        })
        .collect();

    tracing::debug!(
        bins = records.len(),
        bin_count,
        max_gap,
        "binned gap durations"
    );
    records
}
