//! Rule-based subscription classification over gap-frequency profiles.
//!
//! Short gaps between sessions of the same title are a proxy for ad breaks:
//! an ad-supported viewer stops and resumes within a minute, an ad-free
//! viewer's gaps are dominated by longer pauses. The thresholds are
//! empirical and deliberately tunable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bins::{GapBinRecord, GapRange};

/// A bin counts as ad-like iff its upper bound is at or below this (seconds).
const AD_LIKE_UPPER_BOUND_SECONDS: i64 = 60;

/// Tunable classifier thresholds.
#[derive(Debug, Clone)]
pub struct ClassifierParams {
    /// Minimum absolute count of ad-like gaps. Default: 3.
    pub ad_threshold: u64,

    /// Minimum proportion of ad-like gaps. Default: 0.6.
    pub ad_frequency_threshold: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            ad_threshold: 3,
            ad_frequency_threshold: 0.6,
        }
    }
}

/// The classifier's verdict for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    AdSupported,
    AdFree,
    MixedOrUncertain,
    InsufficientData,
}

impl SubscriptionType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdSupported => "ad_supported",
            Self::AdFree => "ad_free",
            Self::MixedOrUncertain => "mixed_or_uncertain",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ad_supported" => Ok(Self::AdSupported),
            "ad_free" => Ok(Self::AdFree),
            "mixed_or_uncertain" => Ok(Self::MixedOrUncertain),
            "insufficient_data" => Ok(Self::InsufficientData),
            _ => Err(format!("invalid subscription type: {s}")),
        }
    }
}

/// One device's verdict plus the metrics supporting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionVerdict {
    pub device_id: String,
    pub subscription_type: SubscriptionType,
    pub total_gaps: u64,
    pub ad_like_gaps: u64,
    pub long_gaps: u64,
    /// `ad_like_gaps / total_gaps`, rounded to 3 decimals; 0 when there are
    /// no gaps at all.
    pub ad_gap_proportion: f64,
    /// Up to 3 ranges by descending frequency; ties keep the frequency
    /// table's row order.
    pub most_common_ranges: Vec<GapRange>,
}

impl SubscriptionVerdict {
    /// The top ranges joined for tabular display, e.g. `"0-15, 15-30"`.
    pub fn most_common_display(&self) -> String {
        self.most_common_ranges
            .iter()
            .map(GapRange::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The ordered decision rules. First match wins; the order resolves
/// overlapping rule applicability deterministically.
fn decide(
    total_gaps: u64,
    ad_like_gaps: u64,
    long_gaps: u64,
    proportion: f64,
    params: &ClassifierParams,
) -> SubscriptionType {
    if total_gaps == 0 {
        SubscriptionType::InsufficientData
    } else if ad_like_gaps >= params.ad_threshold && proportion >= params.ad_frequency_threshold {
        SubscriptionType::AdSupported
    } else if proportion < 0.3 && long_gaps > ad_like_gaps {
        SubscriptionType::AdFree
    } else if ad_like_gaps < 2 {
        SubscriptionType::AdFree
    } else {
        SubscriptionType::MixedOrUncertain
    }
}

/// Classify every device present in the frequency table.
///
/// Devices are processed in the order they first appear, so repeated runs
/// over identical input emit identical verdict tables.
#[allow(clippy::cast_precision_loss)]
pub fn classify_devices(
    bins: &[GapBinRecord],
    params: &ClassifierParams,
) -> Vec<SubscriptionVerdict> {
    let mut device_order: Vec<&str> = Vec::new();
    let mut by_device: HashMap<&str, Vec<&GapBinRecord>> = HashMap::new();

    for bin in bins {
        by_device
            .entry(bin.device_id.as_str())
            .or_insert_with(|| {
                device_order.push(bin.device_id.as_str());
                Vec::new()
            })
            .push(bin);
    }

    let mut verdicts = Vec::with_capacity(device_order.len());

    for device in device_order {
        let device_bins = &by_device[device];

        let total_gaps: u64 = device_bins.iter().map(|b| b.frequency).sum();
        let ad_like_gaps: u64 = device_bins
            .iter()
            .filter(|b| b.range.high <= AD_LIKE_UPPER_BOUND_SECONDS)
            .map(|b| b.frequency)
            .sum();
        let long_gaps = total_gaps - ad_like_gaps;

        let proportion = if total_gaps == 0 {
            0.0
        } else {
            ad_like_gaps as f64 / total_gaps as f64
        };

        let mut ranked: Vec<&GapBinRecord> = device_bins.clone();
        // Stable sort: ties keep first-encounter row order.
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        let most_common_ranges: Vec<GapRange> =
            ranked.iter().take(3).map(|b| b.range).collect();

        verdicts.push(SubscriptionVerdict {
            device_id: device.to_string(),
            subscription_type: decide(total_gaps, ad_like_gaps, long_gaps, proportion, params),
            total_gaps,
            ad_like_gaps,
            long_gaps,
            ad_gap_proportion: (proportion * 1000.0).round() / 1000.0,
            most_common_ranges,
        });
    }

    tracing::debug!(devices = verdicts.len(), "classified devices");
    verdicts
}
