//! The per-provider analysis pipeline.
//!
//! Each stage is an immutable function from one table to the next; nothing
//! is mutated after being handed downstream. A run owns its provider-scoped
//! session store for its whole lifetime and retains every intermediate
//! table, since all four are exported.

use crate::bins::{GapBinRecord, bin_gaps};
use crate::classify::{ClassifierParams, SubscriptionVerdict, classify_devices};
use crate::gap::{AnalysisError, GapRecord, compute_gaps};
use crate::session::{SessionRecord, filter_to_service, retain_multi_session_devices};

/// The outputs of one provider's pipeline run.
#[derive(Debug, Clone)]
pub struct ProviderAnalysis {
    /// The provider these tables describe.
    pub service: String,

    /// Provider-filtered session table (before the device filter).
    pub sessions: Vec<SessionRecord>,

    /// Per-session gap table.
    pub gaps: Vec<GapRecord>,

    /// Gap-frequency table.
    pub frequencies: Vec<GapBinRecord>,

    /// Per-device classification table.
    pub verdicts: Vec<SubscriptionVerdict>,
}

impl ProviderAnalysis {
    /// Run the full pipeline for one provider.
    ///
    /// Runs for different providers share no mutable state and may execute
    /// concurrently. Empty input at any stage propagates as empty output
    /// tables, not an error; only malformed timestamps abort the run.
    pub fn run(
        records: &[SessionRecord],
        service: &str,
        params: &ClassifierParams,
    ) -> Result<Self, AnalysisError> {
        let sessions = filter_to_service(records, service);
        tracing::debug!(service, sessions = sessions.len(), "filtered to provider");

        let retained = retain_multi_session_devices(sessions.clone());
        tracing::debug!(
            service,
            retained = retained.len(),
            "dropped single-session devices"
        );

        let gaps = compute_gaps(&retained)?;
        let frequencies = bin_gaps(&gaps);
        let verdicts = classify_devices(&frequencies, params);

        Ok(Self {
            service: service.to_string(),
            sessions,
            gaps,
            frequencies,
            verdicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SubscriptionType;

    fn session(
        device: &str,
        content: &str,
        start: &str,
        end: &str,
        application: &str,
    ) -> SessionRecord {
        SessionRecord {
            device_id: device.to_string(),
            content_id: content.to_string(),
            title: "Show".to_string(),
            season_id: "s1".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            duration: "300".to_string(),
            application: application.to_string(),
        }
    }

    /// An ad-supported-looking device: five sessions with sub-minute gaps.
    fn ad_heavy_device(device: &str) -> Vec<SessionRecord> {
        vec![
            session(device, "c1", "2024-03-01 10:00:00", "2024-03-01 10:05:00", "Netflix"),
            session(device, "c1", "2024-03-01 10:05:30", "2024-03-01 10:10:00", "Netflix"),
            session(device, "c1", "2024-03-01 10:10:20", "2024-03-01 10:15:00", "Netflix"),
            session(device, "c1", "2024-03-01 10:15:45", "2024-03-01 10:20:00", "Netflix"),
            session(device, "c1", "2024-03-01 10:20:10", "2024-03-01 10:25:00", "Netflix"),
            session(device, "c1", "2024-03-01 10:25:40", "2024-03-01 10:30:00", "Netflix"),
        ]
    }

    #[test]
    fn test_full_pipeline_classifies_ad_heavy_device() {
        let records = ad_heavy_device("tv-1");

        let analysis =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();

        assert_eq!(analysis.sessions.len(), 6);
        assert_eq!(analysis.gaps.len(), 6);
        // 5 non-null gaps, all under a minute.
        assert_eq!(analysis.verdicts.len(), 1);
        let verdict = &analysis.verdicts[0];
        assert_eq!(verdict.subscription_type, SubscriptionType::AdSupported);
        assert_eq!(verdict.total_gaps, 5);
        assert_eq!(verdict.ad_like_gaps, 5);
    }

    #[test]
    fn test_other_providers_excluded() {
        let mut records = ad_heavy_device("tv-1");
        records.push(session(
            "tv-2",
            "c9",
            "2024-03-01 09:00:00",
            "2024-03-01 09:30:00",
            "Hulu",
        ));

        let analysis =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();

        assert!(analysis.sessions.iter().all(|s| s.application == "Netflix"));
        assert!(analysis.verdicts.iter().all(|v| v.device_id == "tv-1"));
    }

    #[test]
    fn test_single_session_device_never_reaches_output() {
        let mut records = ad_heavy_device("tv-1");
        records.push(session(
            "tv-lonely",
            "c1",
            "2024-03-01 09:00:00",
            "2024-03-01 09:30:00",
            "Netflix",
        ));

        let analysis =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();

        // The singleton is in the filtered session export but nowhere else.
        assert!(analysis.sessions.iter().any(|s| s.device_id == "tv-lonely"));
        assert!(analysis.gaps.iter().all(|g| g.device_id != "tv-lonely"));
        assert!(analysis.frequencies.iter().all(|b| b.device_id != "tv-lonely"));
        assert!(analysis.verdicts.iter().all(|v| v.device_id != "tv-lonely"));
    }

    #[test]
    fn test_unknown_provider_yields_empty_tables() {
        let records = ad_heavy_device("tv-1");

        let analysis =
            ProviderAnalysis::run(&records, "Peacock", &ClassifierParams::default()).unwrap();

        assert!(analysis.sessions.is_empty());
        assert!(analysis.gaps.is_empty());
        assert!(analysis.frequencies.is_empty());
        assert!(analysis.verdicts.is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let mut records = ad_heavy_device("tv-1");
        records.extend(ad_heavy_device("tv-2"));
        records.push(session(
            "tv-2",
            "c7",
            "2024-03-02 20:00:00",
            "2024-03-02 21:00:00",
            "Netflix",
        ));

        let first =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();
        let second =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();

        assert_eq!(first.frequencies, second.frequencies);
        assert_eq!(first.verdicts, second.verdicts);
    }

    #[test]
    fn test_malformed_timestamp_fails_the_run() {
        let mut records = ad_heavy_device("tv-1");
        records.push(session(
            "tv-1",
            "c1",
            "03/01/2024 10:31",
            "2024-03-01 10:35:00",
            "Netflix",
        ));

        let result = ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_overlap_counts_toward_ad_like_evidence() {
        // Second session starts before the first ends: negative gap, lowest
        // bin, ad-like. Documented data-quality oddity rather than an error.
        let records = vec![
            session("tv-1", "c1", "2024-03-01 10:00:00", "2024-03-01 10:10:00", "Netflix"),
            session("tv-1", "c1", "2024-03-01 10:08:00", "2024-03-01 10:20:00", "Netflix"),
        ];

        let analysis =
            ProviderAnalysis::run(&records, "Netflix", &ClassifierParams::default()).unwrap();

        assert_eq!(analysis.frequencies.len(), 1);
        assert_eq!(analysis.frequencies[0].range.low, 0);
        assert_eq!(analysis.verdicts[0].ad_like_gaps, 1);
    }
}
