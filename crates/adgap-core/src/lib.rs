//! Core domain logic for the subscription gap analyzer.
//!
//! This crate contains the fundamental types and logic for:
//! - Session filtering: scoping records to one provider and to devices with
//!   enough history to analyze
//! - Gap computation: elapsed time between consecutive sessions per
//!   device/title pair
//! - Binning: histogramming gap durations into fixed 15-second ranges
//! - Classification: rule-based subscription verdicts per device

pub mod bins;
pub mod classify;
pub mod gap;
pub mod pipeline;
pub mod session;

pub use bins::{GapBinRecord, GapRange, bin_gaps};
pub use classify::{
    ClassifierParams, SubscriptionType, SubscriptionVerdict, classify_devices,
};
pub use gap::{AnalysisError, GapRecord, compute_gaps};
pub use pipeline::ProviderAnalysis;
pub use session::{SessionRecord, filter_to_service, retain_multi_session_devices};
