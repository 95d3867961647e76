//! CSV export of the pipeline's result tables.
//!
//! One pipeline run produces four files, named after the provider the way
//! the batch tool has always named them:
//! `<service>_data.csv`, `<service>_gap_analysis.csv`,
//! `<service>_frequency_analysis.csv`, `<service>_subscription_types.csv`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use adgap_core::{GapBinRecord, GapRecord, ProviderAnalysis, SessionRecord, SubscriptionVerdict};

/// Write all four tables for one provider, returning the paths written.
pub fn write_all(analysis: &ProviderAnalysis, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let service = &analysis.service;
    let paths = [
        (output_dir.join(format!("{service}_data.csv")), Table::Sessions),
        (
            output_dir.join(format!("{service}_gap_analysis.csv")),
            Table::Gaps,
        ),
        (
            output_dir.join(format!("{service}_frequency_analysis.csv")),
            Table::Frequencies,
        ),
        (
            output_dir.join(format!("{service}_subscription_types.csv")),
            Table::Verdicts,
        ),
    ];

    for (path, table) in &paths {
        match table {
            Table::Sessions => write_sessions(path, &analysis.sessions),
            Table::Gaps => write_gaps(path, &analysis.gaps),
            Table::Frequencies => write_frequencies(path, &analysis.frequencies),
            Table::Verdicts => write_verdicts(path, &analysis.verdicts),
        }
        .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(paths.into_iter().map(|(path, _)| path).collect())
}

enum Table {
    Sessions,
    Gaps,
    Frequencies,
    Verdicts,
}

fn write_sessions(path: &Path, sessions: &[SessionRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "tv_id",
        "content_id",
        "title",
        "season_id",
        "start_time",
        "end_time",
        "duration",
        "application",
    ])?;
    for session in sessions {
        writer.write_record([
            &session.device_id,
            &session.content_id,
            &session.title,
            &session.season_id,
            &session.start_time,
            &session.end_time,
            &session.duration,
            &session.application,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_gaps(path: &Path, gaps: &[GapRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["tv_id", "content_id", "gap_seconds"])?;
    for gap in gaps {
        // A null gap (first session of its group) exports as an empty cell.
        let seconds = gap
            .gap_seconds
            .map_or_else(String::new, |s| s.to_string());
        writer.write_record([&gap.device_id, &gap.content_id, &seconds])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_frequencies(path: &Path, bins: &[GapBinRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["tv_id", "gap_range", "frequency"])?;
    for bin in bins {
        writer.write_record([&bin.device_id, &bin.range.label(), &bin.frequency.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_verdicts(path: &Path, verdicts: &[SubscriptionVerdict]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "tv_id",
        "subscription_type",
        "total_gaps",
        "ad_like_gaps",
        "long_gaps",
        "ad_gap_proportion",
        "most_common_ranges",
    ])?;
    for verdict in verdicts {
        writer.write_record([
            verdict.device_id.clone(),
            verdict.subscription_type.to_string(),
            verdict.total_gaps.to_string(),
            verdict.ad_like_gaps.to_string(),
            verdict.long_gaps.to_string(),
            verdict.ad_gap_proportion.to_string(),
            verdict.most_common_display(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
