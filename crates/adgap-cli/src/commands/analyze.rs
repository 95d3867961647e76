//! Implementation of the `adgap analyze` command.
//!
//! Loads the session table once, runs one independent pipeline per
//! requested provider, writes each provider's four result tables, and
//! prints the first rows of every verdict table.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use adgap_core::{ClassifierParams, ProviderAnalysis};

use crate::loader;
use crate::tables;

/// Verdict rows previewed per provider after a run.
const VERDICT_PREVIEW_ROWS: usize = 5;

pub fn run<W: Write>(
    writer: &mut W,
    input: &Path,
    output_dir: &Path,
    services: &[String],
    application_column: &str,
    params: &ClassifierParams,
) -> Result<()> {
    let records = loader::load_sessions(input, application_column)
        .with_context(|| format!("failed to load {}", input.display()))?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    // Provider runs share no mutable state, so they can proceed in
    // parallel; a malformed timestamp in any of them fails the command.
    let analyses: Vec<ProviderAnalysis> = services
        .par_iter()
        .map(|service| {
            tracing::info!(service, "analyzing provider");
            ProviderAnalysis::run(&records, service, params)
        })
        .collect::<Result<_, _>>()?;

    for analysis in &analyses {
        let written = tables::write_all(analysis, output_dir)?;
        tracing::debug!(
            service = analysis.service,
            files = written.len(),
            "tables written"
        );

        writeln!(
            writer,
            "{}: {} sessions, {} devices classified",
            analysis.service,
            analysis.sessions.len(),
            analysis.verdicts.len()
        )?;
        for verdict in analysis.verdicts.iter().take(VERDICT_PREVIEW_ROWS) {
            writeln!(
                writer,
                "  {} {} (gaps: {}, ad-like: {}, proportion: {}, top ranges: {})",
                verdict.device_id,
                verdict.subscription_type,
                verdict.total_gaps,
                verdict.ad_like_gaps,
                verdict.ad_gap_proportion,
                verdict.most_common_display()
            )?;
        }
        if analysis.verdicts.len() > VERDICT_PREVIEW_ROWS {
            writeln!(
                writer,
                "  ... {} more",
                analysis.verdicts.len() - VERDICT_PREVIEW_ROWS
            )?;
        }
    }

    Ok(())
}
