use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use emerald_core::{to_residue_ranges, AlignmentSafetyWindowMapping, SequenceSafetyWindow};

use crate::commands::load_snapshot;
use crate::config::Config;

/// Print the merged safety windows of a snapshot.
pub fn execute(_config: &Config, input: PathBuf, json: bool, ranges: bool) -> Result<()> {
    log::info!("Extracting safety windows from: {}", input.display());
    let data = load_snapshot(&input)?;
    let mapping = data.safety_windows();
    log::debug!(
        "{} representative and {} member windows after merge",
        mapping.sequence_a.len(),
        mapping.sequence_b.len()
    );
    print!("{}", report(&mapping, json, ranges)?);
    Ok(())
}

/// Format `mapping` as JSON or as a plain listing. With `ranges` the windows
/// are given as 0-based half-open residue ranges, the form structure
/// viewers highlight.
pub fn report(mapping: &AlignmentSafetyWindowMapping, json: bool, ranges: bool) -> Result<String> {
    if json {
        let mut out = if ranges {
            serde_json::to_string_pretty(&serde_json::json!({
                "sequenceA": to_residue_ranges(&mapping.sequence_a),
                "sequenceB": to_residue_ranges(&mapping.sequence_b),
            }))
        } else {
            serde_json::to_string_pretty(mapping)
        }
        .context("Failed to serialize safety windows")?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for (title, windows) in [
        ("Sequence A (representative)", &mapping.sequence_a),
        ("Sequence B (member)", &mapping.sequence_b),
    ] {
        list(&mut out, title, windows, ranges)?;
    }
    Ok(out)
}

fn list(out: &mut String, title: &str, windows: &[SequenceSafetyWindow], ranges: bool) -> std::fmt::Result {
    writeln!(out, "{}:", title)?;
    if windows.is_empty() {
        return writeln!(out, "  none");
    }
    for window in windows {
        if ranges {
            let range = window.to_residue_range();
            writeln!(out, "  [{}, {})", range.start, range.end)?;
        } else {
            writeln!(
                out,
                "  {}-{} ({} residues)",
                window.start_position,
                window.end_position,
                window.len()
            )?;
        }
    }
    Ok(())
}
