//! Human- and machine-readable repair summaries.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::search::RepairOutcome;

/// Errors that can occur while writing a summary.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine-readable summary of one repair run.
#[derive(Debug, Clone, Serialize)]
pub struct RepairSummary {
    pub success: bool,
    /// The accepted candidate, lossily decoded for readability.
    pub repaired: Option<String>,
    pub edits_used: usize,
    pub oracle_runs: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub incomplete: u64,
    pub cache_hits: u64,
}

impl RepairSummary {
    pub fn from_outcome(outcome: &RepairOutcome) -> Self {
        Self {
            success: outcome.is_repaired(),
            repaired: outcome
                .repaired
                .as_ref()
                .map(|c| String::from_utf8_lossy(c).into_owned()),
            edits_used: outcome.edits_used,
            oracle_runs: outcome.stats.total,
            correct: outcome.stats.ok,
            incorrect: outcome.stats.err,
            incomplete: outcome.stats.inc,
            cache_hits: outcome.cache_hits,
        }
    }
}

/// Save a repair summary to a JSON file.
pub fn write_summary(summary: &RepairSummary, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

/// Render a candidate for logs: control characters escaped, long tails
/// elided.
pub fn preview(candidate: &[u8]) -> String {
    const LIMIT: usize = 120;

    if candidate.is_empty() {
        return "<EMPTY>".to_string();
    }

    let mut out = String::new();
    for &b in candidate.iter().take(LIMIT) {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02X}")),
        }
    }
    if candidate.len() > LIMIT {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use erepair_oracle::OracleStats;

    #[test]
    fn preview_escapes_control_bytes() {
        assert_eq!(preview(b"ab"), "ab");
        assert_eq!(preview(b"a\nb\tc"), "a\\nb\\tc");
        assert_eq!(preview(&[0x00, 0x7F]), "\\x00\\x7F");
        assert_eq!(preview(b""), "<EMPTY>");
    }

    #[test]
    fn preview_elides_long_candidates() {
        let long = vec![b'x'; 200];
        let text = preview(&long);
        assert!(text.ends_with('…'));
        assert_eq!(text.chars().count(), 121);
    }

    #[test]
    fn summary_reflects_outcome() {
        let outcome = RepairOutcome {
            repaired: Some(b"2024-01-15".to_vec()),
            edits_used: 1,
            stats: OracleStats {
                total: 20,
                ok: 1,
                err: 19,
                inc: 0,
            },
            cache_hits: 3,
        };

        let summary = RepairSummary::from_outcome(&outcome);
        assert!(summary.success);
        assert_eq!(summary.repaired.as_deref(), Some("2024-01-15"));
        assert_eq!(summary.oracle_runs, 20);
        assert_eq!(summary.cache_hits, 3);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"edits_used\":1"));
    }

    #[test]
    fn summary_of_a_give_up() {
        let outcome = RepairOutcome {
            repaired: None,
            edits_used: 0,
            stats: OracleStats::default(),
            cache_hits: 0,
        };
        let summary = RepairSummary::from_outcome(&outcome);
        assert!(!summary.success);
        assert_eq!(summary.repaired, None);
    }
}
