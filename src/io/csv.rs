//! CSV export of dispositions.
//!
//! One row per candidate: identifier, ExoFOP link, the ten known
//! attributes, and the designated reviewer's verdict and comments. Every
//! data field is quoted, with embedded quotes doubled; the header row is
//! quoted only where needed.

use crate::models::{CandidateRecord, CandidateSnapshot, KnownField, ReviewerKey};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;

/// Column headers, in row order.
pub const HEADER: [&str; 14] = [
    "TIC ID",
    "ExoFOP-TESS",
    "Sectors",
    "Epoch [BJD]",
    "Period [Days]",
    "Duration [Hours]",
    "Depth [ppm]",
    "Depth [%]",
    "Rtranister [RJup]",
    "Rstar [RSun]",
    "Tmag",
    "Delta Tmag",
    "Paper disp (LC)",
    "Paper comm",
];

/// ExoFOP target page prefix.
pub const EXOFOP_TARGET_URL: &str = "https://exofop.ipac.caltech.edu/tess/target.php?id=";

/// Parenthesised annotations such as `(b)` in `100(b)`.
static PARENTHESISED: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)\(.*?\)").ok());

/// Which candidates an export includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// Only candidates the designated reviewer has answered.
    #[default]
    DesignatedOnly,
    /// Every candidate; unanswered ones get empty verdict columns.
    All,
}

impl ExportMode {
    /// Download file name for this mode.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::DesignatedOnly => "planet-patrol-dispositions.csv",
            Self::All => "planet-patrol-dispositions-all.csv",
        }
    }
}

/// Builds the ExoFOP link for a candidate id, dropping annotations.
#[must_use]
pub fn exofop_link(id: &str) -> String {
    let cleaned = PARENTHESISED
        .as_ref()
        .map_or_else(|| id.to_string(), |re| re.replace_all(id, "").into_owned());
    format!("{EXOFOP_TARGET_URL}{cleaned}")
}

/// Renders one record as export columns.
#[must_use]
pub fn to_csv_row(record: &CandidateRecord, designated: &ReviewerKey) -> Vec<String> {
    let mut row = Vec::with_capacity(HEADER.len());
    row.push(record.id.as_str().to_string());
    row.push(exofop_link(record.id.as_str()));
    row.extend(KnownField::ALL.iter().map(|&field| {
        record
            .document
            .attribute(field)
            .map(ToString::to_string)
            .unwrap_or_default()
    }));
    let verdict = record.disposition_for(designated);
    row.push(verdict.map(|d| d.disposition.clone()).unwrap_or_default());
    row.push(verdict.map(|d| d.comments.clone()).unwrap_or_default());
    row
}

/// Writes the export to `writer`, returning the number of data rows.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if writing fails.
pub fn write_csv<W: Write>(
    mut writer: W,
    snapshot: &CandidateSnapshot,
    mode: ExportMode,
    designated: &ReviewerKey,
) -> Result<usize> {
    {
        let mut header_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut writer);
        header_writer
            .write_record(HEADER)
            .map_err(|e| Error::operation("write_csv_header", e))?;
        header_writer
            .flush()
            .map_err(|e| Error::operation("flush_csv", e))?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut rows = 0;
    for record in snapshot {
        if mode == ExportMode::DesignatedOnly && record.disposition_for(designated).is_none() {
            continue;
        }
        csv_writer
            .write_record(to_csv_row(record, designated))
            .map_err(|e| Error::operation("write_csv", e))?;
        rows += 1;
    }
    csv_writer
        .flush()
        .map_err(|e| Error::operation("flush_csv", e))?;
    Ok(rows)
}

/// Renders the export into memory.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if rendering fails.
pub fn to_csv(
    snapshot: &CandidateSnapshot,
    mode: ExportMode,
    designated: &ReviewerKey,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, snapshot, mode, designated)?;
    Ok(buffer)
}
