//! Per-file summary records for batch runs.
//!
//! The summary is CSV with the header `file,signal_rms,error_rms` and one
//! record per analyzed file, each line ending in CRLF. A file whose analysis
//! failed keeps its row with both values empty, so downstream tools see every
//! input.

use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::ErrorReport;

/// Column names, in order.
pub const SUMMARY_HEADER: [&str; 3] = ["file", "signal_rms", "error_rms"];

/// Column names of the per-frame table, in order.
pub const FRAME_HEADER: [&str; 4] = ["frame", "predictor", "signal_rms", "rel_error"];

/// Line terminator of the summary.
const SUMMARY_LINE_END: &str = "\r\n";
/// Significant digits written for each value.
const SUMMARY_PRECISION: usize = 5;
/// Significant digits written for per-frame values.
const FRAME_PRECISION: usize = 6;

/// One row of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    /// File identifier, usually a path relative to the batch root.
    pub file: String,
    /// RMS of the original signal; `None` if analysis failed.
    pub signal_rms: Option<f64>,
    /// RMS of the coding error; `None` if analysis failed.
    pub error_rms: Option<f64>,
}

impl SummaryRecord {
    /// Creates a record from a completed analysis.
    pub fn from_report(file: impl Into<String>, report: &ErrorReport) -> Self {
        Self {
            file: file.into(),
            signal_rms: Some(report.signal_rms),
            error_rms: Some(report.error_rms),
        }
    }

    /// Creates a record for a file that could not be analyzed.
    pub fn failed(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            signal_rms: None,
            error_rms: None,
        }
    }

    /// Whether the analysis produced values.
    pub fn is_success(&self) -> bool {
        self.signal_rms.is_some() && self.error_rms.is_some()
    }

    fn csv_row(&self) -> String {
        let value = |v: Option<f64>| {
            v.map(|v| format_general(v, SUMMARY_PRECISION))
                .unwrap_or_default()
        };
        format!(
            "{},{},{}",
            csv_escape(&self.file),
            value(self.signal_rms),
            value(self.error_rms)
        )
    }
}

/// Writes the header and all records.
pub fn write_summary<W: Write>(out: &mut W, records: &[SummaryRecord]) -> io::Result<()> {
    write!(out, "{}{}", SUMMARY_HEADER.join(","), SUMMARY_LINE_END)?;
    for record in records {
        write!(out, "{}{}", record.csv_row(), SUMMARY_LINE_END)?;
    }
    Ok(())
}

/// Renders the summary as a string.
pub fn format_summary(records: &[SummaryRecord]) -> String {
    let mut out = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_summary(&mut out, records);
    String::from_utf8_lossy(&out).into_owned()
}

/// Writes one row per frame of a report: index, predictor, RMS, and relative
/// error. The predictor column is empty when the report carries none.
pub fn write_frame_rows<W: Write>(out: &mut W, report: &ErrorReport) -> io::Result<()> {
    writeln!(out, "{}", FRAME_HEADER.join(","))?;
    for row in report.frame_rows() {
        writeln!(
            out,
            "{},{},{},{}",
            row.index,
            row.predictor.map(|p| p.to_string()).unwrap_or_default(),
            format_general(row.signal_rms, FRAME_PRECISION),
            format_general(row.relative_error, FRAME_PRECISION)
        )?;
    }
    Ok(())
}

/// Quotes a field if it contains a delimiter, quote, or line break.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Formats a value with `precision` significant digits in the style of C's
/// `%g`: fixed notation for moderate exponents, scientific otherwise, with
/// trailing zeros removed.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let precision = precision.max(1);

    // Round first: the exponent after rounding decides the notation.
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
