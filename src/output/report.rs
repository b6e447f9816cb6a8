//! Console summary of an extraction run

use crate::crawler::UsageMetrics;
use crate::output::ResultSet;
use std::path::Path;

/// Formats the run summary shown on the console
///
/// Includes validated and rejected counts, the first `sample_size` records
/// pretty-printed, usage metrics verbatim and the output path.
pub fn format_report(
    result_set: &ResultSet,
    usage: &UsageMetrics,
    sample_size: usize,
    output_path: &Path,
) -> String {
    let mut report = String::new();

    report.push_str("=== Extraction Summary ===\n\n");

    report.push_str("Records:\n");
    report.push_str(&format!("  Validated: {}\n", result_set.len()));
    report.push_str(&format!("  Rejected: {}\n", result_set.rejected_count()));
    for rejection in result_set.rejections() {
        report.push_str(&format!(
            "    #{}: {}\n",
            rejection.index, rejection.error
        ));
    }
    report.push('\n');

    let shown = sample_size.min(result_set.len());
    if shown > 0 {
        report.push_str(&format!(
            "Sample (first {} of {}):\n",
            shown,
            result_set.len()
        ));
        for record in result_set.records().iter().take(shown) {
            let pretty = serde_json::to_string_pretty(record)
                .unwrap_or_else(|_| format!("{:?}", record));
            report.push_str(&pretty);
            report.push('\n');
        }
        report.push('\n');
    }

    report.push_str("Usage:\n");
    report.push_str(&usage.to_string());
    report.push_str("\n\n");

    report.push_str(&format!(
        "✓ {} record(s) saved to: {}\n",
        result_set.len(),
        output_path.display()
    ));

    report
}

/// Prints the run summary to stdout
pub fn print_report(
    result_set: &ResultSet,
    usage: &UsageMetrics,
    sample_size: usize,
    output_path: &Path,
) {
    print!("{}", format_report(result_set, usage, sample_size, output_path));
}
