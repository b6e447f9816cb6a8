//! Output module for validating, persisting and reporting results
//!
//! This module handles:
//! - Validating raw candidates against the schema
//! - Writing the validated records to a JSON file
//! - Printing a summary with a sample and usage metrics

mod report;
mod result_set;

pub use report::{format_report, print_report};
pub use result_set::{Rejection, ResultSet};

use crate::crawler::UsageMetrics;
use crate::schema::Schema;
use crate::ExtractError;
use serde_json::Value;
use std::path::Path;

/// Validates every candidate against `schema`, keeping the survivors
///
/// Rejected candidates are recorded with their index and logged; they are
/// never fatal on their own.
pub fn validate_candidates(schema: &Schema, raw_candidates: &[Value]) -> ResultSet {
    let mut records = Vec::new();
    let mut rejections = Vec::new();

    for (index, candidate) in raw_candidates.iter().enumerate() {
        match schema.validate(candidate) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!("Rejected candidate #{}: {}", index, error);
                rejections.push(Rejection { index, error });
            }
        }
    }

    ResultSet::new(records, rejections)
}

/// Turns raw candidates into a validated, persisted and reported result set
///
/// # Arguments
///
/// * `schema` - Schema every record must satisfy
/// * `raw_candidates` - Untyped candidates from the executor
/// * `usage` - Usage metrics to report verbatim
/// * `output_path` - JSON file to write (replaced if present)
/// * `sample_size` - Number of records printed as a sample
///
/// # Returns
///
/// * `Ok(ResultSet)` - At least one candidate validated and the file was written
/// * `Err(ExtractError::NoValidData)` - Nothing validated; no file was touched
pub fn process(
    schema: &Schema,
    raw_candidates: &[Value],
    usage: &UsageMetrics,
    output_path: &Path,
    sample_size: usize,
) -> Result<ResultSet, ExtractError> {
    let result_set = validate_candidates(schema, raw_candidates);

    tracing::info!(
        "Validated {} of {} candidate(s)",
        result_set.len(),
        raw_candidates.len()
    );

    if result_set.is_empty() {
        return Err(ExtractError::NoValidData {
            rejected: result_set.rejected_count(),
        });
    }

    result_set.write_json(output_path)?;
    tracing::info!("Wrote {} record(s) to {}", result_set.len(), output_path.display());

    print_report(&result_set, usage, sample_size, output_path);

    Ok(result_set)
}
