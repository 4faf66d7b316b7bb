//! Audit sink classification

use super::destination::parse_destination;

/// Filter fragments that mark a sink as exporting audit logs
const AUDIT_FILTER_MARKERS: &[&str] = &["cloudaudit", "logs/activity"];

/// A sink qualifies when it exports to a BigQuery dataset and its filter
/// mentions audit logs. This is a plain substring match on the lower-cased
/// filter, not an evaluation of the filter expression.
pub fn is_audit_sink(filter: &str, destination: &str) -> bool {
    if parse_destination(destination).is_none() {
        return false;
    }

    let filter = filter.to_lowercase();
    AUDIT_FILTER_MARKERS.iter().any(|marker| filter.contains(marker))
}
