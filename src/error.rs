// ⚠️ Typed errors for parsing and ingestion
//
// Engine functions (normalize, aggregate, classify, reduce) never fail.
// Only the edges that turn strings and files into typed values do.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("unknown entity type: {0:?} (expected state, district, city, region or college)")]
    UnknownEntityType(String),

    #[error("unknown view mode: {0:?} (expected state, district, city or mixed)")]
    UnknownViewMode(String),

    #[error("unknown orphan policy: {0:?} (expected lenient, exclude or strict)")]
    UnknownOrphanPolicy(String),

    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
}
