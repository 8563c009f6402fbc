use thiserror::Error;

/// One discovery source that failed during a reload cycle.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Aggregated reload failure: one entry per failing source. The catalog is
/// still updated with the results of every succeeding source when this error
/// is returned.
#[derive(Debug, Error)]
#[error("failed discovering procedures: {}", joined(.failures))]
pub struct DiscoveryError {
    pub failures: Vec<SourceFailure>,
}

fn joined(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.source, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}
