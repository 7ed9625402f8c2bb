use thiserror::Error;

/// Error taxonomy for the reporter.
///
/// Every variant except `Persistence` is caught at its component boundary
/// and folded into the aggregate counts; only a run that produces no report
/// artifact at all surfaces as a process-level failure.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Registry file missing or malformed. The sweep proceeds with zero
    /// registered services.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A probe failed for a non-network reason (e.g. malformed URL). The
    /// affected service is classified `error` and counts as failed.
    #[error("probe error: {0}")]
    Probe(String),

    /// A peripheral metadata-collection step failed. The section is marked
    /// unavailable and the warning counter is incremented.
    #[error("collection error: {0}")]
    Collection(String),

    /// Every artifact write failed for a run.
    #[error("persistence error: {0}")]
    Persistence(String),
}
