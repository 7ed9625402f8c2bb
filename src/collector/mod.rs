use chrono::Utc;
use std::path::Path;
use std::time::Duration;

use crate::error::ReporterError;
use crate::types::{PerformanceMetrics, PerformanceRating, SystemInfo};

/// Collect host metadata for the report. Failure here is non-fatal: the
/// sweep marks the section unavailable and bumps the warning counter.
pub fn collect_system_info() -> Result<SystemInfo, ReporterError> {
    let hostname = std::env::var("HOSTNAME")
        .map_err(|_| ReporterError::Collection("HOSTNAME is not set".to_string()))?;

    Ok(SystemInfo {
        hostname,
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        pid: std::process::id(),
        collected_at: Utc::now(),
    })
}

/// Rate a registry-load latency.
pub fn rate_performance(registry_load: Duration) -> PerformanceRating {
    let ms = registry_load.as_millis();
    if ms < 1000 {
        PerformanceRating::Excellent
    } else if ms < 3000 {
        PerformanceRating::Good
    } else {
        PerformanceRating::NeedsOptimization
    }
}

pub fn build_performance_metrics(registry_load: Duration) -> PerformanceMetrics {
    PerformanceMetrics {
        registry_load_ms: registry_load.as_millis() as u64,
        rating: rate_performance(registry_load),
    }
}

/// Return the subset of `required` workflow files missing from `dir`.
///
/// An unreadable directory is the fallible case; a readable directory with
/// missing entries is a normal finding, not an error.
pub fn check_required_workflows(
    dir: &Path,
    required: &[String],
) -> Result<Vec<String>, ReporterError> {
    if required.is_empty() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ReporterError::Collection(format!("cannot read workflow dir {}: {}", dir.display(), e))
    })?;

    let present: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();

    Ok(required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .cloned()
        .collect())
}
