use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Runtime settings loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub registry_path: String,
    pub probe_timeout_ms: u64,
    pub probe_poll_interval_ms: u64,
    pub report_dir: String,
    pub workflow_dir: String,
    pub required_workflows: Vec<String>,
}

/// One registered service as declared in the registry file.
///
/// `command`, `args` and `env` describe how the service is launched; the
/// reporter only uses `port` and `health_path` to build the probe URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceDescriptor {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub port: u16,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_health_path() -> String {
    "/health".to_string()
}

impl ServiceDescriptor {
    pub fn probe_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.health_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Healthy => "healthy",
            ProbeStatus::Unhealthy => "unhealthy",
            ProbeStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Outcome of probing one service. Written once per service per sweep;
/// retries inside a probe never produce a second result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub service: String,
    pub status: ProbeStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    NeedsOptimization,
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceRating::Excellent => "excellent",
            PerformanceRating::Good => "good",
            PerformanceRating::NeedsOptimization => "needs_optimization",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub registry_load_ms: u64,
    pub rating: PerformanceRating,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub pid: u32,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// An actionable finding derived from the finalized sweep metrics.
/// Ordering is generation order, not severity order, and is preserved
/// through every output representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub message: String,
    pub suggested_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Partial,
    Warning,
    Degraded,
    Critical,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Partial => "partial",
            OverallStatus::Warning => "warning",
            OverallStatus::Degraded => "degraded",
            OverallStatus::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// The finalized result of one sweep. Built by the aggregator, extended
/// with recommendations, then treated as read-only by the emitter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub timestamp: DateTime<Utc>,
    pub total_services: usize,
    pub healthy_count: usize,
    pub failed_count: usize,
    pub warning_count: usize,
    pub health_score: u32,
    pub overall_status: OverallStatus,
    pub services: BTreeMap<String, ProbeResult>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_info: Option<SystemInfo>,
    pub performance: PerformanceMetrics,
    pub missing_workflows: Vec<String>,
}
