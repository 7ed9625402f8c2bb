use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::collector::{build_performance_metrics, check_required_workflows, collect_system_info};
use crate::types::{
    AggregateReport, OverallStatus, ProbeResult, ProbeStatus, ServiceDescriptor, Settings,
};

/// Per-run state threaded explicitly through the pipeline. There is no
/// process-wide registry or status cache.
pub struct RunContext {
    pub settings: Settings,
    pub client: reqwest::Client,
    pub registry_load: Duration,
}

impl RunContext {
    pub fn new(settings: Settings, registry_load: Duration) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
            registry_load,
        }
    }
}

/// `round(healthy / total * 100)`, or 0 for an empty registry.
pub fn compute_health_score(healthy_count: usize, total_services: usize) -> u32 {
    if total_services == 0 {
        return 0;
    }
    ((healthy_count as f64 / total_services as f64) * 100.0).round() as u32
}

/// Ordered threshold rules; the first match wins.
///
/// The rules overlap (two gate on the score with different cutoffs, and the
/// warning rule cannot fire once the score reaches 80), and that overlap is
/// intentional: the published order is kept verbatim for compatibility.
pub fn classify_overall(
    healthy_count: usize,
    failed_count: usize,
    warning_count: usize,
    health_score: u32,
) -> OverallStatus {
    if failed_count > healthy_count {
        OverallStatus::Critical
    } else if health_score < 50 {
        OverallStatus::Degraded
    } else if warning_count > 3 {
        OverallStatus::Warning
    } else if health_score < 80 {
        OverallStatus::Partial
    } else {
        OverallStatus::Healthy
    }
}

async fn probe_service(
    client: reqwest::Client,
    name: String,
    url: String,
    timeout: Duration,
    poll_interval: Duration,
) -> ProbeResult {
    let start = Instant::now();
    let outcome = crate::prober::probe(&client, &url, timeout, poll_interval).await;
    let response_time_ms = start.elapsed().as_millis() as u64;
    let (status, error_message) = match outcome {
        Ok(true) => (ProbeStatus::Healthy, None),
        Ok(false) => (ProbeStatus::Unhealthy, None),
        Err(e) => (ProbeStatus::Error, Some(e.to_string())),
    };
    ProbeResult {
        service: name,
        status,
        response_time_ms,
        error_message,
        checked_at: Utc::now(),
    }
}

/// Probe every registered service concurrently and fold the outcomes into
/// an AggregateReport. Recommendations are derived separately, from the
/// finalized metrics.
///
/// The sweep never aborts on per-service or per-section failure: probe
/// errors become `error` results and peripheral collection failures bump
/// the warning counter.
pub async fn run_health_sweep(
    ctx: &RunContext,
    registry: &BTreeMap<String, ServiceDescriptor>,
) -> AggregateReport {
    let timestamp = Utc::now();
    let timeout = Duration::from_millis(ctx.settings.probe_timeout_ms);
    let poll_interval = Duration::from_millis(ctx.settings.probe_poll_interval_ms);

    // Fan out one task per service; probes are independent, so completion
    // order is irrelevant and results are keyed by name at the join.
    let handles: Vec<(String, tokio::task::JoinHandle<ProbeResult>)> = registry
        .iter()
        .map(|(name, desc)| {
            let handle = tokio::spawn(probe_service(
                ctx.client.clone(),
                name.clone(),
                desc.probe_url(),
                timeout,
                poll_interval,
            ));
            (name.clone(), handle)
        })
        .collect();

    let mut services: BTreeMap<String, ProbeResult> = BTreeMap::new();
    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => ProbeResult {
                service: name.clone(),
                status: ProbeStatus::Error,
                response_time_ms: 0,
                error_message: Some(format!("probe task failed: {}", e)),
                checked_at: Utc::now(),
            },
        };
        services.insert(name, result);
    }

    let total_services = services.len();
    let healthy_count = services
        .values()
        .filter(|r| r.status == ProbeStatus::Healthy)
        .count();
    let failed_count = total_services - healthy_count;

    let mut warning_count = 0usize;

    let system_info = match collect_system_info() {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("system info unavailable: {}", e);
            warning_count += 1;
            None
        }
    };

    let missing_workflows = match check_required_workflows(
        Path::new(&ctx.settings.workflow_dir),
        &ctx.settings.required_workflows,
    ) {
        Ok(missing) => missing,
        Err(e) => {
            warn!("workflow check unavailable: {}", e);
            warning_count += 1;
            Vec::new()
        }
    };

    let performance = build_performance_metrics(ctx.registry_load);

    let health_score = compute_health_score(healthy_count, total_services);
    let overall_status = classify_overall(healthy_count, failed_count, warning_count, health_score);

    info!(
        total_services,
        healthy_count, failed_count, warning_count, health_score,
        status = %overall_status,
        "sweep complete"
    );

    AggregateReport {
        timestamp,
        total_services,
        healthy_count,
        failed_count,
        warning_count,
        health_score,
        overall_status,
        services,
        recommendations: Vec::new(),
        system_info,
        performance,
        missing_workflows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_settings_with_env, MockEnvironment};

    #[test]
    fn test_health_score_formula() {
        assert_eq!(compute_health_score(0, 0), 0);
        assert_eq!(compute_health_score(0, 10), 0);
        assert_eq!(compute_health_score(10, 10), 100);
        assert_eq!(compute_health_score(3, 10), 30);
        assert_eq!(compute_health_score(7, 10), 70);
        assert_eq!(compute_health_score(1, 3), 33);
        assert_eq!(compute_health_score(2, 3), 67);
    }

    #[test]
    fn test_classify_critical_when_failures_dominate() {
        // 10 services, 3 healthy: failed(7) > healthy(3)
        assert_eq!(classify_overall(3, 7, 0, 30), OverallStatus::Critical);
        // Tie is not critical
        assert_eq!(classify_overall(5, 5, 0, 50), OverallStatus::Partial);
    }

    #[test]
    fn test_classify_degraded_on_low_score() {
        // failed <= healthy but score below 50 (possible with zero services
        // or error-free ties at the boundary)
        assert_eq!(classify_overall(0, 0, 0, 0), OverallStatus::Degraded);
        assert_eq!(classify_overall(5, 5, 0, 49), OverallStatus::Degraded);
    }

    #[test]
    fn test_classify_warning_requires_more_than_three() {
        assert_eq!(classify_overall(7, 3, 4, 70), OverallStatus::Warning);
        assert_eq!(classify_overall(7, 3, 3, 70), OverallStatus::Partial);
        // The warning rule sits above the score bands, so enough warnings
        // demote even a 90-score fleet
        assert_eq!(classify_overall(9, 1, 4, 90), OverallStatus::Warning);
    }

    #[test]
    fn test_classify_partial_and_healthy_bands() {
        // 10 services, 7 healthy
        assert_eq!(classify_overall(7, 3, 0, 70), OverallStatus::Partial);
        // 10 services, 9 healthy
        assert_eq!(classify_overall(9, 1, 0, 90), OverallStatus::Healthy);
        assert_eq!(classify_overall(10, 0, 0, 100), OverallStatus::Healthy);
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // critical outranks everything else even with many warnings
        assert_eq!(classify_overall(1, 9, 10, 10), OverallStatus::Critical);
        // degraded outranks warning
        assert_eq!(classify_overall(5, 4, 10, 45), OverallStatus::Degraded);
    }

    fn test_settings(workflow_dir: &str) -> Settings {
        let env = MockEnvironment::new()
            .with_var("PROBE_TIMEOUT_MS", "300")
            .with_var("PROBE_POLL_INTERVAL_MS", "100")
            .with_var("WORKFLOW_DIR", workflow_dir)
            .with_var("REQUIRED_WORKFLOWS", "");
        load_settings_with_env(&env)
    }

    fn descriptor(port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            command: "node".to_string(),
            args: vec!["server.js".to_string()],
            port,
            health_path: "/health".to_string(),
            env: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_sweep_mixed_fleet() {
        let mut up_a = mockito::Server::new_async().await;
        let mut up_b = mockito::Server::new_async().await;
        let _ma = up_a.mock("GET", "/health").with_status(200).create_async().await;
        let _mb = up_b.mock("GET", "/health").with_status(200).create_async().await;

        let workflows = tempfile::tempdir().unwrap();
        let mut registry = BTreeMap::new();
        registry.insert("alpha".to_string(), descriptor(up_a.socket_address().port()));
        registry.insert("beta".to_string(), descriptor(up_b.socket_address().port()));
        // Nothing listens on port 1
        registry.insert("gamma".to_string(), descriptor(1));

        let ctx = RunContext::new(
            test_settings(workflows.path().to_str().unwrap()),
            Duration::from_millis(5),
        );
        let report = run_health_sweep(&ctx, &registry).await;

        // Exactly one result per registered service
        assert_eq!(report.services.len(), 3);
        assert_eq!(report.total_services, 3);
        assert_eq!(report.healthy_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.healthy_count + report.failed_count, report.total_services);
        assert_eq!(report.health_score, 67);
        assert_eq!(report.overall_status, OverallStatus::Partial);

        assert_eq!(report.services["alpha"].status, ProbeStatus::Healthy);
        assert_eq!(report.services["beta"].status, ProbeStatus::Healthy);
        assert_eq!(report.services["gamma"].status, ProbeStatus::Unhealthy);
        assert!(report.services["gamma"].error_message.is_none());
    }

    #[tokio::test]
    async fn test_sweep_empty_registry() {
        let workflows = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(
            test_settings(workflows.path().to_str().unwrap()),
            Duration::from_millis(5),
        );
        let report = run_health_sweep(&ctx, &BTreeMap::new()).await;

        assert_eq!(report.total_services, 0);
        assert_eq!(report.health_score, 0);
        assert_eq!(report.overall_status, OverallStatus::Degraded);
        assert!(report.services.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_fully_healthy_fleet_is_idempotent() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/health")
            .with_status(200)
            .expect_at_least(2)
            .create_async()
            .await;

        let workflows = tempfile::tempdir().unwrap();
        let mut registry = BTreeMap::new();
        registry.insert("solo".to_string(), descriptor(server.socket_address().port()));

        let ctx = RunContext::new(
            test_settings(workflows.path().to_str().unwrap()),
            Duration::from_millis(5),
        );

        for _ in 0..2 {
            let report = run_health_sweep(&ctx, &registry).await;
            assert_eq!(report.health_score, 100);
            assert_eq!(report.overall_status, OverallStatus::Healthy);
        }
    }

    #[tokio::test]
    async fn test_sweep_unreadable_workflow_dir_increments_warnings() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", "/health").with_status(200).create_async().await;

        let env = MockEnvironment::new()
            .with_var("PROBE_TIMEOUT_MS", "300")
            .with_var("PROBE_POLL_INTERVAL_MS", "100")
            .with_var("WORKFLOW_DIR", "/nonexistent/workflows")
            .with_var("REQUIRED_WORKFLOWS", "ci.yml");
        let mut registry = BTreeMap::new();
        registry.insert("solo".to_string(), descriptor(server.socket_address().port()));

        let ctx = RunContext::new(load_settings_with_env(&env), Duration::from_millis(5));
        let report = run_health_sweep(&ctx, &registry).await;

        assert!(report.warning_count >= 1);
        assert!(report.missing_workflows.is_empty());
        // A collection failure never touches the probe-derived counts
        assert_eq!(report.healthy_count, 1);
        assert_eq!(report.failed_count, 0);
    }
}
