use chrono::SecondsFormat;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::ReporterError;
use crate::types::AggregateReport;

/// Where one run's artifacts ended up. Individual write failures are
/// tolerated; `failed` counts them for the caller's logs.
#[derive(Debug)]
pub struct EmittedArtifacts {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Full structured representation, pretty-printed JSON.
pub fn render_json(report: &AggregateReport) -> Result<String, ReporterError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ReporterError::Persistence(format!("cannot serialize report: {}", e)))
}

/// Human-readable narrative. Renders the same finalized numbers as the JSON
/// artifact; nothing is recomputed here.
pub fn render_markdown(report: &AggregateReport) -> String {
    let mut out = String::new();

    out.push_str("# Service Health Report\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        report.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(&format!("Overall status: **{}**\n\n", report.overall_status));
    out.push_str(&format!("Health score: {}/100\n\n", report.health_score));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- Services checked: {}\n", report.total_services));
    out.push_str(&format!("- Healthy: {}\n", report.healthy_count));
    out.push_str(&format!("- Failed: {}\n", report.failed_count));
    out.push_str(&format!("- Warnings: {}\n\n", report.warning_count));

    out.push_str("## Services\n\n");
    if report.services.is_empty() {
        out.push_str("No services registered.\n\n");
    } else {
        out.push_str("| Service | Status | Response time | Checked at | Detail |\n");
        out.push_str("|---------|--------|---------------|------------|--------|\n");
        for result in report.services.values() {
            let detail = result.error_message.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "| {} | {} | {}ms | {} | {} |\n",
                result.service,
                result.status,
                result.response_time_ms,
                result.checked_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                detail
            ));
        }
        out.push('\n');
    }

    out.push_str("## Recommendations\n\n");
    if report.recommendations.is_empty() {
        out.push_str("No recommendations.\n\n");
    } else {
        for (i, rec) in report.recommendations.iter().enumerate() {
            out.push_str(&format!(
                "{}. [{}] ({}) {}\n   Suggested action: {}\n",
                i + 1,
                rec.priority,
                rec.category,
                rec.message,
                rec.suggested_action
            ));
        }
        out.push('\n');
    }

    out.push_str("## System\n\n");
    match &report.system_info {
        Some(info) => {
            out.push_str(&format!("- Hostname: {}\n", info.hostname));
            out.push_str(&format!("- Platform: {} ({})\n", info.platform, info.arch));
            out.push_str(&format!("- Reporter PID: {}\n\n", info.pid));
        }
        None => out.push_str("System information unavailable.\n\n"),
    }

    out.push_str("## Performance\n\n");
    out.push_str(&format!(
        "- Registry load: {}ms ({})\n\n",
        report.performance.registry_load_ms, report.performance.rating
    ));

    out.push_str("## Workflow files\n\n");
    if report.missing_workflows.is_empty() {
        out.push_str("All required workflow files present.\n");
    } else {
        for name in &report.missing_workflows {
            out.push_str(&format!("- missing: {}\n", name));
        }
    }

    out
}

/// Terse plain-text summary for quick scanning and CI log tails.
pub fn render_summary(report: &AggregateReport) -> String {
    format!(
        "status: {}\nhealth score: {}/100\nservices healthy: {}/{}\nwarnings: {}\nrecommendations: {}\n",
        report.overall_status,
        report.health_score,
        report.healthy_count,
        report.total_services,
        report.warning_count,
        report.recommendations.len()
    )
}

fn attempt_write(path: &Path, contents: &str, written: &mut Vec<PathBuf>, failed: &mut usize) {
    match std::fs::write(path, contents) {
        Ok(()) => written.push(path.to_path_buf()),
        Err(e) => {
            error!("failed to write {}: {}", path.display(), e);
            *failed += 1;
        }
    }
}

/// Persist all three representations under `<base_dir>/<YYYY-MM-DD>/` and
/// refresh the fixed `latest/` copies of the JSON and Markdown artifacts.
///
/// Each write is attempted independently. The run only fails when not a
/// single artifact could be produced.
pub fn emit_report(
    report: &AggregateReport,
    base_dir: &Path,
) -> Result<EmittedArtifacts, ReporterError> {
    let date = report.timestamp.format("%Y-%m-%d").to_string();
    let stamp = report.timestamp.format("%H%M%S").to_string();
    let run_dir = base_dir.join(&date);
    let latest_dir = base_dir.join("latest");

    let mut written = Vec::new();
    let mut failed = 0usize;

    let markdown = render_markdown(report);
    let summary = render_summary(report);
    let json = match render_json(report) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("{}", e);
            failed += 1;
            None
        }
    };

    if let Err(e) = std::fs::create_dir_all(&run_dir) {
        error!("cannot create {}: {}", run_dir.display(), e);
    }
    if let Some(json) = &json {
        attempt_write(
            &run_dir.join(format!("health-report-{}.json", stamp)),
            json,
            &mut written,
            &mut failed,
        );
    }
    attempt_write(
        &run_dir.join(format!("health-report-{}.md", stamp)),
        &markdown,
        &mut written,
        &mut failed,
    );
    attempt_write(
        &run_dir.join(format!("status-summary-{}.txt", stamp)),
        &summary,
        &mut written,
        &mut failed,
    );

    // The two most detailed artifacts are always discoverable at a fixed
    // location, without knowing the run's timestamp.
    if let Err(e) = std::fs::create_dir_all(&latest_dir) {
        error!("cannot create {}: {}", latest_dir.display(), e);
    }
    if let Some(json) = &json {
        attempt_write(
            &latest_dir.join("health-report.json"),
            json,
            &mut written,
            &mut failed,
        );
    }
    attempt_write(
        &latest_dir.join("health-report.md"),
        &markdown,
        &mut written,
        &mut failed,
    );

    if written.is_empty() {
        return Err(ReporterError::Persistence(format!(
            "no report artifact could be written under {}",
            base_dir.display()
        )));
    }

    info!(
        artifacts = written.len(),
        failures = failed,
        run_dir = %run_dir.display(),
        "report persisted"
    );
    Ok(EmittedArtifacts { written, failed })
}
