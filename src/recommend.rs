use crate::types::{AggregateReport, PerformanceRating, Priority, Recommendation};

/// Derive prioritized findings from a finalized report.
///
/// Rules run in a fixed order and every matching rule contributes, so the
/// output order reflects generation order rather than severity. The closing
/// maintenance entry is unconditional, which keeps the sequence non-empty.
pub fn derive_recommendations(report: &AggregateReport) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if report.health_score < 50 {
        recs.push(Recommendation {
            priority: Priority::High,
            category: "health".to_string(),
            message: format!(
                "System health is critical at {}% - multiple services are failing",
                report.health_score
            ),
            suggested_action: "Run full diagnostics on all failing services".to_string(),
        });
    } else if report.health_score < 80 {
        recs.push(Recommendation {
            priority: Priority::Medium,
            category: "health".to_string(),
            message: format!(
                "System health is reduced at {}% - some services need attention",
                report.health_score
            ),
            suggested_action: "Review configuration of unhealthy services".to_string(),
        });
    }

    if report.performance.rating == PerformanceRating::NeedsOptimization {
        recs.push(Recommendation {
            priority: Priority::Medium,
            category: "performance".to_string(),
            message: format!(
                "Configuration loading took {}ms",
                report.performance.registry_load_ms
            ),
            suggested_action: "Investigate slow registry access and trim oversized entries"
                .to_string(),
        });
    }

    if !report.missing_workflows.is_empty() {
        recs.push(Recommendation {
            priority: Priority::Medium,
            category: "configuration".to_string(),
            message: format!(
                "Required workflow files are missing: {}",
                report.missing_workflows.join(", ")
            ),
            suggested_action: "Restore the missing workflow files from version control"
                .to_string(),
        });
    }

    recs.push(Recommendation {
        priority: Priority::Low,
        category: "maintenance".to_string(),
        message: "Health monitoring is active".to_string(),
        suggested_action: "Keep running regular sweeps to catch regressions early".to_string(),
    });

    recs
}
