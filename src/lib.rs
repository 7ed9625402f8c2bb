// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod registry;
pub mod prober;
pub mod collector;
pub mod sweep;
pub mod recommend;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::ReporterError;
pub use config::{
    load_settings, load_settings_with_env, EnvironmentProvider, MockEnvironment, SystemEnvironment,
};
pub use registry::load_registry;
pub use prober::probe;
pub use collector::{
    build_performance_metrics, check_required_workflows, collect_system_info, rate_performance,
};
pub use sweep::{classify_overall, compute_health_score, run_health_sweep, RunContext};
pub use recommend::derive_recommendations;
pub use report::{emit_report, render_json, render_markdown, render_summary, EmittedArtifacts};
