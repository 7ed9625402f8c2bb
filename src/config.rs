use std::collections::HashMap;

use crate::types::Settings;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_PROBE_POLL_INTERVAL_MS: u64 = 500;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_settings() -> Settings {
    load_settings_with_env(&SystemEnvironment)
}

/// All knobs have defaults; invalid numeric values fall back rather than
/// aborting, since a misconfigured knob should not block a sweep.
pub fn load_settings_with_env<E: EnvironmentProvider>(env: &E) -> Settings {
    let registry_path = env
        .get_var("SERVICE_REGISTRY_PATH")
        .unwrap_or_else(|| "services.json".to_string());

    let probe_timeout_ms: u64 = env
        .get_var("PROBE_TIMEOUT_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);

    let probe_poll_interval_ms: u64 = env
        .get_var("PROBE_POLL_INTERVAL_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROBE_POLL_INTERVAL_MS);

    let report_dir = env
        .get_var("REPORT_DIR")
        .unwrap_or_else(|| "reports".to_string());

    let workflow_dir = env
        .get_var("WORKFLOW_DIR")
        .unwrap_or_else(|| ".github/workflows".to_string());

    let required_workflows: Vec<String> = env
        .get_var("REQUIRED_WORKFLOWS")
        .unwrap_or_else(|| "ci.yml,deploy.yml".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Settings {
        registry_path,
        probe_timeout_ms,
        probe_poll_interval_ms,
        report_dir,
        workflow_dir,
        required_workflows,
    }
}
