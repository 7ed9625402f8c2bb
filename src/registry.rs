use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ReporterError;
use crate::types::ServiceDescriptor;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    services: BTreeMap<String, ServiceDescriptor>,
}

/// Load the service registry from a JSON file of the shape
/// `{ "services": { "<name>": { command, args, port, healthPath, env } } }`.
///
/// Shape violations are rejected here, at the boundary, so the aggregator
/// only ever sees well-formed descriptors. The caller decides whether a
/// failure is fatal; the standard sweep treats it as "zero services".
pub fn load_registry<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, ServiceDescriptor>, ReporterError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ReporterError::Configuration(format!("cannot read registry {}: {}", path.display(), e))
    })?;
    let file: RegistryFile = serde_json::from_str(&raw).map_err(|e| {
        ReporterError::Configuration(format!("malformed registry {}: {}", path.display(), e))
    })?;
    Ok(file.services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_registry(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_registry_basic() {
        let f = write_registry(
            r#"{
                "services": {
                    "api": {
                        "command": "node",
                        "args": ["server.js"],
                        "port": 3000,
                        "healthPath": "/health",
                        "env": {"NODE_ENV": "production"}
                    },
                    "worker": {
                        "command": "python",
                        "args": ["worker.py"],
                        "port": 3010
                    }
                }
            }"#,
        );

        let registry = load_registry(f.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let api = &registry["api"];
        assert_eq!(api.command, "node");
        assert_eq!(api.port, 3000);
        assert_eq!(api.probe_url(), "http://localhost:3000/health");
        assert_eq!(api.env.get("NODE_ENV").map(String::as_str), Some("production"));

        // healthPath and env default when omitted
        let worker = &registry["worker"];
        assert_eq!(worker.health_path, "/health");
        assert!(worker.env.is_empty());
        assert_eq!(worker.probe_url(), "http://localhost:3010/health");
    }

    #[test]
    fn test_custom_health_path() {
        let f = write_registry(
            r#"{"services": {"gw": {"command": "./gw", "port": 8080, "healthPath": "/status/live"}}}"#,
        );
        let registry = load_registry(f.path()).unwrap();
        assert_eq!(registry["gw"].probe_url(), "http://localhost:8080/status/live");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = load_registry("/nonexistent/services.json").unwrap_err();
        assert!(matches!(err, ReporterError::Configuration(_)));
        assert!(err.to_string().contains("cannot read registry"));
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        let f = write_registry("{not json");
        let err = load_registry(f.path()).unwrap_err();
        assert!(matches!(err, ReporterError::Configuration(_)));
        assert!(err.to_string().contains("malformed registry"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let f = write_registry(
            r#"{"services": {"api": {"command": "node", "port": 3000, "restartPolicy": "always"}}}"#,
        );
        assert!(load_registry(f.path()).is_err());

        let f = write_registry(r#"{"services": {}, "version": 2}"#);
        assert!(load_registry(f.path()).is_err());
    }

    #[test]
    fn test_empty_registry() {
        let f = write_registry(r#"{"services": {}}"#);
        let registry = load_registry(f.path()).unwrap();
        assert!(registry.is_empty());
    }
}
