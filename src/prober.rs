use reqwest::Url;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ReporterError;

/// Poll-until-timeout liveness probe.
///
/// Issues a GET against `url`; on network failure or a non-2xx response,
/// sleeps `poll_interval` and retries until a success is observed or the
/// cumulative elapsed time reaches `timeout`. A slow-starting service is
/// therefore not declared dead on the first refused connection.
///
/// Network-level failure never returns an error. Only a malformed URL does,
/// which the aggregator classifies as a per-service `error` status.
pub async fn probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, ReporterError> {
    let url: Url = url
        .parse()
        .map_err(|e| ReporterError::Probe(format!("invalid probe url {}: {}", url, e)))?;

    let start = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Ok(false);
        }

        // Each attempt is capped at the remaining budget so a hanging
        // endpoint cannot push the probe past its timeout.
        match client.get(url.clone()).timeout(remaining).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(true),
            Ok(resp) => {
                debug!(%url, status = %resp.status(), "probe attempt returned non-success");
            }
            Err(e) => {
                debug!(%url, error = %e, "probe attempt failed");
            }
        }

        if start.elapsed() >= timeout {
            return Ok(false);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
