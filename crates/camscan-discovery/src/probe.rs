//! TCP connect probing for open camera ports

use camscan_core::{ProbeResult, ProbeStatus, ScanTarget};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::transport::CameraTransport;

/// Probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;

/// Probe a single target
///
/// Timeouts, refusals and any other connect error all count as closed.
pub async fn probe_target(
    transport: &dyn CameraTransport,
    target: ScanTarget,
    timeout: Duration,
) -> ProbeResult {
    let status = match transport.connect(target.socket_addr(), timeout).await {
        Ok(()) => {
            debug!(target = %target, "Port open");
            ProbeStatus::Open
        }
        Err(e) => {
            trace!(target = %target, error = %e, "Port closed");
            ProbeStatus::Closed
        }
    };

    ProbeResult { target, status }
}

/// Probe every target concurrently and wait for all of them
///
/// With `max_concurrent` unset every probe is in flight at once; otherwise a
/// semaphore caps the number of simultaneous connects. Results are returned
/// in the same order as `targets`.
pub async fn probe_targets(
    transport: Arc<dyn CameraTransport>,
    targets: &[ScanTarget],
    timeout: Duration,
    max_concurrent: Option<usize>,
) -> Vec<ProbeResult> {
    let limiter = max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let mut tasks = JoinSet::new();

    for (index, &target) in targets.iter().enumerate() {
        let transport = Arc::clone(&transport);
        let limiter = limiter.clone();
        tasks.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            (index, probe_target(transport.as_ref(), target, timeout).await)
        });
    }

    let mut results = Vec::with_capacity(targets.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!(error = %e, "Probe task failed"),
        }
    }
    results.sort_by_key(|(index, _)| *index);

    let results: Vec<ProbeResult> = results.into_iter().map(|(_, r)| r).collect();
    debug!(
        "Probed {} targets, {} open",
        targets.len(),
        results.iter().filter(|r| r.is_open()).count()
    );
    results
}
