use anyhow::Result;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Restart policy for a long-running helper component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    /// Consecutive failures tolerated before giving up; 0 means unlimited.
    pub max_restarts: u32,
}

/// Runs `run_component` until `shutdown` fires, restarting it with
/// exponential backoff whenever it fails or returns early.
pub(crate) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    policy: RestartPolicy,
    shutdown: CancellationToken,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let initial = Duration::from_secs(policy.initial_backoff_secs.max(1));
        let max_backoff = Duration::from_secs(policy.max_backoff_secs).max(initial);
        let mut backoff = initial;
        let mut consecutive_failures: u32 = 0;

        loop {
            tracing::info!(component = name, "starting");
            let result = run_component().await;
            if shutdown.is_cancelled() {
                tracing::info!(component = name, "stopped");
                break;
            }
            match result {
                Ok(()) => tracing::warn!(component = name, "exited unexpectedly"),
                Err(e) => tracing::error!(component = name, error = %format!("{e:#}"), "failed"),
            }
            consecutive_failures = consecutive_failures.saturating_add(1);

            if policy.max_restarts > 0 && consecutive_failures > policy.max_restarts {
                tracing::error!(
                    component = name,
                    max_restarts = policy.max_restarts,
                    "exceeded max restarts, circuit open"
                );
                break;
            }

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(backoff) => {}
            }
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
    })
}
