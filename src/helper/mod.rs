//! The privileged side: owns the socket and performs launches.

mod service;
mod supervisor;

pub use service::handle_command as handle_service_command;
pub use supervisor::RestartPolicy;

use crate::capabilities::CapabilityRegistry;
use crate::config::Config;
use crate::ipc::{HelperServer, RequestHandler, SystemLauncher};
use anyhow::Result;
use std::sync::Arc;
use supervisor::spawn_component_supervisor;
use tokio_util::sync::CancellationToken;

impl From<&crate::config::HelperConfig> for RestartPolicy {
    fn from(config: &crate::config::HelperConfig) -> Self {
        Self {
            initial_backoff_secs: config.initial_backoff_secs,
            max_backoff_secs: config.max_backoff_secs,
            max_restarts: config.max_restarts,
        }
    }
}

/// Serves the helper socket until Ctrl-C, rebinding after failures.
pub async fn run(config: Arc<Config>) -> Result<()> {
    // Fail before binding if the catalog is inconsistent.
    CapabilityRegistry::builtin()?;

    let shutdown = CancellationToken::new();
    let listener_config = Arc::clone(&config);
    let listener_shutdown = shutdown.clone();
    let mut handle = spawn_component_supervisor(
        "listener",
        RestartPolicy::from(&config.helper),
        shutdown.clone(),
        move || {
            let config = Arc::clone(&listener_config);
            let shutdown = listener_shutdown.clone();
            async move { serve_once(&config, shutdown).await }
        },
    );

    println!("SzContext helper listening on {}", config.socket_path().display());
    println!("   Press Ctrl+C to stop");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            shutdown.cancel();
            let _ = handle.await;
            Ok(())
        }
        _ = &mut handle => {
            anyhow::bail!("helper listener gave up after repeated failures")
        }
    }
}

async fn serve_once(config: &Config, shutdown: CancellationToken) -> Result<()> {
    let handler = RequestHandler::new(
        CapabilityRegistry::builtin()?,
        SystemLauncher::from_config(&config.helper),
    );
    HelperServer::bind(&config.socket_path(), config.ipc.service_name.clone(), handler)?
        .serve(shutdown)
        .await
}
