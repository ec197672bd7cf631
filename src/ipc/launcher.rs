use crate::capabilities::ApplicationCapability;
use crate::config::HelperConfig;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// How long a launch command may run before it counts as launched.
pub const LAUNCH_SETTLE: Duration = Duration::from_millis(500);

/// Performs the privileged launch on the helper side.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, capability: &ApplicationCapability, path: &Path) -> Result<()>;
}

/// Launches through a configured argv template.
///
/// Placeholders `{bundle}`, `{name}` and `{path}` are substituted as whole
/// arguments; the program is spawned directly, never through a shell, so a
/// path cannot inject extra arguments or commands.
///
/// A command that exits within the settle window must exit successfully.
/// One still running when the window closes is left detached and treated as
/// launched, so apps started directly never hold the connection.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    default_command: Vec<String>,
    overrides: BTreeMap<String, Vec<String>>,
    settle: Duration,
}

impl SystemLauncher {
    pub fn new(default_command: Vec<String>) -> Self {
        Self {
            default_command,
            overrides: BTreeMap::new(),
            settle: LAUNCH_SETTLE,
        }
    }

    pub fn from_config(config: &HelperConfig) -> Self {
        Self {
            default_command: config.launch_command.clone(),
            overrides: config.launch_overrides.clone(),
            settle: LAUNCH_SETTLE,
        }
    }

    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Concrete argv for one launch. Bundle and name always come from the
    /// application variant, never from the entry's routing identifier.
    pub fn argv(&self, capability: &ApplicationCapability, path: &Path) -> Vec<String> {
        let app = capability.app;
        let template = self
            .overrides
            .get(app.bundle_id())
            .unwrap_or(&self.default_command);
        let path = path.to_string_lossy();
        template
            .iter()
            .map(|arg| {
                arg.replace("{bundle}", app.bundle_id())
                    .replace("{name}", app.display_name())
                    .replace("{path}", &path)
            })
            .collect()
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn launch(&self, capability: &ApplicationCapability, path: &Path) -> Result<()> {
        let argv = self.argv(capability, path);
        let Some((program, args)) = argv.split_first() else {
            bail!("launch command is empty");
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let settled = tokio::time::timeout(self.settle, child.wait()).await;
        match settled {
            Ok(status) => {
                let status = status.with_context(|| format!("failed to wait for {program}"))?;
                if !status.success() {
                    let mut stderr = String::new();
                    if let Some(mut pipe) = child.stderr.take() {
                        // A grandchild may hold the pipe open.
                        let _ = tokio::time::timeout(self.settle, pipe.read_to_string(&mut stderr))
                            .await;
                    }
                    bail!("{program} exited with {status}: {}", stderr.trim());
                }
            }
            Err(_) => {
                tracing::debug!(program = %program, "launch command still running, detaching");
                let program = program.clone();
                tokio::spawn(async move {
                    match child.wait_with_output().await {
                        Ok(output) => tracing::debug!(
                            program = %program,
                            status = %output.status,
                            "detached launch command exited"
                        ),
                        Err(err) => tracing::debug!(
                            program = %program,
                            error = %err,
                            "detached launch command could not be reaped"
                        ),
                    }
                });
            }
        }
        tracing::info!(
            capability = capability.identifier,
            path = %path.display(),
            "launched application"
        );
        Ok(())
    }
}
