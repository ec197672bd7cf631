use crate::error::IpcError;
use crate::ipc::codec::HelperCodec;
use crate::ipc::handler::RequestHandler;
use crate::ipc::launcher::Launcher;
use crate::ipc::protocol::{HelperFrame, RequesterFrame};
use anyhow::{Context, Result, bail};
use futures_util::{SinkExt, StreamExt};
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

/// Helper-side listener on the shared Unix socket.
pub struct HelperServer<L> {
    listener: UnixListener,
    socket_path: PathBuf,
    service_name: String,
    allowed_uid: u32,
    handler: Arc<RequestHandler<L>>,
}

impl<L: Launcher + 'static> HelperServer<L> {
    /// Binds `socket_path`, replacing a stale socket file, and restricts it
    /// to the owner. Only peers running as the current user are served.
    ///
    /// Fails when the path holds anything other than a socket, or a socket
    /// another helper is still listening on.
    pub fn bind(
        socket_path: &Path,
        service_name: impl Into<String>,
        handler: RequestHandler<L>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        remove_stale_socket(socket_path)?;

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind {}", socket_path.display()))?;
        std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))
            .context("Failed to restrict socket permissions")?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
            service_name: service_name.into(),
            allowed_uid: nix::unistd::getuid().as_raw(),
            handler: Arc::new(handler),
        })
    }

    /// Serve peers running as `uid` instead of the current user.
    #[must_use]
    pub fn with_allowed_uid(mut self, uid: u32) -> Self {
        self.allowed_uid = uid;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accepts connections until `shutdown` fires, then removes the socket.
    /// Each connection is served by its own task, one request at a time.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            socket = %self.socket_path.display(),
            service = %self.service_name,
            version = %self.handler.version(),
            "helper listening"
        );

        let result = loop {
            tokio::select! {
                () = shutdown.cancelled() => break Ok(()),
                accepted = self.listener.accept() => {
                    let (stream, _) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            break Err(anyhow::Error::new(err).context("Failed to accept connection"));
                        }
                    };
                    let connection = Connection {
                        service_name: self.service_name.clone(),
                        allowed_uid: self.allowed_uid,
                        handler: Arc::clone(&self.handler),
                    };
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(err) = connection.run(stream, shutdown).await {
                            tracing::debug!(error = %err, "connection ended with error");
                        }
                    });
                }
            }
        };

        let _ = std::fs::remove_file(&self.socket_path);
        tracing::info!("helper stopped listening");
        result
    }
}

fn remove_stale_socket(socket_path: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(socket_path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to stat {}", socket_path.display())));
        }
    };
    if !metadata.file_type().is_socket() {
        bail!("{} exists but is not a socket", socket_path.display());
    }
    if std::os::unix::net::UnixStream::connect(socket_path).is_ok() {
        bail!(
            "another helper is already listening on {}",
            socket_path.display()
        );
    }

    std::fs::remove_file(socket_path)
        .with_context(|| format!("Failed to remove stale socket {}", socket_path.display()))?;
    tracing::debug!(socket = %socket_path.display(), "removed stale socket");
    Ok(())
}

struct Connection<L> {
    service_name: String,
    allowed_uid: u32,
    handler: Arc<RequestHandler<L>>,
}

impl<L: Launcher> Connection<L> {
    async fn run(self, stream: UnixStream, shutdown: CancellationToken) -> Result<(), IpcError> {
        let peer_uid = stream.peer_cred().map(|cred| cred.uid());
        let mut framed = Framed::new(stream, HelperCodec::new());

        match peer_uid {
            Ok(uid) if uid == self.allowed_uid => {}
            Ok(uid) => {
                tracing::warn!(peer_uid = uid, "denying connection from another user");
                return framed
                    .send(HelperFrame::Denied {
                        reason: format!("peer uid {uid} is not permitted"),
                    })
                    .await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "denying connection without peer credentials");
                return framed
                    .send(HelperFrame::Denied {
                        reason: "peer credentials unavailable".into(),
                    })
                    .await;
            }
        }

        framed
            .send(HelperFrame::Welcome {
                service: self.service_name.clone(),
                version: self.handler.version(),
            })
            .await?;

        loop {
            let frame = tokio::select! {
                () = shutdown.cancelled() => return Ok(()),
                frame = framed.next() => frame,
            };
            match frame {
                Some(Ok(RequesterFrame::Launch(request))) => {
                    tracing::debug!(
                        token = %request.token,
                        capability = %request.capability,
                        path = %request.path,
                        "received launch request"
                    );
                    let response = self.handler.handle(&request).await;
                    framed.send(HelperFrame::Response(response)).await?;
                }
                Some(Ok(RequesterFrame::Ping)) => {
                    framed
                        .send(HelperFrame::Pong {
                            version: self.handler.version(),
                        })
                        .await?;
                }
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            }
        }
    }
}
