use crate::error::IpcError;
use crate::ipc::codec::RequesterCodec;
use crate::ipc::endpoint::Endpoint;
use crate::ipc::pending::PendingRequests;
use crate::ipc::protocol::{HelperFrame, LaunchRequest, LaunchResponse, RequesterFrame};
use crate::ipc::state::{RequestLifecycle, RequestState};
use crate::version::Version;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

type Channel = Framed<UnixStream, RequesterCodec>;

/// Requester side of the channel to the helper.
///
/// One connection carries any number of concurrent requests; a background
/// task routes each response to the caller waiting on its token.
pub struct IpcCoordinator {
    service: String,
    helper_version: Version,
    request_timeout: Duration,
    sink: Mutex<SplitSink<Channel, RequesterFrame>>,
    pending: Arc<Mutex<PendingRequests>>,
    reader: JoinHandle<()>,
}

impl IpcCoordinator {
    /// Connects and completes the greeting.
    ///
    /// A missing socket, a refused connection or a helper announcing another
    /// service name is `ServiceUnavailable`; a helper rejecting our
    /// credentials is `AuthorizationDenied`.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, IpcError> {
        let unavailable = |reason: String| IpcError::ServiceUnavailable {
            service: endpoint.service_name.clone(),
            reason,
        };

        let stream = match timeout(
            endpoint.connect_timeout,
            UnixStream::connect(&endpoint.socket_path),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                return Err(unavailable(format!(
                    "{}: {err}",
                    endpoint.socket_path.display()
                )));
            }
            Err(_) => return Err(unavailable("connect timed out".into())),
        };

        let mut framed = Framed::new(stream, RequesterCodec::new());
        let greeting = match timeout(endpoint.connect_timeout, framed.next()).await {
            Ok(Some(frame)) => frame?,
            Ok(None) => return Err(unavailable("helper closed the connection before greeting".into())),
            Err(_) => return Err(unavailable("no greeting from helper".into())),
        };

        let helper_version = match greeting {
            HelperFrame::Welcome { service, version } if service == endpoint.service_name => version,
            HelperFrame::Welcome { service, .. } => {
                return Err(unavailable(format!("helper announced service {service}")));
            }
            HelperFrame::Denied { reason } => return Err(IpcError::AuthorizationDenied { reason }),
            other => return Err(IpcError::Codec(format!("expected welcome, got {other:?}"))),
        };

        tracing::debug!(
            service = %endpoint.service_name,
            helper_version = %helper_version,
            "connected to helper"
        );

        let (sink, stream) = framed.split();
        let pending = Arc::new(Mutex::new(PendingRequests::default()));
        let reader = tokio::spawn(read_loop(stream, Arc::clone(&pending)));

        Ok(Self {
            service: endpoint.service_name.clone(),
            helper_version,
            request_timeout: endpoint.request_timeout,
            sink: Mutex::new(sink),
            pending,
            reader,
        })
    }

    /// Version the helper announced when the connection was made.
    pub fn helper_version(&self) -> Version {
        self.helper_version
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// `false` once the helper closed the channel or it broke.
    pub async fn is_connected(&self) -> bool {
        !self.pending.lock().await.is_closed()
    }

    /// Sends `request` and waits for its response, at most the request
    /// timeout.
    pub async fn send(&self, request: LaunchRequest) -> Result<LaunchResponse, IpcError> {
        self.send_cancellable(request, CancellationToken::new()).await
    }

    /// Like [`send`](Self::send), but `cancel` abandons the request locally.
    /// The helper is not told; a late response is discarded.
    pub async fn send_cancellable(
        &self,
        request: LaunchRequest,
        cancel: CancellationToken,
    ) -> Result<LaunchResponse, IpcError> {
        let token = request.token;
        let mut lifecycle = RequestLifecycle::new(token);
        let waiter = self.pending.lock().await.register(token)?;

        if let Err(err) = self.write(RequesterFrame::Launch(request)).await {
            self.pending.lock().await.abandon(token);
            lifecycle.advance(RequestState::after_error(&err));
            return Err(err);
        }
        lifecycle.advance(RequestState::Sent);
        lifecycle.advance(RequestState::AwaitingResponse);

        let started = Instant::now();
        let outcome = tokio::select! {
            received = waiter => received.unwrap_or_else(|_| {
                Err(IpcError::ConnectionLost {
                    reason: "response channel dropped".into(),
                })
            }),
            () = tokio::time::sleep(self.request_timeout) => Err(IpcError::TimedOut {
                after: self.request_timeout,
            }),
            () = cancel.cancelled() => Err(IpcError::TimedOut {
                after: started.elapsed(),
            }),
        };

        match &outcome {
            Ok(_) => {
                lifecycle.advance(RequestState::Completed);
            }
            Err(err) => {
                if matches!(err, IpcError::TimedOut { .. }) {
                    self.pending.lock().await.abandon(token);
                }
                tracing::warn!(%token, error = %err, "request did not complete");
                lifecycle.advance(RequestState::after_error(err));
            }
        }
        outcome
    }

    /// Round-trip liveness check returning the helper's protocol version.
    pub async fn ping(&self) -> Result<Version, IpcError> {
        let (id, waiter) = self.pending.lock().await.register_ping()?;
        if let Err(err) = self.write(RequesterFrame::Ping).await {
            self.pending.lock().await.abandon_ping(id);
            return Err(err);
        }
        match timeout(self.request_timeout, waiter).await {
            Ok(Ok(version)) => Ok(version),
            Ok(Err(_)) => Err(IpcError::ConnectionLost {
                reason: "helper closed the connection".into(),
            }),
            Err(_) => Err(IpcError::TimedOut {
                after: self.request_timeout,
            }),
        }
    }

    async fn write(&self, frame: RequesterFrame) -> Result<(), IpcError> {
        self.sink.lock().await.send(frame).await
    }
}

impl Drop for IpcCoordinator {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for IpcCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcCoordinator")
            .field("service", &self.service)
            .field("helper_version", &self.helper_version)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

async fn read_loop(mut frames: SplitStream<Channel>, pending: Arc<Mutex<PendingRequests>>) {
    let reason = loop {
        match frames.next().await {
            Some(Ok(HelperFrame::Response(response))) => {
                let token = response.token;
                if !pending.lock().await.complete(response) {
                    tracing::debug!(%token, "discarding response for a token that is not pending");
                }
            }
            Some(Ok(HelperFrame::Pong { version })) => {
                if !pending.lock().await.complete_ping(version) {
                    tracing::debug!("discarding unsolicited pong");
                }
            }
            Some(Ok(HelperFrame::Denied { reason })) => {
                break format!("helper denied the connection: {reason}");
            }
            Some(Ok(HelperFrame::Welcome { .. })) => tracing::debug!("ignoring repeated welcome"),
            Some(Err(err)) => break err.to_string(),
            None => break "helper closed the connection".to_string(),
        }
    };
    tracing::debug!(%reason, "helper channel closed");
    pending.lock().await.close(&reason);
}
