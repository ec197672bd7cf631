use crate::error::IpcError;
use crate::ipc::protocol::{CorrelationToken, LaunchResponse};
use crate::version::Version;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

pub(crate) type ResponseWaiter = oneshot::Receiver<Result<LaunchResponse, IpcError>>;

/// Requests awaiting a reply on one channel, keyed by correlation token.
///
/// Completing a token removes it, so the first response wins and any later
/// response for the same token finds nothing to complete.
#[derive(Debug, Default)]
pub(crate) struct PendingRequests {
    requests: HashMap<CorrelationToken, oneshot::Sender<Result<LaunchResponse, IpcError>>>,
    pings: VecDeque<(u64, oneshot::Sender<Version>)>,
    next_ping: u64,
    closed: Option<String>,
}

impl PendingRequests {
    pub(crate) fn register(&mut self, token: CorrelationToken) -> Result<ResponseWaiter, IpcError> {
        if let Some(reason) = &self.closed {
            return Err(IpcError::ConnectionLost {
                reason: reason.clone(),
            });
        }
        if self.requests.contains_key(&token) {
            return Err(IpcError::DuplicateToken {
                token: token.to_string(),
            });
        }
        let (tx, rx) = oneshot::channel();
        self.requests.insert(token, tx);
        Ok(rx)
    }

    /// Queues a pong waiter. The id lets a ping that was never written be
    /// withdrawn without shifting later pongs onto the wrong caller.
    pub(crate) fn register_ping(&mut self) -> Result<(u64, oneshot::Receiver<Version>), IpcError> {
        if let Some(reason) = &self.closed {
            return Err(IpcError::ConnectionLost {
                reason: reason.clone(),
            });
        }
        let id = self.next_ping;
        self.next_ping = self.next_ping.wrapping_add(1);
        let (tx, rx) = oneshot::channel();
        self.pings.push_back((id, tx));
        Ok((id, rx))
    }

    /// Withdraws a ping whose frame never reached the helper.
    pub(crate) fn abandon_ping(&mut self, id: u64) {
        self.pings.retain(|(queued, _)| *queued != id);
    }

    /// Hands `response` to its waiter. Returns `false` when the token is not
    /// pending (duplicate, late or never sent), in which case it is dropped.
    pub(crate) fn complete(&mut self, response: LaunchResponse) -> bool {
        match self.requests.remove(&response.token) {
            // A dropped receiver means the caller gave up; still consumed.
            Some(waiter) => {
                let _ = waiter.send(Ok(response));
                true
            }
            None => false,
        }
    }

    pub(crate) fn complete_ping(&mut self, version: Version) -> bool {
        match self.pings.pop_front() {
            Some((_, waiter)) => {
                let _ = waiter.send(version);
                true
            }
            None => false,
        }
    }

    /// Stops tracking `token` without resolving it.
    pub(crate) fn abandon(&mut self, token: CorrelationToken) {
        self.requests.remove(&token);
    }

    /// Fails every waiter and refuses new registrations.
    pub(crate) fn close(&mut self, reason: &str) {
        self.closed = Some(reason.to_string());
        for (_, waiter) in self.requests.drain() {
            let _ = waiter.send(Err(IpcError::ConnectionLost {
                reason: reason.to_string(),
            }));
        }
        // Dropping ping senders wakes their receivers with an error.
        self.pings.clear();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.len()
    }
}
