use crate::error::IpcError;
use crate::ipc::protocol::CorrelationToken;
use std::fmt;

/// Requester-side lifecycle of one request.
///
/// Terminal states are final: a retry is a new request with a new token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    Idle,
    /// Frame written to the channel.
    Sent,
    AwaitingResponse,
    Completed,
    /// No reply in time, or abandoned locally by the caller.
    TimedOut,
    ConnectionLost,
}

impl RequestState {
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Sent | Self::ConnectionLost)
                | (Self::Sent, Self::AwaitingResponse | Self::ConnectionLost)
                | (
                    Self::AwaitingResponse,
                    Self::Completed | Self::TimedOut | Self::ConnectionLost
                )
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut | Self::ConnectionLost)
    }

    /// Terminal state reached when an exchange ends with `err`.
    pub fn after_error(err: &IpcError) -> Self {
        match err {
            IpcError::TimedOut { .. } => Self::TimedOut,
            IpcError::ConnectionLost { .. }
            | IpcError::Codec(_)
            | IpcError::ServiceUnavailable { .. }
            | IpcError::AuthorizationDenied { .. }
            // Rejected before anything is written, while still `Idle`.
            | IpcError::DuplicateToken { .. } => Self::ConnectionLost,
            // Helper-reported failures still completed the exchange.
            IpcError::ProtocolIncompatible { .. }
            | IpcError::UnknownCapability { .. }
            | IpcError::LaunchError { .. } => Self::Completed,
        }
    }
}

/// Tracks and logs the transitions of one in-flight request.
pub struct RequestLifecycle {
    token: CorrelationToken,
    state: RequestState,
}

impl RequestLifecycle {
    pub fn new(token: CorrelationToken) -> Self {
        Self {
            token,
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Moves to `next`. Invalid transitions are logged and ignored so a
    /// terminal state is never left.
    pub fn advance(&mut self, next: RequestState) -> RequestState {
        if self.state.can_transition_to(next) {
            tracing::debug!(token = %self.token, from = %self.state, to = %next, "request state");
            self.state = next;
        } else {
            tracing::warn!(token = %self.token, from = %self.state, to = %next, "ignoring invalid request transition");
        }
        self.state
    }
}

impl fmt::Debug for RequestLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestLifecycle({} {})", self.token, self.state)
    }
}
