//! Request/response exchange between the sandboxed requester and the helper.
//!
//! The requester holds an [`IpcCoordinator`]; the helper runs a
//! [`HelperServer`] that validates each request with a [`RequestHandler`]
//! before anything is launched.

mod client;
mod codec;
mod endpoint;
mod handler;
mod launcher;
mod pending;
mod protocol;
mod server;
mod state;

pub use client::IpcCoordinator;
pub use codec::{FrameCodec, HelperCodec, MAX_FRAME_LEN, RequesterCodec};
pub use endpoint::Endpoint;
pub use handler::RequestHandler;
pub use launcher::{Launcher, SystemLauncher};
pub use protocol::{
    CorrelationToken, FailureReason, HelperFrame, LaunchRequest, LaunchResponse, Outcome,
    RequesterFrame,
};
pub use server::HelperServer;
pub use state::{RequestLifecycle, RequestState};
