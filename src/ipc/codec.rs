use crate::error::IpcError;
use crate::ipc::protocol::{HelperFrame, RequesterFrame};
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// Upper bound for a single frame. Requests carry one path and one
/// identifier, so anything larger is a misbehaving peer.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Length-prefixed JSON: 4-byte big-endian length, then the payload.
///
/// Decodes `In` and encodes `Out`, so each side of the channel gets a codec
/// that can only speak its own half of the protocol.
#[derive(Debug)]
pub struct FrameCodec<In, Out> {
    inner: LengthDelimitedCodec,
    _frames: PhantomData<fn(Out) -> In>,
}

/// Codec used by the helper: reads requester frames, writes helper frames.
pub type HelperCodec = FrameCodec<RequesterFrame, HelperFrame>;

/// Codec used by the requester.
pub type RequesterCodec = FrameCodec<HelperFrame, RequesterFrame>;

impl<In, Out> FrameCodec<In, Out> {
    pub fn new() -> Self {
        Self {
            inner: LengthDelimitedCodec::builder()
                .max_frame_length(MAX_FRAME_LEN)
                .new_codec(),
            _frames: PhantomData,
        }
    }
}

impl<In, Out> Default for FrameCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned, Out> Decoder for FrameCodec<In, Out> {
    type Item = In;
    type Error = IpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<In>, IpcError> {
        let Some(frame) = self.inner.decode(src)? else {
            return Ok(None);
        };
        serde_json::from_slice(&frame)
            .map(Some)
            .map_err(|err| IpcError::Codec(err.to_string()))
    }
}

impl<In, Out: Serialize> Encoder<Out> for FrameCodec<In, Out> {
    type Error = IpcError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), IpcError> {
        let payload = serde_json::to_vec(&item).map_err(|err| IpcError::Codec(err.to_string()))?;
        self.inner.encode(Bytes::from(payload), dst)?;
        Ok(())
    }
}
