//! # Framing
//!
//! Every message on the socket is one frame:
//!
//! ```text
//! request   u8 kind    u32 length (LE)   payload
//! response  u8 status  u32 length (LE)   payload
//! ```
//!
//! Kinds: `0` binary grid, `1` JSON field request. Statuses: `0` vertex
//! payload, `1` UTF-8 error message.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ServerError;

/// Bytes before the payload of every frame.
pub const FRAME_HEADER_BYTES: usize = 5;

/// Kind of request carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Pre-sampled binary grid.
    Grid,
    /// JSON field request sampled on the server.
    Field,
}

impl RequestKind {
    /// Parse a kind byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RequestKind::Grid),
            1 => Some(RequestKind::Field),
            _ => None,
        }
    }

    /// Kind byte on the wire.
    pub fn to_byte(self) -> u8 {
        match self {
            RequestKind::Grid => 0,
            RequestKind::Field => 1,
        }
    }
}

/// Outcome carried by a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Payload is a vertex list.
    Ok,
    /// Payload is an error message.
    Error,
}

impl Status {
    /// Parse a status byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Status::Ok),
            1 => Some(Status::Error),
            _ => None,
        }
    }

    /// Status byte on the wire.
    pub fn to_byte(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

/// A request as read from the socket. The kind byte is kept raw so an
/// unknown kind can be answered instead of dropping the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    pub kind: u8,
    pub payload: Vec<u8>,
}

/// A response to write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub status: Status,
    pub payload: Vec<u8>,
}

impl ResponseFrame {
    /// Successful response carrying encoded vertices.
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Error response carrying a message.
    pub fn error(message: impl ToString) -> Self {
        Self {
            status: Status::Error,
            payload: message.to_string().into_bytes(),
        }
    }
}

async fn read_header<R>(reader: &mut R, max_length: usize) -> Result<Option<(u8, usize)>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let tag = match reader.read_u8().await {
        Ok(tag) => tag,
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let length = reader.read_u32_le().await? as usize;
    if length > max_length {
        return Err(ServerError::FrameTooLarge {
            length,
            max: max_length,
        });
    }
    Ok(Some((tag, length)))
}

async fn read_payload<R>(reader: &mut R, length: usize) -> Result<Vec<u8>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

async fn write_frame<W>(writer: &mut W, tag: u8, payload: &[u8]) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let length = u32::try_from(payload.len()).map_err(|_| ServerError::FrameTooLarge {
        length: payload.len(),
        max: u32::MAX as usize,
    })?;
    writer.write_u8(tag).await?;
    writer.write_u32_le(length).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next request frame; `None` when the peer closed cleanly between
/// frames.
///
/// ## Errors
///
/// - `FrameTooLarge` when the declared length exceeds `max_length`; the
///   payload is not read
/// - `Io` when the stream ends inside a frame
pub async fn read_request<R>(reader: &mut R, max_length: usize) -> Result<Option<RequestFrame>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let Some((kind, length)) = read_header(reader, max_length).await? else {
        return Ok(None);
    };
    let payload = read_payload(reader, length).await?;
    Ok(Some(RequestFrame { kind, payload }))
}

/// Write a request frame (client side).
pub async fn write_request<W>(writer: &mut W, kind: RequestKind, payload: &[u8]) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, kind.to_byte(), payload).await
}

/// Read a response frame (client side).
pub async fn read_response<R>(reader: &mut R, max_length: usize) -> Result<Option<ResponseFrame>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let Some((tag, length)) = read_header(reader, max_length).await? else {
        return Ok(None);
    };
    let status = Status::from_byte(tag).ok_or(ServerError::UnknownKind(tag))?;
    let payload = read_payload(reader, length).await?;
    Ok(Some(ResponseFrame { status, payload }))
}

/// Write a response frame.
pub async fn write_response<W>(writer: &mut W, response: &ResponseFrame) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, response.status.to_byte(), &response.payload).await
}

// =============================================================================
// TESTS
// =============================================================================
