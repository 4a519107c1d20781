//! TCP channel with exact-size I/O and non-consuming dispatch.
//!
//! [`Channel`] wraps one connected `TcpStream` and enforces the transport
//! contract:
//!
//! - `send_exact` succeeds only when every byte was accepted; interrupted
//!   writes are retried by `write_all` under the hood and any other short
//!   write surfaces as a hard error.
//! - `recv_exact` returns exactly the requested byte count, maps a closed
//!   peer to [`ProtocolError::ConnectionClosed`] (distinct from other I/O
//!   failures), and gives up with [`ProtocolError::Timeout`] once the
//!   per-read deadline elapses.
//! - `peek_kind` inspects the next frame's magic without consuming it, so
//!   a frame meant for the other protocol (or for nobody) stays on the
//!   stream untouched.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::core::control::{ControlPacket, CONTROL_FRAME_LEN};
use crate::core::data::{DataPacket, REQUEST_PAYLOAD_LEN, RESPONSE_PAYLOAD_LEN};
use crate::core::header::{FrameHeader, HEADER_LEN};
use crate::error::{ProtocolError, Result};
use crate::protocol::dispatcher::FrameKind;

/// One complete frame pulled off the stream, already classified.
#[derive(Debug, Clone)]
pub enum Frame {
    Control(ControlPacket),
    Data(DataPacket),
}

/// A connected stream plus the read deadline applied to every receive.
#[derive(Debug)]
pub struct Channel {
    stream: TcpStream,
    read_timeout: Duration,
}

impl Channel {
    /// Wrap an already-connected stream (e.g. one returned by `accept`).
    pub fn new(stream: TcpStream, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
        }
    }

    /// Connect to `addr` under `connect_timeout`.
    pub async fn connect(
        addr: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::Timeout)??;
        debug!(peer = %addr, "connected");

        Ok(Self::new(stream, read_timeout))
    }

    pub fn peer_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Write the whole buffer or fail; no partial success is reported.
    pub async fn send_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        trace!(bytes = bytes.len(), "sent");
        Ok(())
    }

    /// Read exactly `n` bytes under the channel's read deadline.
    pub async fn recv_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        timeout(self.read_timeout, self.stream.read_exact(&mut buf))
            .await
            .map_err(|_| ProtocolError::Timeout)?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
                _ => ProtocolError::Io(e),
            })?;
        trace!(bytes = n, "received");
        Ok(buf)
    }

    /// Peek the next frame's magic and classify it, consuming nothing.
    ///
    /// `UnrecognizedFrame` leaves the stream byte-for-byte intact, so the
    /// caller may retry, wait, or close without desynchronizing.
    pub async fn peek_kind(&mut self) -> Result<FrameKind> {
        let mut prefix = [0u8; 4];
        let deadline = self.read_timeout;

        timeout(deadline, async {
            loop {
                let peeked = self.stream.peek(&mut prefix).await?;
                if peeked == 0 {
                    return Err(ProtocolError::ConnectionClosed);
                }
                if peeked >= 4 {
                    return Ok(());
                }
                // Partial magic in the buffer; wait for the rest to land.
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .map_err(|_| ProtocolError::Timeout)??;

        FrameKind::from_prefix(&prefix)
    }

    /// Send one control frame.
    pub async fn send_control(&mut self, packet: &ControlPacket) -> Result<()> {
        self.send_exact(&packet.to_bytes()).await
    }

    /// Send one data frame.
    pub async fn send_data(&mut self, packet: &DataPacket) -> Result<()> {
        self.send_exact(&packet.to_bytes()).await
    }

    /// Receive one control frame.
    ///
    /// Peeks first: if the next frame is a data frame it is left on the
    /// stream and [`ProtocolError::UnexpectedFrame`] is returned, so a
    /// subsequent [`Self::recv_data`] still succeeds.
    pub async fn recv_control(&mut self) -> Result<ControlPacket> {
        match self.peek_kind().await? {
            FrameKind::Control => {}
            FrameKind::Data => return Err(ProtocolError::UnexpectedFrame),
        }

        let buf = self.recv_exact(CONTROL_FRAME_LEN).await?;
        ControlPacket::from_bytes(&buf)
    }

    /// Receive one data frame: header first, then the declared payload.
    ///
    /// Same non-consuming behavior as [`Self::recv_control`] when the next
    /// frame belongs to the control channel.
    pub async fn recv_data(&mut self) -> Result<DataPacket> {
        match self.peek_kind().await? {
            FrameKind::Data => {}
            FrameKind::Control => return Err(ProtocolError::UnexpectedFrame),
        }

        let header_bytes = self.recv_exact(HEADER_LEN).await?;
        let header = FrameHeader::decode(&header_bytes)?;

        // Bound the allocation before trusting the declared length.
        let payload_len = header.payload_length as usize;
        if payload_len != REQUEST_PAYLOAD_LEN && payload_len != RESPONSE_PAYLOAD_LEN {
            return Err(ProtocolError::InvalidPayloadLength(header.payload_length));
        }

        let mut frame = header_bytes;
        frame.extend_from_slice(&self.recv_exact(payload_len).await?);
        DataPacket::from_bytes(&frame)
    }

    /// Receive whichever frame arrives next, classified by the peeked magic.
    pub async fn recv_frame(&mut self) -> Result<Frame> {
        match self.peek_kind().await? {
            FrameKind::Control => Ok(Frame::Control(self.recv_control().await?)),
            FrameKind::Data => Ok(Frame::Data(self.recv_data().await?)),
        }
    }

    /// Half-close the write side, signalling the peer we are done.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
