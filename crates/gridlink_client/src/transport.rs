//! Transport abstraction for frame exchange.

use crate::error::{ClientError, ClientResult};
use gridlink_protocol::ServerFrame;
use std::collections::VecDeque;

/// A frame transport carries opaque frame payloads to and from the server.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (WebSocket, TCP, mock for testing, etc.). Framing,
/// compression, and reconnection live below this interface; the connection
/// only sees whole frames.
pub trait FrameTransport {
    /// Sends one frame to the server.
    fn send(&mut self, frame: &[u8]) -> ClientResult<()>;

    /// Receives the next frame, if one is available.
    ///
    /// Returns `Ok(None)` when no frame is currently pending. An error means
    /// the transport has failed and no further frames will arrive.
    fn recv(&mut self) -> ClientResult<Option<Vec<u8>>>;

    /// Checks if the transport is connected.
    fn is_connected(&self) -> bool;

    /// Closes the transport connection.
    fn close(&mut self) -> ClientResult<()>;
}

/// A mock transport for testing.
///
/// Frames pushed with [`push_frame`](MockTransport::push_frame) are returned
/// by `recv` in order; everything sent is recorded for inspection.
#[derive(Debug, Default)]
pub struct MockTransport {
    connected: bool,
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Creates a new connected mock transport.
    pub fn new() -> Self {
        Self {
            connected: true,
            inbound: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Queues a server frame for delivery.
    pub fn push_frame(&mut self, frame: &ServerFrame) {
        self.inbound.push_back(frame.encode());
    }

    /// Queues raw bytes for delivery.
    pub fn push_bytes(&mut self, bytes: Vec<u8>) {
        self.inbound.push_back(bytes);
    }

    /// All frames sent so far, oldest first.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Sets the connected state.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl FrameTransport for MockTransport {
    fn send(&mut self, frame: &[u8]) -> ClientResult<()> {
        if !self.connected {
            return Err(ClientError::ConnectionClosed);
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self) -> ClientResult<Option<Vec<u8>>> {
        if !self.connected {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(self.inbound.pop_front())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) -> ClientResult<()> {
        self.connected = false;
        Ok(())
    }
}
