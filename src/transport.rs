//! TCP transport for the Modbus client
//!
//! Owns a single outbound connection and exposes the four primitives the
//! client drives per exchange: connect, send, receive, disconnect. The
//! state machine is `Idle -> Connected -> Idle`, re-entrant: connecting
//! while connected tears the old stream down first, so no handle leaks
//! across reconnects.
//!
//! Only the connect step is bounded by a timeout. Send and receive await
//! until the peer responds or closes the channel; a stalled peer stalls
//! the exchange. This is a documented limitation of the one-shot
//! connection model, not an oversight.

use std::io::ErrorKind;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_MS, RECV_BUFFER_SIZE};
use crate::error::{ModbusError, ModbusResult};

/// Transport statistics counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Connections successfully established
    pub connects: u64,
    /// Frames written to the peer
    pub frames_sent: u64,
    /// Frames read from the peer
    pub frames_received: u64,
    /// Total bytes written
    pub bytes_sent: u64,
    /// Total bytes read
    pub bytes_received: u64,
}

/// Connection-per-exchange TCP transport
///
/// Holds at most one stream at a time. The caller (the Modbus client)
/// runs exactly one request/response round trip between `connect()` and
/// `disconnect()`, which sidesteps stream framing ambiguity at the cost
/// of reconnect overhead per request.
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    stream: Option<TcpStream>,
    stats: TransportStats,
}

impl TcpTransport {
    /// Create a transport for the given endpoint, not yet connected
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            stream: None,
            stats: TransportStats::default(),
        }
    }

    /// Override the connect timeout (default 1 second)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Remote host this transport targets
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Remote port this transport targets
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether a stream is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Snapshot of the transport counters
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Open a fresh connection, replacing any existing one.
    ///
    /// Bounded by the configured connect timeout. Failure leaves the
    /// transport idle and is recoverable by calling `connect()` again.
    pub async fn connect(&mut self) -> ModbusResult<()> {
        if self.is_connected() {
            self.disconnect().await;
        }

        let endpoint = (self.host.as_str(), self.port);
        let connect = TcpStream::connect(endpoint);
        let stream = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ModbusError::connect(e.to_string())),
            Err(_) => {
                return Err(ModbusError::ConnectTimeout {
                    timeout_ms: self.connect_timeout.as_millis() as u64,
                })
            }
        };

        debug!("connected to {}:{}", self.host, self.port);
        self.stream = Some(stream);
        self.stats.connects += 1;
        Ok(())
    }

    /// Write the entire buffer to the peer.
    ///
    /// Loops on partial writes until every byte is accepted. A zero-byte
    /// write means the peer closed the channel and surfaces as
    /// [`ModbusError::BrokenConnection`].
    pub async fn send(&mut self, data: &[u8]) -> ModbusResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ModbusError::connect("not connected"))?;

        match stream.write_all(data).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::WriteZero => {
                self.stream = None;
                return Err(ModbusError::BrokenConnection { during: "send" });
            }
            Err(e) => {
                self.stream = None;
                return Err(ModbusError::Io(e));
            }
        }

        self.stats.frames_sent += 1;
        self.stats.bytes_sent += data.len() as u64;
        Ok(())
    }

    /// Read one buffer-full from the peer.
    ///
    /// A single read call, up to [`RECV_BUFFER_SIZE`] bytes; no multi-read
    /// reassembly. Zero bytes read means the peer closed the channel and
    /// surfaces as [`ModbusError::BrokenConnection`].
    pub async fn receive(&mut self) -> ModbusResult<Bytes> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ModbusError::connect("not connected"))?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let n = match stream.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                self.stream = None;
                return Err(ModbusError::Io(e));
            }
        };

        if n == 0 {
            self.stream = None;
            return Err(ModbusError::BrokenConnection { during: "receive" });
        }

        self.stats.frames_received += 1;
        self.stats.bytes_received += n as u64;
        Ok(Bytes::copy_from_slice(&buf[..n]))
    }

    /// Close the current connection, if any.
    ///
    /// Close failures are logged, never propagated: the exchange they
    /// could affect is already over.
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!("error closing connection to {}:{}: {}", self.host, self.port, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn echo_listener() -> (TcpListener, String, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr.ip().to_string(), addr.port())
    }

    #[tokio::test]
    async fn test_connect_send_receive_round_trip() {
        let (listener, host, port) = echo_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 16];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(&buf[..n]).await.unwrap();
        });

        let mut transport = TcpTransport::new(host, port);
        assert!(!transport.is_connected());

        transport.connect().await.unwrap();
        assert!(transport.is_connected());

        transport.send(&[0x01, 0x02, 0x03]).await.unwrap();
        let echoed = transport.receive().await.unwrap();
        assert_eq!(&echoed[..], &[0x01, 0x02, 0x03]);

        transport.disconnect().await;
        assert!(!transport.is_connected());

        let stats = transport.stats();
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.bytes_sent, 3);
        assert_eq!(stats.bytes_received, 3);
    }

    #[tokio::test]
    async fn test_receive_after_peer_close_is_broken_connection() {
        let (listener, host, port) = echo_listener().await;
        tokio::spawn(async move {
            // Accept and immediately drop: the client's read sees EOF.
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut transport = TcpTransport::new(host, port);
        transport.connect().await.unwrap();

        let err = transport.receive().await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::BrokenConnection { during: "receive" }
        ));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_send_when_idle_fails() {
        let mut transport = TcpTransport::new("127.0.0.1", 502);
        let err = transport.send(&[0x00]).await.unwrap_err();
        assert!(matches!(err, ModbusError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_connect_is_bounded_by_timeout() {
        // 240.0.0.1 is reserved address space; the SYN goes nowhere.
        // Depending on the host network this fails fast (unreachable) or
        // times out, but it must not block past the configured bound.
        let mut transport =
            TcpTransport::new("240.0.0.1", 502).with_connect_timeout(Duration::from_millis(200));

        let start = Instant::now();
        let result = transport.connect().await;
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_reconnect_replaces_existing_stream() {
        let (listener, host, port) = echo_listener().await;
        tokio::spawn(async move {
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                // Hold sockets open so the first stays alive until replaced.
                tokio::spawn(async move {
                    let mut socket = socket;
                    let mut buf = [0u8; 16];
                    let _ = socket.read(&mut buf).await;
                });
            }
        });

        let mut transport = TcpTransport::new(host, port);
        transport.connect().await.unwrap();
        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.stats().connects, 2);
    }
}
