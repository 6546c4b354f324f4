//! Core error types and result handling
//!
//! Every failure mode of a single request/response exchange is represented
//! here as a typed value carrying structured context (which field
//! mismatched, expected vs. actual), so callers can branch programmatically
//! instead of parsing formatted messages. None of these errors terminate
//! the process; retry policy belongs to the caller.

use thiserror::Error;

/// Result type used throughout the crate
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Errors produced by the transport and the Modbus client
#[derive(Debug, Error)]
pub enum ModbusError {
    /// The transport could not establish a connection
    #[error("connection failed: {message}")]
    Connect {
        /// Underlying failure description
        message: String,
    },

    /// The connect attempt did not complete within the configured timeout
    #[error("connect timed out after {timeout_ms}ms")]
    ConnectTimeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// A send or receive observed a zero-length transfer: the peer closed
    /// the channel mid-exchange
    #[error("connection broken during {during}")]
    BrokenConnection {
        /// Operation that observed the closed channel ("send" or "receive")
        during: &'static str,
    },

    /// The response echoed a transaction id other than the one sent
    #[error("transaction id mismatch: sent {sent}, received {received}")]
    TransactionMismatch {
        /// Transaction id generated for the request
        sent: u16,
        /// Transaction id found in the response header
        received: u16,
    },

    /// The response carried a non-Modbus protocol identifier
    #[error("protocol id mismatch: sent {sent}, received {received}")]
    ProtocolMismatch {
        /// Protocol id sent (always 0)
        sent: u16,
        /// Protocol id found in the response header
        received: u16,
    },

    /// The response addressed a different unit than this client targets
    #[error("unit id mismatch: sent {sent}, received {received}")]
    UnitMismatch {
        /// Unit id this client is configured for
        sent: u8,
        /// Unit id found in the response header
        received: u8,
    },

    /// The header's length field disagrees with the received byte count
    #[error("length mismatch: header declares {declared}, frame carries {actual}")]
    LengthMismatch {
        /// Value of the MBAP length field
        declared: u16,
        /// Bytes actually following the length field
        actual: usize,
    },

    /// The peer explicitly rejected the request with an exception response
    #[error("modbus exception for function 0x{function:02X}: {} (0x{code:02X})", exception_description(*code))]
    Exception {
        /// Original function code (exception flag cleared)
        function: u8,
        /// Exception code reported by the peer
        code: u8,
    },

    /// The response was too short or otherwise structurally unusable
    #[error("malformed frame: {message}")]
    Frame {
        /// What made the frame unusable
        message: String,
    },

    /// An unknown or unsupported function code byte
    #[error("invalid function code: 0x{code:02X}")]
    InvalidFunction {
        /// Offending function code byte
        code: u8,
    },

    /// Invalid client configuration (address, port, quantity bounds)
    #[error("configuration error: {message}")]
    Configuration {
        /// What was rejected
        message: String,
    },

    /// Transport-level I/O failure other than a clean peer close
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModbusError {
    /// Create a connection error
    pub fn connect<S: Into<String>>(message: S) -> Self {
        ModbusError::Connect {
            message: message.into(),
        }
    }

    /// Create a frame error
    pub fn frame<S: Into<String>>(message: S) -> Self {
        ModbusError::Frame {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        ModbusError::Configuration {
            message: message.into(),
        }
    }

    /// Whether a retry of the whole exchange can reasonably succeed.
    ///
    /// Everything except configuration mistakes is a property of one failed
    /// exchange, not of the client: the next connect/send/receive cycle
    /// starts from a clean state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ModbusError::Configuration { .. } | ModbusError::InvalidFunction { .. }
        )
    }
}

/// Human-readable description of a Modbus exception code
pub fn exception_description(code: u8) -> &'static str {
    match code {
        0x01 => "illegal function",
        0x02 => "illegal data address",
        0x03 => "illegal data value",
        0x04 => "server device failure",
        0x05 => "acknowledge",
        0x06 => "server device busy",
        0x08 => "memory parity error",
        0x0A => "gateway path unavailable",
        0x0B => "gateway target device failed to respond",
        _ => "unknown exception",
    }
}
