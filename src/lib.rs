//! # UR Modbus - Modbus TCP client for Universal Robots controllers
//!
//! A small, focused Modbus TCP client in pure Rust for talking to the
//! Modbus server built into UR robot controllers (port 502), written for
//! pick-and-place cells where positional register data feeds the motion
//! pipeline.
//!
//! ## Features
//!
//! - **Exact framing**: MBAP header encode/parse with field-level
//!   validation of every response (transaction, protocol, unit, length)
//! - **Typed failures**: every framing violation and peer exception is a
//!   structured [`ModbusError`] value, never a process-ending failure
//! - **Connection-per-exchange**: one connect-send-receive-disconnect
//!   cycle per request, which removes stream framing ambiguity
//! - **Register decoding**: two's-complement signed decoding and TCP pose
//!   extraction from the controller's holding registers
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Client |
//! |------|----------|--------|
//! | 0x01 | Read Coils | ✅ |
//! | 0x03 | Read Holding Registers | ✅ |
//!
//! Write-type functions are a planned extension point; the framing and
//! validation logic does not change when codes are added.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ur_modbus::{ModbusTcpClient, ModbusResult, TcpPose};
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut client = ModbusTcpClient::new("192.168.0.100");
//!
//!     // Fetch the tool-center-point pose from holding registers 400-405
//!     let frame = client.read_holding_registers(400, 6).await?;
//!     let pose = TcpPose::from_payload(frame.payload())?;
//!     println!("TCP at {}", pose);
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Modbus protocol constants based on the official specification
pub mod constants;

/// MBAP header, function codes, and response frame definitions
pub mod frame;

/// TCP transport: one connection, one exchange at a time
pub mod transport;

/// Modbus TCP client implementation
pub mod client;

/// Register payload decoding, including the controller's TCP pose block
pub mod codec;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use ur_modbus::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::ModbusTcpClient;

// === Error handling ===
pub use error::{ModbusError, ModbusResult};

// === Core types ===
pub use frame::{MbapHeader, ModbusFunction, ResponseFrame};
pub use transport::{TcpTransport, TransportStats};

// === Decoding ===
pub use codec::{
    decode_i16, payload_registers, payload_registers_i16, TcpPose, TCP_POSE_ADDRESS,
    TCP_POSE_QUANTITY,
};

// === Wire constants (commonly needed) ===
pub use constants::{DEFAULT_CONNECT_TIMEOUT_MS, MBAP_HEADER_LEN, MODBUS_TCP_PORT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
