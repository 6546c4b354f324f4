//! Modbus TCP client
//!
//! Encodes read requests into ADUs, drives one request/response cycle per
//! call through the [`TcpTransport`], and validates the response against
//! the session state before handing it back.
//!
//! Every read operation runs a full connect-send-receive-disconnect cycle.
//! That is a deliberate trade-off inherited from the cell's original
//! design: reconnecting per request costs a TCP handshake but removes all
//! stream framing ambiguity, since exactly one response can ever sit on
//! the wire.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ur_modbus::{ModbusTcpClient, ModbusResult};
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut client = ModbusTcpClient::new("192.168.0.100");
//!
//!     // Six holding registers starting at 400: the TCP pose block.
//!     let frame = client.read_holding_registers(400, 6).await?;
//!     println!("payload: {:02X?}", frame.payload());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::constants::{
    EXCEPTION_FLAG, MBAP_HEADER_LEN, MBAP_LENGTH_EXCLUDED, MODBUS_PROTOCOL_ID, MODBUS_TCP_PORT,
};
use crate::error::{ModbusError, ModbusResult};
use crate::frame::{MbapHeader, ModbusFunction, ResponseFrame};
use crate::transport::{TcpTransport, TransportStats};

/// Maximum coils readable in one FC01 request (Modbus specification)
const MAX_READ_COILS: u16 = 2000;

/// Maximum registers readable in one FC03 request (Modbus specification)
const MAX_READ_REGISTERS: u16 = 125;

/// Modbus TCP client bound to one remote endpoint
///
/// Holds the per-session state the protocol needs: the fixed unit id and
/// the transaction id of the last request sent, which the next response
/// must echo. One client instance supports one in-flight request; the
/// `&mut self` receivers make overlapping calls unrepresentable without
/// external synchronization, so give each concurrent caller its own
/// instance.
pub struct ModbusTcpClient {
    transport: TcpTransport,
    unit_id: u8,
    last_transaction_id: u16,
    trace_frames: bool,
}

impl ModbusTcpClient {
    /// Create a client for `host` on the registered Modbus port (502)
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self::with_port(host, MODBUS_TCP_PORT)
    }

    /// Create a client for an explicit `host:port` endpoint
    pub fn with_port<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            transport: TcpTransport::new(host, port),
            unit_id: 0,
            last_transaction_id: 0,
            trace_frames: false,
        }
    }

    /// Target a specific unit (sub-device address behind a gateway).
    ///
    /// Defaults to 0, which the UR controller answers directly.
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Override the transport's connect timeout (default 1 second)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_connect_timeout(timeout);
        self
    }

    /// Enable or disable a field-by-field `tracing` dump of each response.
    ///
    /// Observational only; has no effect on protocol behavior.
    pub fn set_trace_frames(&mut self, enabled: bool) {
        self.trace_frames = enabled;
    }

    /// Unit id this client targets
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Transport statistics accumulated across exchanges
    pub fn stats(&self) -> TransportStats {
        self.transport.stats()
    }

    /// Read coils (function code 0x01).
    ///
    /// Reads the ON/OFF status of `quantity` discrete coils starting at
    /// `address` and returns the validated response frame.
    pub async fn read_coils(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<ResponseFrame> {
        if quantity == 0 || quantity > MAX_READ_COILS {
            return Err(ModbusError::configuration(format!(
                "coil quantity out of range: {} (1-{})",
                quantity, MAX_READ_COILS
            )));
        }
        self.read(ModbusFunction::ReadCoils, address, quantity).await
    }

    /// Read holding registers (function code 0x03).
    ///
    /// Reads `quantity` 16-bit registers starting at `address` and returns
    /// the validated response frame. This is the function the robot-position
    /// collaborator uses to fetch the TCP pose block at address 400.
    pub async fn read_holding_registers(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<ResponseFrame> {
        if quantity == 0 || quantity > MAX_READ_REGISTERS {
            return Err(ModbusError::configuration(format!(
                "register quantity out of range: {} (1-{})",
                quantity, MAX_READ_REGISTERS
            )));
        }
        self.read(ModbusFunction::ReadHoldingRegisters, address, quantity)
            .await
    }

    async fn read(
        &mut self,
        function: ModbusFunction,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<ResponseFrame> {
        let mut data = [0u8; 4];
        data[0..2].copy_from_slice(&address.to_be_bytes());
        data[2..4].copy_from_slice(&quantity.to_be_bytes());
        let request = self.build_request(function, &data);
        self.execute(&request).await
    }

    /// Compose a request ADU: MBAP header followed by `function || data`.
    ///
    /// Generates a fresh pseudo-random transaction id on every call and
    /// stores it for response correlation; there is no manual override.
    /// The header's length field counts the unit id byte plus the PDU, per
    /// the Modbus Application Protocol specification.
    pub fn build_request(&mut self, function: ModbusFunction, data: &[u8]) -> Bytes {
        self.last_transaction_id = rand::random::<u16>();

        let pdu_len = 1 + data.len();
        let header = MbapHeader {
            transaction_id: self.last_transaction_id,
            protocol_id: MODBUS_PROTOCOL_ID,
            length: (1 + pdu_len) as u16,
            unit_id: self.unit_id,
        };

        let mut adu = BytesMut::with_capacity(MBAP_HEADER_LEN + pdu_len);
        adu.put_slice(&header.encode());
        adu.put_u8(function.to_u8());
        adu.put_slice(data);

        trace!(
            "built request: tid={} fc=0x{:02X} adu={:02X?}",
            self.last_transaction_id,
            function.to_u8(),
            &adu[..]
        );
        adu.freeze()
    }

    /// Run one full request/response cycle for an already-built ADU.
    ///
    /// Owns the connection for the duration of the call: connect, send,
    /// receive, disconnect, then validate. Any failure is returned as a
    /// recoverable [`ModbusError`]; the caller decides whether to retry.
    pub async fn execute(&mut self, request: &[u8]) -> ModbusResult<ResponseFrame> {
        self.transport.connect().await?;
        let exchange = self.exchange(request).await;
        self.transport.disconnect().await;

        let raw = exchange?;
        self.validate_response(raw)
    }

    async fn exchange(&mut self, request: &[u8]) -> ModbusResult<Bytes> {
        self.transport.send(request).await?;
        self.transport.receive().await
    }

    /// Validate a raw response ADU against the session state.
    ///
    /// Checks run in order and the first failure wins: header parse,
    /// transaction id, protocol id, unit id, length field, exception flag.
    fn validate_response(&self, raw: Bytes) -> ModbusResult<ResponseFrame> {
        let frame = ResponseFrame::new(raw)?;
        let header = *frame.header();

        if self.trace_frames {
            frame.trace_dump();
        }

        if header.transaction_id != self.last_transaction_id {
            return Err(ModbusError::TransactionMismatch {
                sent: self.last_transaction_id,
                received: header.transaction_id,
            });
        }
        if header.protocol_id != MODBUS_PROTOCOL_ID {
            return Err(ModbusError::ProtocolMismatch {
                sent: MODBUS_PROTOCOL_ID,
                received: header.protocol_id,
            });
        }
        if header.unit_id != self.unit_id {
            return Err(ModbusError::UnitMismatch {
                sent: self.unit_id,
                received: header.unit_id,
            });
        }

        let following = frame.len() - MBAP_LENGTH_EXCLUDED;
        if header.length as usize != following {
            return Err(ModbusError::LengthMismatch {
                declared: header.length,
                actual: following,
            });
        }

        if frame.is_exception() {
            let code = frame
                .exception_code()
                .ok_or_else(|| ModbusError::frame("exception response missing exception code"))?;
            return Err(ModbusError::Exception {
                function: frame.function_code() & !EXCEPTION_FLAG,
                code,
            });
        }

        debug!(
            "exchange complete: tid={} fc=0x{:02X} payload_len={}",
            header.transaction_id,
            frame.function_code(),
            frame.payload().len()
        );
        Ok(frame)
    }
}
