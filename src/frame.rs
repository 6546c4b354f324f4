//! Modbus/TCP frame definitions: MBAP header, function codes, response ADU
//!
//! A Modbus TCP message is an Application Data Unit (ADU) enclosing a
//! Protocol Data Unit (PDU):
//!
//! ```text
//! ADU = MBAP header (7 bytes) + PDU
//! PDU = function code (1 byte) + data (n bytes)
//! ```
//!
//! For a normal response the peer echoes the function code. To report an
//! error it replies with the function code plus 0x80 and a single data
//! byte, the exception code.

use bytes::Bytes;
use tracing::debug;

use crate::constants::{EXCEPTION_FLAG, MBAP_HEADER_LEN, MIN_RESPONSE_LEN};
use crate::error::{exception_description, ModbusError, ModbusResult};

/// Modbus function codes supported by this client
///
/// The registry is open for extension: adding a code here requires no
/// change to the framing or validation logic. Write-type functions
/// (0x05, 0x06, 0x0F, 0x10) are a known extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModbusFunction {
    /// Read Coils (0x01)
    ReadCoils = 0x01,
    /// Read Holding Registers (0x03)
    ReadHoldingRegisters = 0x03,
}

impl ModbusFunction {
    /// Convert from a wire byte
    pub fn from_u8(value: u8) -> ModbusResult<Self> {
        match value {
            0x01 => Ok(ModbusFunction::ReadCoils),
            0x03 => Ok(ModbusFunction::ReadHoldingRegisters),
            _ => Err(ModbusError::InvalidFunction { code: value }),
        }
    }

    /// Convert to the wire byte
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable function name
    pub fn description(self) -> &'static str {
        match self {
            ModbusFunction::ReadCoils => "Read Coils",
            ModbusFunction::ReadHoldingRegisters => "Read Holding Registers",
        }
    }
}

/// MBAP header (Modbus Application Protocol header)
///
/// The 7-byte TCP-specific prefix of every ADU. All fields big-endian.
///
/// | Field          | Bytes | Description                               |
/// |----------------|-------|-------------------------------------------|
/// | transaction_id | 2     | Correlation token echoed by the server    |
/// | protocol_id    | 2     | 0 for Modbus                              |
/// | length         | 2     | Byte count following this field           |
/// | unit_id        | 1     | Sub-device address behind a gateway       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    /// Identification of a request/response transaction
    pub transaction_id: u16,
    /// Protocol identifier, 0 = Modbus
    pub protocol_id: u16,
    /// Number of following bytes (unit id + PDU)
    pub length: u16,
    /// Identification of a remote slave on a serial line or bus
    pub unit_id: u8,
}

impl MbapHeader {
    /// Encode the header into its 7-byte wire representation
    pub fn encode(&self) -> [u8; MBAP_HEADER_LEN] {
        let mut buf = [0u8; MBAP_HEADER_LEN];
        buf[0..2].copy_from_slice(&self.transaction_id.to_be_bytes());
        buf[2..4].copy_from_slice(&self.protocol_id.to_be_bytes());
        buf[4..6].copy_from_slice(&self.length.to_be_bytes());
        buf[6] = self.unit_id;
        buf
    }

    /// Parse the first 7 bytes of a frame as an MBAP header
    pub fn parse(data: &[u8]) -> ModbusResult<Self> {
        if data.len() < MBAP_HEADER_LEN {
            return Err(ModbusError::frame(format!(
                "frame too short for MBAP header: {} bytes",
                data.len()
            )));
        }
        Ok(MbapHeader {
            transaction_id: u16::from_be_bytes([data[0], data[1]]),
            protocol_id: u16::from_be_bytes([data[2], data[3]]),
            length: u16::from_be_bytes([data[4], data[5]]),
            unit_id: data[6],
        })
    }
}

/// A received response ADU with its parsed header
///
/// Produced only by the client's validation pass, so holding one means the
/// frame was well-formed, correlated to the last request, and not an
/// exception response.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    header: MbapHeader,
    raw: Bytes,
}

impl ResponseFrame {
    /// Wrap a raw ADU that has at least a header and a function code.
    ///
    /// Performs only the structural check; field validation against session
    /// state is the client's job.
    pub fn new(raw: Bytes) -> ModbusResult<Self> {
        if raw.len() < MIN_RESPONSE_LEN {
            return Err(ModbusError::frame(format!(
                "response too short: {} bytes (minimum {})",
                raw.len(),
                MIN_RESPONSE_LEN
            )));
        }
        let header = MbapHeader::parse(&raw)?;
        Ok(ResponseFrame { header, raw })
    }

    /// Parsed MBAP header
    pub fn header(&self) -> &MbapHeader {
        &self.header
    }

    /// Function code byte (byte 8 of the ADU)
    pub fn function_code(&self) -> u8 {
        self.raw[MBAP_HEADER_LEN]
    }

    /// Whether the function code has the exception flag set
    pub fn is_exception(&self) -> bool {
        self.function_code() & EXCEPTION_FLAG != 0
    }

    /// Exception code, if this is an exception response carrying one
    pub fn exception_code(&self) -> Option<u8> {
        if self.is_exception() && self.raw.len() > MBAP_HEADER_LEN + 1 {
            Some(self.raw[MBAP_HEADER_LEN + 1])
        } else {
            None
        }
    }

    /// Function-specific payload: everything after the function code
    pub fn payload(&self) -> &[u8] {
        &self.raw[MBAP_HEADER_LEN + 1..]
    }

    /// The complete ADU as received
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Total ADU length in bytes
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the ADU is empty (never true for a constructed frame)
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Log a field-by-field dump of the response through `tracing`.
    ///
    /// Purely observational; enabled per client via
    /// [`set_trace_frames`](crate::client::ModbusTcpClient::set_trace_frames).
    pub fn trace_dump(&self) {
        let fc = self.function_code();
        debug!("---- Modbus TCP response (ADU) ----");
        debug!("transaction id: {}", self.header.transaction_id);
        debug!("protocol id:    {}", self.header.protocol_id);
        debug!("length:         {}", self.header.length);
        debug!("unit id:        {}", self.header.unit_id);
        if self.is_exception() {
            let code = self.exception_code().unwrap_or(0);
            debug!(
                "function code:  0x{:02X} (exception: {})",
                fc,
                exception_description(code)
            );
        } else {
            debug!("function code:  0x{:02X}", fc);
            debug!("data:           {:02X?}", self.payload());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_layout() {
        let header = MbapHeader {
            transaction_id: 0x1234,
            protocol_id: 0,
            length: 6,
            unit_id: 0xFF,
        };
        assert_eq!(header.encode(), [0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0xFF]);
    }

    #[test]
    fn test_header_round_trip() {
        let header = MbapHeader {
            transaction_id: 0xBEEF,
            protocol_id: 0,
            length: 5,
            unit_id: 7,
        };
        let parsed = MbapHeader::parse(&header.encode()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_parse_short_frame() {
        let err = MbapHeader::parse(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, ModbusError::Frame { .. }));
    }

    #[test]
    fn test_function_code_registry() {
        assert_eq!(ModbusFunction::ReadCoils.to_u8(), 0x01);
        assert_eq!(ModbusFunction::ReadHoldingRegisters.to_u8(), 0x03);
        assert_eq!(
            ModbusFunction::from_u8(0x03).unwrap(),
            ModbusFunction::ReadHoldingRegisters
        );
        assert!(matches!(
            ModbusFunction::from_u8(0x10),
            Err(ModbusError::InvalidFunction { code: 0x10 })
        ));
    }

    #[test]
    fn test_exception_frame_accessors() {
        // MBAP + FC 0x83 + exception code 0x02
        let raw = Bytes::from_static(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x83, 0x02]);
        let frame = ResponseFrame::new(raw).unwrap();
        assert!(frame.is_exception());
        assert_eq!(frame.function_code(), 0x83);
        assert_eq!(frame.exception_code(), Some(0x02));
    }

    #[test]
    fn test_normal_frame_payload() {
        let raw = Bytes::from_static(&[
            0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x03, 0x02, 0x12, 0x34,
        ]);
        let frame = ResponseFrame::new(raw).unwrap();
        assert!(!frame.is_exception());
        assert_eq!(frame.payload(), &[0x02, 0x12, 0x34]);
    }

    #[test]
    fn test_too_short_response_rejected() {
        let raw = Bytes::from_static(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00]);
        assert!(ResponseFrame::new(raw).is_err());
    }
}
