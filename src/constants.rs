//! Modbus/TCP protocol constants based on the official specification
//!
//! Frame layout reference:
//! - ADU = MBAP header (7 bytes) + PDU
//! - PDU = function code (1 byte) + data
//! - All multi-byte fields are big-endian

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Full MBAP header length for Modbus TCP
/// Format: Transaction ID(2) + Protocol ID(2) + Length(2) + Unit ID(1) = 7 bytes
pub const MBAP_HEADER_LEN: usize = 7;

/// Number of MBAP bytes NOT counted by the header's length field
/// (Transaction ID + Protocol ID + the Length field itself = 6 bytes)
pub const MBAP_LENGTH_EXCLUDED: usize = 6;

/// Protocol identifier for Modbus (always 0 on the wire)
pub const MODBUS_PROTOCOL_ID: u16 = 0;

/// Maximum PDU (Protocol Data Unit) size per Modbus specification
/// Inherited from the RS485 ADU limit:
/// RS485 ADU (256 bytes) - Slave Address (1 byte) - CRC (2 bytes) = 253 bytes
pub const MAX_PDU_SIZE: usize = 253;

/// Receive buffer size for a single response read
///
/// The controller's responses for the supported read functions are well
/// below this bound (max frame = 7 + 253 = 260 bytes), so a single read
/// into this buffer always captures a complete ADU.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Shortest valid response ADU: MBAP header + echoed function code
pub const MIN_RESPONSE_LEN: usize = MBAP_HEADER_LEN + 1;

// ============================================================================
// Network Defaults
// ============================================================================

/// Registered Modbus TCP port
pub const MODBUS_TCP_PORT: u16 = 502;

/// Default connect timeout in milliseconds
///
/// Only the connect step is bounded; send/receive block until the peer
/// responds or closes the connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Modbus Function Codes
// ============================================================================

/// Read Coils (FC01)
pub const FC_READ_COILS: u8 = 0x01;

/// Read Holding Registers (FC03)
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Exception flag: a response function code with this bit set reports an
/// error, and the PDU carries a single exception-code byte
pub const EXCEPTION_FLAG: u8 = 0x80;

// ============================================================================
// Modbus Exception Codes
// ============================================================================

/// Illegal Function
pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;

/// Illegal Data Address
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

/// Illegal Data Value
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;

/// Server Device Failure
pub const EXCEPTION_SERVER_DEVICE_FAILURE: u8 = 0x04;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_constants() {
        assert_eq!(MBAP_HEADER_LEN, 7);
        assert_eq!(MBAP_LENGTH_EXCLUDED, 6);
        assert_eq!(MIN_RESPONSE_LEN, 8);
    }

    #[test]
    fn test_max_frame_fits_receive_buffer() {
        assert!(MBAP_HEADER_LEN + MAX_PDU_SIZE <= RECV_BUFFER_SIZE);
    }
}
