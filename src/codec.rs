//! Decoding of Modbus register payloads
//!
//! The wire carries registers as unsigned big-endian 16-bit values. The
//! robot controller stores signed quantities in them (positions can be
//! negative), so callers reinterpret the raw value under standard
//! two's-complement semantics: `signed = raw` if `raw < 32768`, else
//! `raw - 65536`.

use std::fmt;

use crate::error::{ModbusError, ModbusResult};

/// Holding-register address of the controller's TCP pose block
pub const TCP_POSE_ADDRESS: u16 = 400;

/// Number of registers in the TCP pose block (x, y, z, rx, ry, rz)
pub const TCP_POSE_QUANTITY: u16 = 6;

/// Reinterpret a raw unsigned register as a signed 16-bit value.
///
/// Standard two's complement: `0x7FFF -> 32767`, `0x8000 -> -32768`,
/// `0xFFFF -> -1`.
#[inline]
pub fn decode_i16(raw: u16) -> i16 {
    raw as i16
}

/// Assemble a register from its two big-endian wire bytes
#[inline]
pub fn register_from_bytes(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Split a read-response payload into its register values.
///
/// The payload of an FC03 response is a byte-count prefix followed by
/// that many bytes of big-endian register data. The byte count must match
/// the remaining payload exactly and describe whole registers.
pub fn payload_registers(payload: &[u8]) -> ModbusResult<Vec<u16>> {
    let Some((&byte_count, data)) = payload.split_first() else {
        return Err(ModbusError::frame("empty register payload"));
    };
    if byte_count as usize != data.len() {
        return Err(ModbusError::frame(format!(
            "byte count {} does not match payload of {} bytes",
            byte_count,
            data.len()
        )));
    }
    if data.len() % 2 != 0 {
        return Err(ModbusError::frame(format!(
            "register payload has odd length {}",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| register_from_bytes(pair[0], pair[1]))
        .collect())
}

/// Split a read-response payload into signed register values
pub fn payload_registers_i16(payload: &[u8]) -> ModbusResult<Vec<i16>> {
    Ok(payload_registers(payload)?
        .into_iter()
        .map(decode_i16)
        .collect())
}

/// Cartesian pose of the robot's tool center point
///
/// Decoded from the six holding registers at address 400. The controller
/// publishes positions in tenths of a millimeter and orientations in
/// milliradians; decoding applies the scaling so the fields read in
/// millimeters and radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TcpPose {
    /// X position in mm
    pub x: f64,
    /// Y position in mm
    pub y: f64,
    /// Z position in mm
    pub z: f64,
    /// Rotation about X in radians
    pub rx: f64,
    /// Rotation about Y in radians
    pub ry: f64,
    /// Rotation about Z in radians
    pub rz: f64,
}

impl TcpPose {
    /// Decode a pose from the six raw registers of the TCP pose block
    pub fn from_registers(registers: &[u16]) -> ModbusResult<Self> {
        if registers.len() != TCP_POSE_QUANTITY as usize {
            return Err(ModbusError::frame(format!(
                "TCP pose needs {} registers, got {}",
                TCP_POSE_QUANTITY,
                registers.len()
            )));
        }
        Ok(TcpPose {
            x: f64::from(decode_i16(registers[0])) / 10.0,
            y: f64::from(decode_i16(registers[1])) / 10.0,
            z: f64::from(decode_i16(registers[2])) / 10.0,
            rx: f64::from(decode_i16(registers[3])) / 1000.0,
            ry: f64::from(decode_i16(registers[4])) / 1000.0,
            rz: f64::from(decode_i16(registers[5])) / 1000.0,
        })
    }

    /// Decode a pose straight from an FC03 response payload
    pub fn from_payload(payload: &[u8]) -> ModbusResult<Self> {
        Self::from_registers(&payload_registers(payload)?)
    }
}

impl fmt::Display for TcpPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.1}mm y={:.1}mm z={:.1}mm rx={:.3}rad ry={:.3}rad rz={:.3}rad",
            self.x, self.y, self.z, self.rx, self.ry, self.rz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twos_complement_table() {
        assert_eq!(decode_i16(0x0000), 0);
        assert_eq!(decode_i16(0x7FFF), 32767);
        assert_eq!(decode_i16(0x8000), -32768);
        assert_eq!(decode_i16(0xFFFF), -1);
    }

    #[test]
    fn test_payload_registers() {
        // byte count 4, registers 0x1234 and 0xFFFF
        let payload = [0x04, 0x12, 0x34, 0xFF, 0xFF];
        assert_eq!(payload_registers(&payload).unwrap(), vec![0x1234, 0xFFFF]);
        assert_eq!(payload_registers_i16(&payload).unwrap(), vec![0x1234, -1]);
    }

    #[test]
    fn test_payload_registers_full_range() {
        let payload = [
            0x0C, 0x00, 0x00, 0x7F, 0xFF, 0x80, 0x00, 0xFF, 0xFF, 0x00, 0x01, 0xFF, 0xFE,
        ];
        assert_eq!(
            payload_registers_i16(&payload).unwrap(),
            vec![0, 32767, -32768, -1, 1, -2]
        );
    }

    #[test]
    fn test_payload_registers_rejects_bad_byte_count() {
        let payload = [0x06, 0x12, 0x34, 0xFF, 0xFF];
        assert!(payload_registers(&payload).is_err());
    }

    #[test]
    fn test_payload_registers_rejects_empty() {
        assert!(payload_registers(&[]).is_err());
    }

    #[test]
    fn test_pose_decoding_with_negatives() {
        // x = -123.4mm, y = 50.0mm, z = 0, rx = -1.571rad, ry = 0, rz = 3.141rad
        let registers = [
            (-1234i16) as u16,
            500,
            0,
            (-1571i16) as u16,
            0,
            3141,
        ];
        let pose = TcpPose::from_registers(&registers).unwrap();
        assert!((pose.x - (-123.4)).abs() < 1e-9);
        assert!((pose.y - 50.0).abs() < 1e-9);
        assert_eq!(pose.z, 0.0);
        assert!((pose.rx - (-1.571)).abs() < 1e-9);
        assert_eq!(pose.ry, 0.0);
        assert!((pose.rz - 3.141).abs() < 1e-9);
    }

    #[test]
    fn test_pose_requires_six_registers() {
        assert!(TcpPose::from_registers(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_pose_from_payload() {
        let mut payload = vec![12u8];
        for value in [100u16, 200, 300, 1000, 2000, 3000] {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        let pose = TcpPose::from_payload(&payload).unwrap();
        assert!((pose.x - 10.0).abs() < 1e-9);
        assert!((pose.rz - 3.0).abs() < 1e-9);
    }
}
