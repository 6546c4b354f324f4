//! UR Modbus Demo
//!
//! Demonstrates the ur_modbus library:
//! - Register decoding (two's complement, TCP pose scaling) with no connection
//! - Live reads against a UR controller's Modbus server
//!
//! Usage: cargo run --bin demo [controller_address]
//! Example: cargo run --bin demo 192.168.0.100

use ur_modbus::{
    decode_i16, ModbusTcpClient, TcpPose, MODBUS_TCP_PORT, TCP_POSE_ADDRESS, TCP_POSE_QUANTITY,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("UR Modbus v{} Demo", ur_modbus::VERSION);
    println!("====================\n");

    // =========================================================================
    // Part 1: Register decoding (no connection required)
    // =========================================================================
    println!("Part 1: Signed register decoding");
    println!("--------------------------------");

    for raw in [0x0000u16, 0x7FFF, 0x8000, 0xFFFF] {
        println!("  raw 0x{:04X} -> {}", raw, decode_i16(raw));
    }

    let pose_registers = [1500u16, (-320i16) as u16, 880, 3141, 0, (-1571i16) as u16];
    let pose = TcpPose::from_registers(&pose_registers)?;
    println!("\n  synthetic pose registers {:?}", pose_registers);
    println!("  decoded: {}", pose);

    // =========================================================================
    // Part 2: Live controller reads (requires a Modbus server)
    // =========================================================================
    println!("\nPart 2: Live controller reads");
    println!("-----------------------------");

    let host = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1".to_string());
    println!("  target: {}:{}", host, MODBUS_TCP_PORT);

    let mut client = ModbusTcpClient::new(host);
    client.set_trace_frames(true);

    match client
        .read_holding_registers(TCP_POSE_ADDRESS, TCP_POSE_QUANTITY)
        .await
    {
        Ok(frame) => {
            let pose = TcpPose::from_payload(frame.payload())?;
            println!("  TCP pose: {}", pose);
        }
        Err(e) => {
            println!("  read failed: {}", e);
            println!("  (expected if no controller is reachable; recoverable: {})",
                e.is_recoverable());
            return Ok(());
        }
    }

    match client.read_coils(0, 8).await {
        Ok(frame) => println!("  coil payload: {:02X?}", frame.payload()),
        Err(e) => println!("  coil read failed: {}", e),
    }

    let stats = client.stats();
    println!("\n  Statistics:");
    println!("    connects: {}", stats.connects);
    println!(
        "    frames sent: {}, received: {}",
        stats.frames_sent, stats.frames_received
    );
    println!(
        "    bytes sent: {}, received: {}",
        stats.bytes_sent, stats.bytes_received
    );

    Ok(())
}
