//! Bus UART receive task
//!
//! Forwards every received byte to the node task, in order. Receive errors
//! are forwarded as line faults so the parser can drop its partial frame.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use anglebus_hal_rp2040::uart::line_fault;

use crate::channels::{LineEvent, LINE_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 16;

/// Bus RX task - moves bytes from the UART to the node task
#[embassy_executor::task]
pub async fn bus_rx_task(mut rx: BufferedUartRx) {
    info!("Bus RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    // Waits while the node task is busy replying
                    LINE_CHANNEL.send(LineEvent::Byte(byte)).await;
                }
            }
            Err(e) => {
                let fault = line_fault(e);
                debug!("UART receive fault: {:?}", fault);
                LINE_CHANNEL.send(LineEvent::Fault(fault)).await;
            }
        }
    }
}
