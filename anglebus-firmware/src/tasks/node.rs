//! Node task
//!
//! Owns the frame parser and everything a reply needs: the node state,
//! the angle sensor, the bus transmitter and the address storage. Bytes
//! are handled strictly one at a time, so no locking is needed.

use cortex_m::peripheral::SCB;
use defmt::*;
use embassy_time::Delay;

use anglebus_core::{Node, NodeState, Outcome};
use anglebus_drivers::bus::Rs485Transmitter;
use anglebus_drivers::sensor::As5045;
use anglebus_hal_rp2040::flash::Rp2040FlashStorage;
use anglebus_hal_rp2040::gpio::Rp2040Output;
use anglebus_hal_rp2040::spi::Rp2040SpiExchange;
use anglebus_hal_rp2040::uart::Rp2040UartTx;
use anglebus_protocol::{Frame, FrameParser};

use crate::channels::{LineEvent, LINE_CHANNEL};

/// AS5045 on SPI0 with a GPIO chip select
pub type Sensor = As5045<Rp2040SpiExchange<'static>, Rp2040Output<'static>>;

/// Bus UART transmit half with the transceiver's driver-enable pin
pub type Transmitter = Rs485Transmitter<Rp2040UartTx, Rp2040Output<'static>>;

/// Node task - parses requests and answers the ones for this node
#[embassy_executor::task]
pub async fn node_task(
    mut node: Node,
    mut sensor: Sensor,
    mut transmitter: Transmitter,
    mut storage: Rp2040FlashStorage<'static>,
) {
    info!("Node task started, address {}", node.address());

    let mut parser = FrameParser::new();
    let mut delay = Delay;

    loop {
        let Some(frame) = next_frame(&mut parser).await else {
            continue;
        };

        match node.respond(&frame, &mut sensor, &mut storage).await {
            Outcome::Reply(reply) => match transmitter.send(&reply, &mut delay) {
                Ok(len) => trace!("Replied with {} bytes", len),
                Err(e) => warn!("Reply not sent: {:?}", e),
            },
            Outcome::Ignored(reason) => trace!("Frame ignored: {:?}", reason),
            Outcome::Unanswered(e) => warn!("Request left unanswered: {:?}", e),
        }

        if let NodeState::Restart(address) = node.state() {
            info!("Address {} stored, restarting", address);
            SCB::sys_reset();
        }
    }
}

/// Feed the next line event to the parser
///
/// Returns a frame once one is complete.
async fn next_frame(parser: &mut FrameParser) -> Option<Frame> {
    match LINE_CHANNEL.receive().await {
        LineEvent::Byte(byte) => match parser.feed(byte) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Frame discarded: {:?}", e);
                None
            }
        },
        LineEvent::Fault(fault) => {
            if parser.line_fault() {
                debug!("Partial frame dropped on {:?}", fault);
            }
            None
        }
    }
}
