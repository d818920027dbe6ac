//! anglebus - Encoder Node Firmware
//!
//! Firmware for RP2040-based angle encoder nodes on a shared RS-485 line.
//! The node answers address-assignment and read requests from the bus
//! master; the address is kept in flash across restarts.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_rp::watchdog::Watchdog;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use anglebus_core::Node;
use anglebus_drivers::bus::Rs485Transmitter;
use anglebus_drivers::sensor::{As5045, As5045Config};
use anglebus_hal::spi::SpiConfig;
use anglebus_hal::UartConfig;
use anglebus_hal_rp2040::flash::Rp2040FlashStorage;
use anglebus_hal_rp2040::gpio::Rp2040Output;
use anglebus_hal_rp2040::spi::{spi_config, Rp2040SpiExchange};
use anglebus_hal_rp2040::uart::{uart_config, Rp2040UartTx};

use crate::config::load_config;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
// A reply is at most one frame; requests may queue while the node replies
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("anglebus node firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Node address from flash (or the configured fallback)
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let node = Node::boot(&config, &mut storage).await;
    info!(
        "Node address {} (fallback {})",
        node.address(),
        config.fallback_address
    );

    // Setup UART0 for the bus
    // Pin assignments are board-specific (Pico: TX=GPIO0, RX=GPIO1, DE=GPIO2)
    let line = UartConfig {
        baudrate: config.bus.baudrate,
        ..UartConfig::default()
    };

    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&line));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    // Transceiver starts in receive mode
    let driver_enable = Rp2040Output::new(Output::new(p.PIN_2, Level::Low));
    let transmitter = Rs485Transmitter::new(
        Rp2040UartTx::new(tx),
        driver_enable,
        config.bus.turnaround_us,
    );

    info!(
        "Bus UART initialized, {} baud, char time {} us",
        line.baudrate,
        line.char_time_us()
    );

    // Setup SPI0 for the AS5045
    // Pin assignments are board-specific (Pico: SCK=GPIO18, MOSI=GPIO19, MISO=GPIO16, CS=GPIO17)
    let link = SpiConfig::default();
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config(&link));
    let chip_select = Rp2040Output::new(Output::new(p.PIN_17, Level::High));
    let sensor = As5045::new(
        Rp2040SpiExchange::new(spi, &link),
        chip_select,
        As5045Config::from(&config.transducer),
    );

    info!("Sensor SPI initialized");

    let watchdog = Watchdog::new(p.WATCHDOG);

    // Spawn tasks
    spawner.spawn(tasks::tick_task(watchdog)).unwrap();
    spawner.spawn(tasks::bus_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::node_task(node, sensor, transmitter, storage))
        .unwrap();

    info!("All tasks spawned, node listening");
}
