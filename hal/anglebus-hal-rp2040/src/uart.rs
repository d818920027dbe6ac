//! UART adapters
//!
//! The bus UART runs buffered: the receive half feeds the line task, the
//! transmit half is written blocking once the node has turned the
//! transceiver around.

use anglebus_hal::uart::{DataBits, Parity, StopBits};
use anglebus_hal::{LineFault, UartConfig};
use embassy_rp::uart::{self, BufferedUartTx};
use embedded_io::Write;

/// Build the embassy UART configuration
pub fn uart_config(config: &UartConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

/// Map a receive error to a line fault
pub fn line_fault(error: uart::Error) -> LineFault {
    match error {
        uart::Error::Overrun => LineFault::Overrun,
        uart::Error::Framing => LineFault::Framing,
        uart::Error::Parity => LineFault::Parity,
        uart::Error::Break => LineFault::Break,
        _ => LineFault::Other,
    }
}

/// Blocking transmitter over the buffered UART
pub struct Rp2040UartTx {
    tx: BufferedUartTx,
}

impl Rp2040UartTx {
    /// Wrap the transmit half of the bus UART
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl anglebus_hal::UartTx for Rp2040UartTx {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), uart::Error> {
        self.tx.write_all(data)
    }

    fn flush(&mut self) -> Result<(), uart::Error> {
        // Empties the software buffer and the FIFO
        Write::flush(&mut self.tx)?;
        // Last stop bit still in the shift register
        while self.tx.busy() {}
        Ok(())
    }
}
