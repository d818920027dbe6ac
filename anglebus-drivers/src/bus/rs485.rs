//! RS-485 half-duplex transmitter
//!
//! The transceiver's driver-enable (DE) input is held low so the node only
//! listens. To answer, the node waits out the turnaround delay (the master
//! releases the line after its stop byte), raises DE, writes the frame,
//! waits for the last stop bit to leave the shift register and drops DE.

use anglebus_hal::{OutputPin, UartTx};
use anglebus_protocol::{Frame, FrameError, MAX_FRAME_SIZE};
use embedded_hal::delay::DelayNs;

/// Errors from sending a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rs485Error<E> {
    /// The frame could not be encoded
    Encode(FrameError),
    /// The UART reported an error
    Uart(E),
}

impl<E> From<FrameError> for Rs485Error<E> {
    fn from(e: FrameError) -> Self {
        Rs485Error::Encode(e)
    }
}

/// Frame transmitter with explicit line direction control
pub struct Rs485Transmitter<U, P> {
    uart: U,
    de: P,
    turnaround_us: u32,
}

impl<U: UartTx, P: OutputPin> Rs485Transmitter<U, P> {
    /// Create a new transmitter; the line driver starts disabled
    pub fn new(uart: U, mut de: P, turnaround_us: u32) -> Self {
        de.set_low();
        Self {
            uart,
            de,
            turnaround_us,
        }
    }

    /// Check if the line driver is enabled
    pub fn is_driving(&self) -> bool {
        self.de.is_set_high()
    }

    /// Encode and send one frame
    ///
    /// The line driver is released again on every path, including UART
    /// errors, so a failed reply never blocks the bus.
    pub fn send<D: DelayNs>(
        &mut self,
        frame: &Frame,
        delay: &mut D,
    ) -> Result<usize, Rs485Error<U::Error>> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer)?;

        delay.delay_us(self.turnaround_us);

        self.de.set_high();
        let result = self
            .uart
            .write_blocking(&buffer[..len])
            .and_then(|()| self.uart.flush());
        self.de.set_low();

        result.map(|()| len).map_err(Rs485Error::Uart)
    }

    /// Release the UART and driver-enable pin
    pub fn release(self) -> (U, P) {
        (self.uart, self.de)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    /// Event log shared between the mocks
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Delay(u32),
        Write(usize),
        Flush,
    }

    /// UART recording what went out, and whether DE was high at the time
    struct MockUart {
        sent: Vec<u8, 32>,
        fail: bool,
        flushes: usize,
    }

    impl MockUart {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail: false,
                flushes: 0,
            }
        }
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.sent.extend_from_slice(data).map_err(|_| ())
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct MockDelay {
        events: Vec<Event, 8>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            let _ = self.events.push(Event::Delay(ns / 1_000));
        }

        fn delay_us(&mut self, us: u32) {
            let _ = self.events.push(Event::Delay(us));
        }
    }

    fn transmitter() -> Rs485Transmitter<MockUart, MockPin> {
        Rs485Transmitter::new(MockUart::new(), MockPin { high: true }, 500)
    }

    #[test]
    fn test_starts_listening() {
        let tx = transmitter();
        assert!(!tx.is_driving());
    }

    #[test]
    fn test_send_writes_encoded_frame() {
        let mut tx = transmitter();
        let mut delay = MockDelay { events: Vec::new() };

        let frame = Frame::slave(0xA0, b"E").unwrap();
        let len = tx.send(&frame, &mut delay).unwrap();

        assert_eq!(len, 6);
        assert!(!tx.is_driving());
        assert_eq!(&delay.events[..], &[Event::Delay(500)]);

        let (uart, _) = tx.release();
        assert_eq!(&uart.sent[..], &frame.encode_to_vec().unwrap()[..]);
        assert_eq!(uart.flushes, 1);
    }

    #[test]
    fn test_uart_error_releases_line() {
        let mut tx = transmitter();
        tx.uart.fail = true;
        let mut delay = MockDelay { events: Vec::new() };

        let frame = Frame::slave(0xA0, &[1, 2, 3]).unwrap();
        assert_eq!(tx.send(&frame, &mut delay), Err(Rs485Error::Uart(())));
        assert!(!tx.is_driving());
        assert_eq!(tx.uart.flushes, 0);
    }

    #[test]
    fn test_event_order() {
        // Flush must happen while the driver is still enabled
        struct OrderedUart<'a> {
            de_high: &'a core::cell::Cell<bool>,
            log: Vec<Event, 8>,
        }

        impl UartTx for OrderedUart<'_> {
            type Error = ();

            fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
                assert!(self.de_high.get());
                let _ = self.log.push(Event::Write(data.len()));
                Ok(())
            }

            fn flush(&mut self) -> Result<(), ()> {
                assert!(self.de_high.get());
                let _ = self.log.push(Event::Flush);
                Ok(())
            }
        }

        struct SharedPin<'a>(&'a core::cell::Cell<bool>);

        impl OutputPin for SharedPin<'_> {
            fn set_high(&mut self) {
                self.0.set(true);
            }

            fn set_low(&mut self) {
                self.0.set(false);
            }

            fn is_set_high(&self) -> bool {
                self.0.get()
            }
        }

        let de = core::cell::Cell::new(false);
        let uart = OrderedUart {
            de_high: &de,
            log: Vec::new(),
        };
        let mut tx = Rs485Transmitter::new(uart, SharedPin(&de), 0);
        let mut delay = MockDelay { events: Vec::new() };

        let frame = Frame::slave(150, &[150]).unwrap();
        tx.send(&frame, &mut delay).unwrap();

        let (uart, pin) = tx.release();
        assert_eq!(&uart.log[..], &[Event::Write(6), Event::Flush]);
        assert!(!pin.is_set_high());
    }
}
