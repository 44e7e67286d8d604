//! Types defining the different options when opening a balance.

use super::Balance;
use crate::{
    backend::{Backend, Serial},
    error::BalanceError,
};
use serialport as sp;
use std::time::Duration;

/// Options for configuring and opening a serial port connected to a balance.
///
/// The line is always 7 data bits, odd parity and 1 stop bit, with no flow
/// control.
///
/// ## Example
///
/// ```rust
/// # use benchproto::balance::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut balance = OpenSerialOptions::new()
///     .timeout(Some(Duration::from_secs(1)))
///     .open("/dev/ttyUSB1")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenSerialOptions {
    /// The custom baud rate
    baud_rate: u32,
    /// The custom timeout
    timeout: Option<Duration>,
}

impl OpenSerialOptions {
    /// The default baud rate for the balance: 9,600.
    pub const DEFAULT_BAUD_RATE: u32 = 9_600;

    /// The default read timeout: 500 ms.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create a blank set of options ready for configuration.
    ///
    /// The default baud rate and read timeout are 9,600 and 500 ms, respectively.
    ///
    /// Equivalent to [`default`](OpenSerialOptions::default).
    pub fn new() -> Self {
        OpenSerialOptions {
            baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
            timeout: Some(OpenSerialOptions::DEFAULT_TIMEOUT),
        }
    }

    /// Set a custom baud rate.
    ///
    /// The default is 9,600.
    pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set a custom read timeout.
    ///
    /// If duration is `None`, reads will block indefinitely. The default is 500 ms.
    pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
        self.timeout = duration;
        self
    }

    /// Open a [`Serial`] port configured for the balance at the specified path.
    fn open_serial_port(&self, path: &str) -> Result<Serial, BalanceError> {
        sp::new(path, OpenSerialOptions::DEFAULT_BAUD_RATE)
            .data_bits(sp::DataBits::Seven)
            .parity(sp::Parity::Odd)
            .flow_control(sp::FlowControl::None)
            .stop_bits(sp::StopBits::One)
            .timeout(self.timeout.unwrap_or(Duration::MAX))
            .baud_rate(self.baud_rate)
            .open_native()
            .map(Serial)
            .map_err(Into::into)
    }

    /// Open the balance at the specified path with the custom options.
    pub fn open(&self, path: &str) -> Result<Balance<Serial>, BalanceError> {
        Ok(Balance::from_backend(self.open_serial_port(path)?))
    }

    /// Open the balance at the specified path with the custom options.
    ///
    /// The type of the underlying backend is erased via dynamic dispatch,
    /// which does have runtime overhead. [`OpenSerialOptions::open`] should
    /// generally be used instead, except when the type of the underlying
    /// backend may not be known at compile time.
    pub fn open_dyn(&self, path: &str) -> Result<Balance<Box<dyn Backend>>, BalanceError> {
        Ok(Balance::from_backend(Box::new(
            self.open_serial_port(path)?,
        )))
    }
}

impl Default for OpenSerialOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let options = OpenSerialOptions::default();
        assert_eq!(options.baud_rate, 9_600);
        assert_eq!(options.timeout, Some(Duration::from_millis(500)));
    }
}
