//! Types defining the different options when opening a pump.

use super::Pump;
use crate::{
    backend::{Backend, Serial},
    error::PumpError,
};
use serialport as sp;
use std::time::Duration;

/// Options for configuring and opening a serial port connected to a pump.
///
/// ## Example
///
/// ```rust
/// # use benchproto::pump::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pump = OpenSerialOptions::new()
///     .settle(Duration::from_millis(250))
///     .open("/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenSerialOptions {
    /// The custom baud rate
    baud_rate: u32,
    /// The custom timeout
    timeout: Option<Duration>,
    /// The time to wait for a reply after each command.
    settle: Duration,
    /// The number of channels on the pump.
    channels: u8,
}

impl OpenSerialOptions {
    /// The default baud rate for the pump: 9,600.
    pub const DEFAULT_BAUD_RATE: u32 = 9_600;

    /// The default time to wait for a reply after each command: 100 ms.
    pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

    /// The default number of channels: 4.
    pub const DEFAULT_CHANNELS: u8 = 4;

    /// Create a blank set of options ready for configuration.
    ///
    /// The default baud rate, read timeout, settle delay and channel count are
    /// 9,600, 1 second, 100 ms and 4, respectively.
    ///
    /// Equivalent to [`default`](OpenSerialOptions::default).
    pub fn new() -> Self {
        OpenSerialOptions {
            baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
            timeout: Some(Duration::from_secs(1)),
            settle: OpenSerialOptions::DEFAULT_SETTLE,
            channels: OpenSerialOptions::DEFAULT_CHANNELS,
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
    /// If duration is `None`, reads will block indefinitely. The default is 1 second.
    pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
        self.timeout = duration;
        self
    }

    /// Set the time to wait for a reply after each command.
    ///
    /// The default is 100 ms.
    pub fn settle(&mut self, settle: Duration) -> &mut Self {
        self.settle = settle;
        self
    }

    /// Set the number of channels on the pump.
    ///
    /// Commands addressed to a channel outside of `1..=channels` are rejected.
    /// The default is 4.
    pub fn channels(&mut self, channels: u8) -> &mut Self {
        self.channels = channels;
        self
    }

    /// Open a [`Serial`] port configured for the pump at the specified path.
    fn open_serial_port(&self, path: &str) -> Result<Serial, PumpError> {
        // The baud rate passed to `new` is ignored by some platforms, so pass
        // a known valid rate and set the real one with `baud_rate` below.
        sp::new(path, OpenSerialOptions::DEFAULT_BAUD_RATE)
            .data_bits(sp::DataBits::Eight)
            .parity(sp::Parity::None)
            .flow_control(sp::FlowControl::None)
            .stop_bits(sp::StopBits::One)
            // The serialport API does not support infinite timeouts, so simply
            // set the timeout to the largest possible duration if `timeout` is
            // `None`, which is practically infinite.
            .timeout(self.timeout.unwrap_or(Duration::MAX))
            .baud_rate(self.baud_rate)
            .open_native()
            .map(Serial)
            .map_err(Into::into)
    }

    /// Open the pump at the specified path with the custom options.
    pub fn open(&self, path: &str) -> Result<Pump<Serial>, PumpError> {
        Ok(Pump::from_backend(
            self.open_serial_port(path)?,
            self.channels,
            self.settle,
        ))
    }

    /// Open the pump at the specified path with the custom options.
    ///
    /// The type of the underlying backend is erased via dynamic dispatch,
    /// which does have runtime overhead. [`OpenSerialOptions::open`] should
    /// generally be used instead, except when the type of the underlying
    /// backend may not be known at compile time.
    pub fn open_dyn(&self, path: &str) -> Result<Pump<Box<dyn Backend>>, PumpError> {
        Ok(Pump::from_backend(
            Box::new(self.open_serial_port(path)?),
            self.channels,
            self.settle,
        ))
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
        assert_eq!(options.timeout, Some(Duration::from_secs(1)));
        assert_eq!(options.settle, Duration::from_millis(100));
        assert_eq!(options.channels, 4);
    }

    #[test]
    fn setters_chain() {
        let mut options = OpenSerialOptions::new();
        options
            .baud_rate(19_200)
            .timeout(None)
            .settle(Duration::ZERO)
            .channels(12);
        assert_eq!(options.baud_rate, 19_200);
        assert_eq!(options.timeout, None);
        assert_eq!(options.settle, Duration::ZERO);
        assert_eq!(options.channels, 12);
    }
}
