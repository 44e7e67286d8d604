//! Error types related to the Reglo ICC pump.

use super::{LinkUnavailableError, TransportError};

/// A channel outside of the pump's addressable range was requested.
///
/// The command is rejected before anything is written to the port.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "pump")))]
pub struct InvalidChannelError {
    /// The requested channel.
    channel: u8,
    /// The number of channels on the pump.
    count: u8,
}

impl_error_display! {
    InvalidChannelError,
    self => "channel {} is out of range, expected a channel from 1 to {}", self.channel, self.count
}

impl InvalidChannelError {
    /// Create a instance of the error
    pub(crate) fn new(channel: u8, count: u8) -> Self {
        InvalidChannelError { channel, count }
    }

    /// The requested channel.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The number of channels on the pump.
    pub fn count(&self) -> u8 {
        self.count
    }
}

error_enum! {
    /// Any error returned by the [`pump`](crate::pump) module.
    #[derive(Debug)]
    #[non_exhaustive]
    #[cfg_attr(
    all(doc, feature = "doc_cfg"),
    doc(cfg(feature = "pump"))
)]
    pub enum PumpError {
        LinkUnavailable(LinkUnavailableError),
        Io(std::io::Error),
        InvalidChannel(InvalidChannelError),
    }

    impl From<TransportError> {
        LinkUnavailable => LinkUnavailable,
        Io => Io,
    }
}
impl_is_timeout! { PumpError }
impl_from_serialport_error! { PumpError }

#[cfg(test)]
mod test {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(PumpError: From<TransportError>, From<InvalidChannelError>, Send, Sync);
    assert_impl_all!(TransportError: TryFrom<PumpError>);
    assert_impl_all!(InvalidChannelError: TryFrom<PumpError>);

    #[test]
    fn invalid_channel_display() {
        let err = InvalidChannelError::new(5, 4);
        assert_eq!(
            err.to_string(),
            "channel 5 is out of range, expected a channel from 1 to 4"
        );
        assert_eq!(err.channel(), 5);
        assert_eq!(err.count(), 4);
    }

    #[test]
    fn transport_errors_convert() {
        let err = PumpError::from(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timeout",
        )));
        assert!(err.is_timeout());
        assert!(TransportError::try_from(err).is_ok());

        let err = PumpError::from(InvalidChannelError::new(0, 4));
        assert!(TransportError::try_from(err).is_err());
    }
}
