//! Error types for both the pump and the balance.

use super::*;

error_enum! {
    /// Any error returned by this library.
    ///
    /// The drivers never return a [`DecodeError`]. The `Decode` variant lets
    /// callers use `?` on [`decode_text`](crate::frame::decode_text) in
    /// functions returning this type.
    #[derive(Debug)]
    #[non_exhaustive]
    #[cfg_attr(
        all(doc, feature = "doc_cfg"),
        doc(cfg(all(feature = "pump", feature = "balance")))
    )]
    pub enum Error {
        LinkUnavailable(LinkUnavailableError),
        Io(std::io::Error),
        InvalidChannel(InvalidChannelError),
        Decode(DecodeError),
    }

    impl From<TransportError> {
        LinkUnavailable => LinkUnavailable,
        Io => Io,
    }

    impl From<PumpError> {
        LinkUnavailable => LinkUnavailable,
        Io => Io,
        InvalidChannel => InvalidChannel,
    }

    impl From<BalanceError> {
        LinkUnavailable => LinkUnavailable,
        Io => Io,
    }
}
impl_is_timeout! { Error }
impl_from_serialport_error! { Error }

#[cfg(test)]
mod test {
    use super::*;
    use static_assertions::assert_impl_all;

    // Make sure that error enum types are properly convertible
    assert_impl_all!(Error: From<TransportError>);
    assert_impl_all!(Error: From<PumpError>);
    assert_impl_all!(Error: From<BalanceError>);
    assert_impl_all!(Error: From<DecodeError>);
    assert_impl_all!(Error: From<InvalidChannelError>);

    assert_impl_all!(PumpError: TryFrom<Error>);
    assert_impl_all!(BalanceError: TryFrom<Error>);
    assert_impl_all!(TransportError: TryFrom<Error>);

    #[test]
    fn decode_text_converts_with_question_mark() {
        fn decode(bytes: &[u8]) -> Result<String, Error> {
            Ok(crate::frame::decode_text(bytes)?)
        }
        assert_eq!(decode(b"ok").unwrap(), "ok");
        assert!(matches!(decode(b"\xff").unwrap_err(), Error::Decode(_)));
    }

    #[test]
    fn pump_error_round_trips_through_error() {
        let err = Error::from(PumpError::from(InvalidChannelError::new(9, 4)));
        assert!(matches!(err, Error::InvalidChannel(_)));
        assert!(BalanceError::try_from(err).is_err());
    }
}
