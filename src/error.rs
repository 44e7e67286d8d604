//! Error types.
//!
//! Each error is represented by a unique type that implements [`std::error::Error`].
//! However, most APIs return more than one kind of error and so will return one
//! of the higher level [enums](#enums), such as [`TransportError`],
//! [`PumpError`], [`BalanceError`] or [`Error`]. Where appropriate, the error
//! types are convertible to the higher level enums, allowing them to be used
//! with `?`:
//!
//! ```
//! # #[cfg(all(feature = "pump", feature = "balance"))]
//! # mod wrapper {
//! use benchproto::error::{Error, PumpError};
//!
//! fn foo() -> Result<(), PumpError> {
//!     // ...
//! # unimplemented!();
//! }
//!
//! fn bar() -> Result<(), Error> {
//!     foo()?;
//!     // ...
//! # Ok(())
//! }
//! # }
//! ```

/// Implement Error and Display traits for the specified type.
///
/// After the type define the format string and any arguments it should
/// reference after `self =>` (to abide by macro hygiene rules).
macro_rules! impl_error_display {
    (
        $name:path,
        $self:ident =>
        $display:literal
        $(,
            $($arg:expr),+
        )?
    ) => {
        impl std::error::Error for $name {}

        impl std::fmt::Display for $name {
            fn fmt(&$self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    $display
                    $(,
                        $($arg),+
                    )?
                )
            }
        }
    };
}

macro_rules! impl_is_timeout {
    ($name:ident) => {
        impl $name {
            /// A convenience function for determining if the error is due to the
            /// port timing out.
            pub fn is_timeout(&self) -> bool {
                matches!(self, $name::Io(e) if e.kind() == std::io::ErrorKind::TimedOut)
            }
        }
    };
}

macro_rules! impl_from_serialport_error {
    ($name:ident) => {
        impl From<serialport::Error> for $name {
            fn from(other: serialport::Error) -> Self {
                use std::io;

                match other.kind() {
                    serialport::ErrorKind::NoDevice => $name::LinkUnavailable(
                        LinkUnavailableError(other.description.into_boxed_str()),
                    ),
                    serialport::ErrorKind::InvalidInput => $name::Io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        other.description,
                    )),
                    serialport::ErrorKind::Unknown => {
                        $name::Io(io::Error::other(other.description))
                    }
                    serialport::ErrorKind::Io(kind) => {
                        $name::Io(io::Error::new(kind, other.description))
                    }
                }
            }
        }
    };
}

/// Define error enums that contain concrete error types (not other error enums).
///
/// From and TryFrom traits will be implemented for the enum and it's underlying
/// errors. The enum's Display implementation will defer to the underlying errors'
/// Display implementations.
///
/// Simple implementations of From and TryFrom with other error enums can be
/// added by appending a succinct impl block, which assumes that:
///   * it is being implemented for this error enum,
///   * each variant has a single tuple value, and can be converted to the value
///     in this enum with its own From implementation.
///
/// ```compile_fail
/// # // This fails to compile because the macro is not exported.
/// error_enum!{
///     // This defines the enum and From/TryFrom between ThisError and A and B.
///     #[non_exhaustive]
///     pub enum ThisError {
///         VariantA(A),
///         VariantB(B),
///         // ...
///     }
///
///     // This implements a simple From/TryFrom between ThisError and OtherType.
///     impl From<OtherType> {
///         FromVariantA => VariantA,
///         // ...
///     }
/// }
/// ```
macro_rules! error_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $(
                $variant:ident($inner:path)
            ),+
            $(,)?
        }
        // Additional information for From/TryFrom impl blocks.
        $(
            impl From<$from_t:ident>
            {
                $($from_variant:ident => $to_variant:ident),+
                $(,)?
            }
        )*
    ) => {
        // Define the error enum itself
        $(
            #[$attr]
        )*
        #[allow(missing_docs)]
        pub enum $name {
            $(
                $variant($inner )
            ),+
        }

        impl std::error::Error for $name {}

        // Defer the display to the inner error type
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$variant(e) => e.fmt(f)
                    ),+
                }
            }
        }

        // Allow the enum to be convertible from an infallible error
        impl From<std::convert::Infallible> for $name {
            fn from(_: std::convert::Infallible) -> Self {
                unreachable!();
            }
        }

        // Conversions with underlying errors
        $(
            impl From<$inner> for $name {
                fn from(other: $inner) -> Self {
                    $name::$variant(other)
                }
            }

            impl TryFrom<$name> for $inner {
                type Error = $name;
                fn try_from(other: $name) -> Result<Self, Self::Error> {
                    match other {
                        $name::$variant(value) => Ok(value),
                        #[allow(unreachable_patterns)]
                        value => Err(value)
                    }
                }
            }
        )+

        // Conversions from other enum errors
        $(
            impl From<$from_t> for $name {
                fn from(other: $from_t) -> Self {
                    match other {
                        $($from_t::$from_variant(e) => $name::$to_variant(From::from(e))),+
                    }
                }
            }

            impl TryFrom<$name> for $from_t {
                type Error = $name;
                fn try_from(other: $name) -> Result<Self, Self::Error> {
                    match other {
                        $(
                            $name::$to_variant(e) => Ok($from_t::$from_variant(From::from(e)))
                        ),+
                        ,
                        #[allow(unreachable_patterns)]
                        _ => Err(other)
                    }
                }

            }
        )*
    };
}

#[cfg(feature = "pump")]
mod pump;
#[cfg(feature = "pump")]
pub use pump::*;

#[cfg(feature = "balance")]
mod balance;
#[cfg(feature = "balance")]
pub use balance::*;

#[cfg(all(feature = "pump", feature = "balance"))]
mod all;
#[cfg(all(feature = "pump", feature = "balance"))]
pub use all::*;

use std::io;

/// The instrument is either disconnected, closed, or already in use by another process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LinkUnavailableError(Box<str>);

impl_error_display! {
    LinkUnavailableError,
    self =>
    "the instrument link is unavailable (disconnected, closed, or in use by another process): {}", self.0
}

impl LinkUnavailableError {
    /// Get the description of why the link is unavailable.
    pub fn description(&self) -> &str {
        &self.0
    }
}

/// Bytes received from an instrument could not be decoded as text.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DecodeError(Box<[u8]>);

impl_error_display! {
    DecodeError,
    self => "reply is not valid text: {}", self.0.escape_ascii()
}

impl DecodeError {
    /// Create a instance of the error
    pub(crate) fn new<R: AsRef<[u8]>>(bytes: R) -> Self {
        DecodeError(Box::from(bytes.as_ref()))
    }

    /// Get the bytes that could not be decoded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

error_enum! {
    /// Any error returned by the [`transport`](crate::transport) module.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum TransportError {
        LinkUnavailable(LinkUnavailableError),
        Io(std::io::Error),
    }
}
impl_is_timeout! { TransportError }
impl_from_serialport_error! { TransportError }

impl TransportError {
    /// Classify an I/O error raised while using the link.
    ///
    /// Errors indicating the link has gone away become
    /// [`LinkUnavailable`](TransportError::LinkUnavailable); all others are
    /// kept as [`Io`](TransportError::Io).
    pub(crate) fn from_link(err: io::Error) -> Self {
        use io::ErrorKind as K;

        match err.kind() {
            K::NotConnected
            | K::BrokenPipe
            | K::ConnectionReset
            | K::ConnectionAborted
            | K::NotFound
            | K::UnexpectedEof => {
                TransportError::LinkUnavailable(LinkUnavailableError(err.to_string().into()))
            }
            _ => TransportError::Io(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(TransportError: From<LinkUnavailableError>, From<std::io::Error>, Send, Sync);
    assert_impl_all!(LinkUnavailableError: TryFrom<TransportError>);

    #[test]
    fn link_errors_are_classified() {
        let err = TransportError::from_link(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        assert!(matches!(err, TransportError::LinkUnavailable(_)), "{err:?}");

        let err = TransportError::from_link(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(err.is_timeout());
    }

    #[test]
    fn serialport_no_device_is_link_unavailable() {
        let err = TransportError::from(serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            "/dev/ttyUSB0 busy",
        ));
        match err {
            TransportError::LinkUnavailable(e) => assert_eq!(e.description(), "/dev/ttyUSB0 busy"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn decode_error_keeps_bytes() {
        let err = DecodeError::new([0xff, b'a']);
        assert_eq!(err.as_bytes(), &[0xff, b'a']);
        assert_eq!(err.to_string(), "reply is not valid text: \\xffa");
    }
}
