//! Error types related to the Sartorius balance.

use super::{LinkUnavailableError, TransportError};

error_enum! {
    /// Any error returned by the [`balance`](crate::balance) module.
    ///
    /// Replies that cannot be decoded are not errors for the balance; they
    /// are reported as [`Reading::NotAvailable`](crate::balance::Reading::NotAvailable)
    /// instead.
    #[derive(Debug)]
    #[non_exhaustive]
    #[cfg_attr(
    all(doc, feature = "doc_cfg"),
    doc(cfg(feature = "balance"))
)]
    pub enum BalanceError {
        LinkUnavailable(LinkUnavailableError),
        Io(std::io::Error),
    }

    impl From<TransportError> {
        LinkUnavailable => LinkUnavailable,
        Io => Io,
    }
}
impl_is_timeout! { BalanceError }
impl_from_serialport_error! { BalanceError }

#[cfg(test)]
mod test {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(BalanceError: From<TransportError>, From<LinkUnavailableError>, Send, Sync);
    assert_impl_all!(TransportError: TryFrom<BalanceError>);
}
