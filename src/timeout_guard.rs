//! A "scope guard" that will reset a driver's read timeout when it goes out of scope.

use crate::backend::Backend;
use std::{io, marker::PhantomData, time::Duration};

/// An instrument driver, as required by the [`TimeoutGuard`].
pub trait Port<B>: private::Sealed {
    /// Get the underlying backend.
    #[doc(hidden)]
    fn backend_mut(&mut self) -> &mut B;
    /// Poison the driver's transport.
    #[doc(hidden)]
    fn poison(&mut self, e: io::Error);
}

mod private {
    /// Marks a trait a sealed.
    pub trait Sealed {}
    #[cfg(feature = "pump")]
    impl<B> Sealed for crate::pump::Pump<B> {}
    #[cfg(feature = "balance")]
    impl<B> Sealed for crate::balance::Balance<B> {}
}

/// A "scope guard" that will update the driver's read timeout and then reset
/// it when it goes out of scope.
///
/// To create a guard, use the driver's
/// [`timeout_guard`](crate::balance::Balance::timeout_guard) method.
///
/// While the guard is in scope, the driver can only be accessed through the guard.
/// However, because the guard implements [`Deref`](std::ops::Deref) and
/// [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the driver.
///
/// If the original timeout cannot be restored when the guard is dropped, the
/// driver is poisoned and the next operation on it reports the failure.
#[derive(Debug)]
pub struct TimeoutGuard<'a, B: Backend, P: Port<B>> {
    /// The underlying driver.
    port: &'a mut P,
    /// The original timeout that will be restored when the guard is dropped.
    original_timeout: Option<Duration>,
    backend_marker: PhantomData<B>,
}

impl<'a, B: Backend, P: Port<B>> TimeoutGuard<'a, B, P> {
    /// Update the driver's timeout and return a [`TimeoutGuard`] wrapping the driver.
    pub(crate) fn new(port: &'a mut P, timeout: Option<Duration>) -> Result<Self, io::Error> {
        let backend = port.backend_mut();
        let original_timeout = backend.read_timeout()?;
        backend.set_read_timeout(timeout)?;
        Ok(TimeoutGuard {
            port,
            original_timeout,
            backend_marker: PhantomData,
        })
    }
}

impl<B: Backend, P: Port<B>> std::ops::Deref for TimeoutGuard<'_, B, P> {
    type Target = P;
    /// Get a shared reference to the underlying driver.
    fn deref(&self) -> &Self::Target {
        self.port
    }
}

impl<B: Backend, P: Port<B>> std::ops::DerefMut for TimeoutGuard<'_, B, P> {
    /// Get an exclusive reference to the underlying driver.
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.port
    }
}

impl<B: Backend, P: Port<B>> std::ops::Drop for TimeoutGuard<'_, B, P> {
    fn drop(&mut self) {
        if let Err(err) = self
            .port
            .backend_mut()
            .set_read_timeout(self.original_timeout)
        {
            let message = if let Some(timeout) = self.original_timeout {
                format!(
                    "failed to reset timeout to {} ms: {}",
                    timeout.as_millis(),
                    err
                )
            } else {
                format!("failed to reset to an infinite timeout: {err}")
            };
            self.port.poison(io::Error::other(message));
        }
    }
}
