//! The [`Balance`] driver and the options for opening it.

mod options;
#[cfg(test)]
mod test;

#[cfg(any(test, feature = "mock"))]
use crate::backend::Mock;
use crate::{
	backend::{Backend, Serial},
	balance::{
		command::{self, Opcode},
		reading::{decode_reading, decode_unit, Reading},
	},
	error::{BalanceError, TransportError},
	frame::LINE_FEED,
	timeout_guard::{self, TimeoutGuard},
	transport::Transport,
};
pub use options::*;
use std::{io, time::Duration};

/// The outcome of a [`diagnostic_probe`](Balance::diagnostic_probe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
	/// The status request was sent and a line (possibly empty) was read.
	Response {
		/// The number of bytes that were waiting before the request was sent.
		bytes_waiting: usize,
		/// The line read back, as received.
		raw: Vec<u8>,
		/// The line read back, decoded lossily.
		text: String,
	},
	/// The probe failed, with a description of why.
	Failed(String),
}

/// A driver for a Sartorius balance.
///
/// Requests are written one at a time and replies are read one line at a time,
/// waiting at most the read timeout for each line.
///
/// The serial port is closed when the driver is dropped.
pub struct Balance<B> {
	/// The link to the balance.
	transport: Transport<B>,
}

impl<B: Backend> std::fmt::Debug for Balance<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Balance")
			.field("transport", &self.transport)
			.finish()
	}
}

impl Balance<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Alternatively, use [`Balance::open_serial_options`] to customize how
	/// the port is opened.
	///
	/// ## Example
	///
	/// ```
	/// # use benchproto::{balance::Balance, error::BalanceError};
	/// # fn wrapper() -> Result<(), BalanceError> {
	/// let mut balance = Balance::open_serial("/dev/ttyUSB1")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial(path: &str) -> Result<Balance<Serial>, BalanceError> {
		OpenSerialOptions::new().open(path)
	}

	/// Return a new [`OpenSerialOptions`] that can be used to construct a
	/// [`Balance`] with custom options.
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::new()
	}
}

#[cfg(any(test, feature = "mock"))]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "mock")))]
impl Balance<Mock> {
	/// Open a driver on a [`Mock`] backend.
	pub fn open_mock() -> Balance<Mock> {
		Balance::from_backend(Mock::new())
	}
}

impl<B: Backend> Balance<B> {
	/// Create a driver from an open backend.
	pub(crate) fn from_backend(backend: B) -> Self {
		Balance {
			transport: Transport::new(backend, Duration::ZERO),
		}
	}

	/// Send a request without reading a reply.
	fn send(&mut self, opcode: Opcode) -> Result<(), TransportError> {
		self.transport.send(&command::encode(opcode))
	}

	/// Read the displayed value.
	///
	/// A reading is only requested if the balance hasn't already printed one,
	/// so a balance configured to print continuously is read as-is. A line
	/// that cannot be decoded is [`Reading::NotAvailable`].
	pub fn read_value(&mut self) -> Result<Reading, BalanceError> {
		if self.transport.bytes_waiting()? == 0 {
			self.send(Opcode::RequestReading)?;
		}
		let line = self.transport.read_line(LINE_FEED)?;
		Ok(decode_reading(&line))
	}

	/// Read the displayed unit, e.g. `"g"`.
	///
	/// If the unit cannot be decoded an empty string is returned.
	pub fn read_unit(&mut self) -> Result<String, BalanceError> {
		self.send(Opcode::RequestReading)?;
		let line = self.transport.read_line(LINE_FEED)?;
		Ok(decode_unit(&line))
	}

	/// Tare and zero the balance in one step.
	pub fn tare_and_zero(&mut self) -> Result<(), BalanceError> {
		Ok(self.send(Opcode::TareAndZero)?)
	}

	/// Tare the balance.
	pub fn tare(&mut self) -> Result<(), BalanceError> {
		Ok(self.send(Opcode::Tare)?)
	}

	/// Zero the balance.
	pub fn zero(&mut self) -> Result<(), BalanceError> {
		Ok(self.send(Opcode::Zero)?)
	}

	/// Check that the balance is responding by requesting its status.
	///
	/// This never fails. Any error is captured in [`Diagnostic::Failed`].
	pub fn diagnostic_probe(&mut self) -> Diagnostic {
		match self.probe() {
			Ok(diagnostic) => diagnostic,
			Err(err) => {
				log::warn!("diagnostic probe failed: {err}");
				Diagnostic::Failed(err.to_string())
			}
		}
	}

	/// Request the balance's status and read the reply.
	fn probe(&mut self) -> Result<Diagnostic, TransportError> {
		let bytes_waiting = self.transport.bytes_waiting()?;
		log::debug!("{bytes_waiting} byte(s) waiting before probe");
		self.send(Opcode::RequestStatus)?;
		let raw = self.transport.read_line(LINE_FEED)?;
		let text = String::from_utf8_lossy(&raw).into_owned();
		Ok(Diagnostic::Response {
			bytes_waiting,
			raw,
			text,
		})
	}

	/// Set the port's read timeout and return a scope guard that will reset it
	/// when it is dropped.
	///
	/// See [`TimeoutGuard`] for more information.
	///
	/// ## Example
	///
	/// ```
	/// # use benchproto::{backend::Backend, balance::Balance};
	/// # use std::time::Duration;
	/// # fn wrapper<B: Backend>(mut balance: Balance<B>) -> Result<(), Box<dyn std::error::Error>> {
	/// {
	///     // Wait longer than usual for a slow reading
	///     let mut guard = balance.timeout_guard(Some(Duration::from_secs(2)))?;
	///     guard.read_value()?;
	/// }
	/// // The original timeout is restored here
	/// # Ok(())
	/// # }
	/// ```
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B, Self>, io::Error> {
		self.transport.check_poisoned()?;
		TimeoutGuard::new(self, timeout)
	}

	/// Set the read timeout.
	///
	/// If `timeout` is `None`, reads will block indefinitely.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		self.transport.set_read_timeout(timeout)
	}

	/// Get the read timeout.
	///
	/// If it is `None`, reads will block indefinitely.
	pub fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		self.transport.read_timeout()
	}

	/// Get the name of the underlying backend.
	pub fn name(&self) -> Option<String> {
		self.transport.name()
	}

	/// Get a reference to the underlying backend.
	pub fn backend(&self) -> &B {
		self.transport.backend()
	}

	/// Get a mutable reference to the underlying backend.
	pub fn backend_mut(&mut self) -> &mut B {
		self.transport.backend_mut()
	}

	/// Consume the driver and return the underlying backend.
	pub fn into_backend(self) -> B {
		self.transport.into_backend()
	}
}

impl<B: Backend> timeout_guard::Port<B> for Balance<B> {
	fn backend_mut(&mut self) -> &mut B {
		self.transport.backend_mut()
	}
	fn poison(&mut self, e: io::Error) {
		self.transport.poison(e);
	}
}
