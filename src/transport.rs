//! The byte-level link shared by both instrument drivers.
//!
//! A [`Transport`] owns a [`Backend`] whose line discipline (baud rate,
//! parity, stop bits and data bits) was fixed when it was opened. Neither
//! instrument frames its replies with a length, so the transport offers two
//! ways of collecting a reply:
//!
//!  * [`exchange`](Transport::exchange): send a frame, wait a fixed settle
//!    interval, then drain whatever bytes have arrived. This is how the pump
//!    is driven. A reply that arrives after the settle interval is left in the
//!    buffer and will be picked up by the next drain.
//!  * [`read_line`](Transport::read_line): block until a terminator byte is
//!    read or the read timeout elapses. This is how the balance is driven.
//!
//! The transport is closed when it is dropped, which happens when the driver
//! owning it is dropped.

use crate::{
	backend::{Backend, UNKNOWN_BACKEND_NAME},
	error::TransportError,
	frame::Frame,
};
use std::{io, time::Duration};

/// An owned link to one instrument.
pub struct Transport<B> {
	/// The underlying backend
	backend: B,
	/// The time to wait between sending a frame and draining the reply.
	settle: Duration,
	/// If populated, the error that has "poisoned" the transport. This error
	/// MUST be reported before the link is used for communication again.
	///
	/// A transport becomes "poisoned" when an error occurs that cannot be
	/// reported when it happens, such as a [`TimeoutGuard`] failing to restore
	/// the original timeout in its Drop implementation.
	///
	/// [`TimeoutGuard`]: crate::timeout_guard::TimeoutGuard
	poison: Option<io::Error>,
}

impl<B: Backend> std::fmt::Debug for Transport<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Transport")
			.field("name", &self.backend.name())
			.field("settle", &self.settle)
			.finish_non_exhaustive()
	}
}

impl<B: Backend> Transport<B> {
	/// Take ownership of an open backend.
	pub(crate) fn new(backend: B, settle: Duration) -> Self {
		let transport = Transport {
			backend,
			settle,
			poison: None,
		};
		log::debug!("{} opened", transport.backend_name());
		transport
	}

	/// The backend's name, or a placeholder if it has none.
	fn backend_name(&self) -> String {
		self.backend
			.name()
			.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string())
	}

	/// Check if the transport is poisoned and report the error if it exists.
	pub(crate) fn check_poisoned(&mut self) -> Result<(), io::Error> {
		if let Some(poison) = self.poison.take() {
			Err(poison)
		} else {
			Ok(())
		}
	}

	/// Poison the transport so that `e` is reported by the next operation.
	pub(crate) fn poison(&mut self, e: io::Error) {
		self.poison = Some(e);
	}

	/// Write all the bytes of a frame.
	///
	/// If the link has been closed or disconnected a
	/// [`LinkUnavailable`](TransportError::LinkUnavailable) error is returned.
	pub fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
		self.check_poisoned()?;
		log::debug!("{} TX:   {}", self.backend_name(), frame);
		io::Write::write_all(&mut self.backend, frame.as_bytes())
			.map_err(TransportError::from_link)?;
		io::Write::flush(&mut self.backend).map_err(TransportError::from_link)
	}

	/// The number of received bytes waiting to be read.
	pub fn bytes_waiting(&mut self) -> Result<usize, TransportError> {
		self.check_poisoned()?;
		self.backend
			.bytes_to_read()
			.map_err(TransportError::from_link)
	}

	/// Read whatever bytes are currently buffered, without waiting for more.
	///
	/// If no bytes are waiting, an empty vector is returned.
	pub fn receive_available(&mut self) -> Result<Vec<u8>, TransportError> {
		let waiting = self.bytes_waiting()?;
		let mut buf = vec![0u8; waiting];
		let mut filled = 0;
		while filled < waiting {
			match io::Read::read(&mut self.backend, &mut buf[filled..]) {
				Ok(0) => break,
				Ok(n) => filled += n,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				// The bytes were reported as waiting but never showed up.
				Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
				Err(e) => return Err(TransportError::from_link(e)),
			}
		}
		buf.truncate(filled);
		if !buf.is_empty() {
			log::debug!(
				"{} RECV: {}",
				self.backend_name(),
				String::from_utf8_lossy(&buf).trim_end()
			);
		}
		Ok(buf)
	}

	/// Wait for the settle interval.
	pub fn settle(&self) {
		if !self.settle.is_zero() {
			std::thread::sleep(self.settle);
		}
	}

	/// Send a frame, wait for the settle interval, and then drain all the
	/// bytes that have arrived.
	pub fn exchange(&mut self, frame: &Frame) -> Result<Vec<u8>, TransportError> {
		self.send(frame)?;
		self.settle();
		self.receive_available()
	}

	/// Read bytes until `terminator` is read or the port times out.
	///
	/// The terminator is included in the returned bytes. If the port times out
	/// first, the bytes read so far are returned, which may be none at all.
	pub fn read_line(&mut self, terminator: u8) -> Result<Vec<u8>, TransportError> {
		self.check_poisoned()?;
		let name = self.backend_name();
		let mut line = Vec::with_capacity(32);
		for byte in io::Read::bytes(&mut self.backend) {
			match byte {
				Ok(byte) => {
					line.push(byte);
					if byte == terminator {
						break;
					}
				}
				Err(e) if e.kind() == io::ErrorKind::TimedOut => {
					log::debug!(
						"{} timed out after reading {} byte(s) of a line",
						name,
						line.len()
					);
					break;
				}
				Err(e) => return Err(TransportError::from_link(e)),
			}
		}
		log::debug!(
			"{} RECV: {}",
			name,
			String::from_utf8_lossy(&line).trim_end()
		);
		Ok(line)
	}

	/// Get the settle interval.
	pub fn settle_delay(&self) -> Duration {
		self.settle
	}

	/// Set the settle interval, returning the previous value.
	pub fn set_settle_delay(&mut self, settle: Duration) -> Duration {
		std::mem::replace(&mut self.settle, settle)
	}

	/// Set the read timeout.
	///
	/// If `timeout` is `None`, reads will block indefinitely.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		self.check_poisoned()?;
		self.backend.set_read_timeout(timeout)
	}

	/// Get the read timeout.
	///
	/// If it is `None`, reads will block indefinitely.
	pub fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		self.backend.read_timeout()
	}

	/// Get the name of the underlying backend.
	pub fn name(&self) -> Option<String> {
		self.backend.name()
	}

	/// Get a reference to the underlying backend.
	pub fn backend(&self) -> &B {
		&self.backend
	}

	/// Get a mutable reference to the underlying backend.
	///
	/// Reading or writing the backend directly will interfere with the
	/// settle-and-drain framing, so use this with care.
	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	/// Consume the transport and return the underlying backend.
	pub fn into_backend(self) -> B {
		self.backend
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::backend::Mock;

	fn frame(bytes: &[u8]) -> Frame {
		Frame::new(bytes.to_vec())
	}

	#[test]
	fn exchange_writes_frame_and_drains_reply() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		transport.backend_mut().reply_on_write(b"*");
		let reply = transport.exchange(&frame(b"1H\r")).unwrap();
		assert_eq!(reply, b"*");
		assert_eq!(transport.backend().written(), b"1H\r");
	}

	#[test]
	fn receive_available_does_not_wait() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		assert!(transport.receive_available().unwrap().is_empty());

		transport.backend_mut().append_data(b"abc");
		assert_eq!(transport.receive_available().unwrap(), b"abc");
		assert!(transport.receive_available().unwrap().is_empty());
	}

	#[test]
	fn read_line_stops_at_terminator() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		transport.backend_mut().append_data(b"first\r\nsecond\r\n");
		assert_eq!(transport.read_line(b'\n').unwrap(), b"first\r\n");
		assert_eq!(transport.read_line(b'\n').unwrap(), b"second\r\n");
	}

	#[test]
	fn read_line_returns_partial_line_on_timeout() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		assert!(transport.read_line(b'\n').unwrap().is_empty());

		transport.backend_mut().append_data(b"partial");
		assert_eq!(transport.read_line(b'\n').unwrap(), b"partial");
	}

	#[test]
	fn closed_link_is_unavailable() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		transport
			.backend_mut()
			.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));
		let err = transport.send(&frame(b"1H\r")).unwrap_err();
		assert!(matches!(err, TransportError::LinkUnavailable(_)), "{err:?}");
	}

	#[test]
	fn read_errors_are_reported() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		transport.backend_mut().append_data(b"x");
		transport
			.backend_mut()
			.read_error(Some(io::Error::other("parity error")));
		let err = transport.read_line(b'\n').unwrap_err();
		assert!(matches!(err, TransportError::Io(_)), "{err:?}");
	}

	#[test]
	fn poison_is_reported_once() {
		let mut transport = Transport::new(Mock::new(), Duration::ZERO);
		transport.poison(io::Error::other("poisoned"));
		let err = transport.send(&frame(b"1H\r")).unwrap_err();
		assert!(matches!(err, TransportError::Io(_)));
		assert!(transport.backend().written().is_empty());
		transport.send(&frame(b"1H\r")).unwrap();
		assert_eq!(transport.backend().written(), b"1H\r");
	}

	#[test]
	fn settle_delay_can_be_changed() {
		let mut transport = Transport::new(Mock::new(), Duration::from_millis(100));
		assert_eq!(
			transport.set_settle_delay(Duration::ZERO),
			Duration::from_millis(100)
		);
		assert_eq!(transport.settle_delay(), Duration::ZERO);
	}
}
