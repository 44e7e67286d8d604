//! The [`Pump`] driver and the options for opening it.

mod options;

#[cfg(any(test, feature = "mock"))]
use crate::backend::Mock;
use crate::{
	backend::{Backend, Serial},
	error::{InvalidChannelError, PumpError},
	frame::decode_text,
	pump::command::{self, Channel, Direction, Mode, Opcode},
	timeout_guard::{self, TimeoutGuard},
	transport::Transport,
};
pub use options::*;
use std::{io, time::Duration};

/// The most recently requested settings of one channel.
///
/// The pump is never asked to confirm these values, so they record what was
/// sent, not necessarily what the pump is doing.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ChannelState {
	/// The requested direction.
	pub direction: Direction,
	/// The requested mode.
	pub mode: Mode,
	/// The requested speed in RPM, after clamping.
	pub speed: f64,
}

/// A driver for a Reglo ICC pump.
///
/// Commands are written one at a time. After each command the driver waits for
/// the [settle delay](Pump::settle_delay) and then returns whatever reply text
/// has arrived, which may be empty. A reply that arrives late is returned by
/// the next command instead.
///
/// The serial port is closed when the driver is dropped.
pub struct Pump<B> {
	/// The link to the pump.
	transport: Transport<B>,
	/// The requested state of each channel, indexed by channel - 1.
	channels: Vec<ChannelState>,
}

impl<B: Backend> std::fmt::Debug for Pump<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Pump")
			.field("transport", &self.transport)
			.field("channels", &self.channels)
			.finish()
	}
}

impl Pump<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Alternatively, use [`Pump::open_serial_options`] to customize how the
	/// port is opened.
	///
	/// ## Example
	///
	/// ```
	/// # use benchproto::{error::PumpError, pump::Pump};
	/// # fn wrapper() -> Result<(), PumpError> {
	/// let mut pump = Pump::open_serial("/dev/ttyUSB0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial(path: &str) -> Result<Pump<Serial>, PumpError> {
		OpenSerialOptions::new().open(path)
	}

	/// Return a new [`OpenSerialOptions`] that can be used to construct a
	/// [`Pump`] with custom options.
	///
	/// ## Example
	///
	/// ```
	/// # use benchproto::{error::PumpError, pump::Pump};
	/// # use std::time::Duration;
	/// # fn wrapper() -> Result<(), PumpError> {
	/// let mut pump = Pump::open_serial_options()
	///     .channels(8)
	///     .settle(Duration::from_millis(200))
	///     .open("/dev/ttyUSB0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::new()
	}
}

#[cfg(any(test, feature = "mock"))]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "mock")))]
impl Pump<Mock> {
	/// Open a driver on a [`Mock`] backend.
	///
	/// The pump has the default number of channels and no settle delay.
	pub fn open_mock() -> Pump<Mock> {
		Pump::from_backend(
			Mock::new(),
			OpenSerialOptions::DEFAULT_CHANNELS,
			Duration::ZERO,
		)
	}
}

impl<B: Backend> Pump<B> {
	/// Create a driver from an open backend.
	pub(crate) fn from_backend(backend: B, channels: u8, settle: Duration) -> Self {
		Pump {
			transport: Transport::new(backend, settle),
			channels: vec![ChannelState::default(); usize::from(channels)],
		}
	}

	/// The number of channels on the pump.
	pub fn channel_count(&self) -> u8 {
		u8::try_from(self.channels.len()).unwrap_or(u8::MAX)
	}

	/// Validate a channel number.
	fn channel(&self, channel: u8) -> Result<Channel, InvalidChannelError> {
		Channel::new(channel, self.channel_count())
	}

	/// Send a command and return the reply text.
	///
	/// `update` is applied to the channel's requested state once the command
	/// has been written, before the reply is read.
	fn command<F>(
		&mut self,
		channel: Channel,
		opcode: Opcode,
		payload: Option<&str>,
		update: F,
	) -> Result<String, PumpError>
	where
		F: FnOnce(&mut ChannelState),
	{
		let frame = command::encode(channel, opcode, payload);
		self.transport.send(&frame)?;
		update(&mut self.channels[channel.index()]);
		self.transport.settle();
		let reply = self.transport.receive_available()?;
		Ok(reply_text(&reply))
	}

	/// Start a channel.
	pub fn start_channel(&mut self, channel: u8) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::Start, None, |_| {})
	}

	/// Stop a channel.
	pub fn stop_channel(&mut self, channel: u8) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::Stop, None, |_| {})
	}

	/// Set the direction a channel rotates in.
	///
	/// The requested direction is recorded once the command is sent, whatever
	/// the pump replies.
	pub fn set_direction(
		&mut self,
		channel: u8,
		direction: Direction,
	) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::for_direction(direction), None, |state| {
			state.direction = direction;
		})
	}

	/// Ask the pump for a channel's direction.
	///
	/// The reply is returned as-is and does not change the requested state.
	pub fn get_direction(&mut self, channel: u8) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::GetDirection, None, |_| {})
	}

	/// Set a channel's speed in RPM.
	///
	/// The speed is clamped to
	/// [`MIN_SPEED`](command::MIN_SPEED)..=[`MAX_SPEED`](command::MAX_SPEED)
	/// and sent with two decimal places, see [`encode_speed`](command::encode_speed).
	/// The clamped speed is recorded once the command is sent.
	pub fn set_speed(&mut self, channel: u8, speed: f64) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		let speed = command::clamp_speed(speed);
		let digits = command::encode_speed(speed);
		self.command(channel, Opcode::SetSpeed, Some(digits.as_str()), |state| {
			state.speed = speed;
		})
	}

	/// Ask the pump for a channel's speed.
	///
	/// The reply is returned as-is and does not change the requested state.
	pub fn get_speed(&mut self, channel: u8) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::GetSpeed, None, |_| {})
	}

	/// Set a channel's mode.
	///
	/// The requested mode is recorded once the command is sent.
	pub fn set_mode(&mut self, channel: u8, mode: Mode) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::for_mode(mode), None, |state| {
			state.mode = mode;
		})
	}

	/// Ask the pump for a channel's mode.
	///
	/// The reply is returned as-is and does not change the requested state.
	pub fn get_mode(&mut self, channel: u8) -> Result<String, PumpError> {
		let channel = self.channel(channel)?;
		self.command(channel, Opcode::GetMode, None, |_| {})
	}

	/// Get the settings most recently sent to a channel.
	///
	/// Channels that have not been configured report the defaults: clockwise,
	/// RPM mode and a speed of zero.
	pub fn requested_state(&self, channel: u8) -> Result<ChannelState, InvalidChannelError> {
		let channel = self.channel(channel)?;
		Ok(self.channels[channel.index()])
	}

	/// Get the settings most recently sent to every channel, in channel order.
	pub fn requested_states(&self) -> &[ChannelState] {
		&self.channels
	}

	/// Get the time waited between sending a command and reading the reply.
	pub fn settle_delay(&self) -> Duration {
		self.transport.settle_delay()
	}

	/// Set the time waited between sending a command and reading the reply,
	/// returning the previous value.
	///
	/// A longer delay makes it less likely that a slow reply is mistaken for
	/// the reply to the next command.
	pub fn set_settle_delay(&mut self, settle: Duration) -> Duration {
		self.transport.set_settle_delay(settle)
	}

	/// Set the port's read timeout and return a scope guard that will reset it
	/// when it is dropped.
	///
	/// Replies are drained after the [settle delay](Pump::settle_delay)
	/// without waiting for more bytes, so the read timeout rarely matters for
	/// the pump. Use [`set_settle_delay`](Pump::set_settle_delay) to give a slow
	/// pump more time to reply.
	///
	/// See [`TimeoutGuard`] for more information.
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B, Self>, io::Error> {
		self.transport.check_poisoned()?;
		TimeoutGuard::new(self, timeout)
	}

	/// Set the read timeout.
	///
	/// If `timeout` is `None`, reads will block indefinitely. Only bytes the
	/// port has already reported as waiting are read, so this only bounds a
	/// read that stalls part way through a reply.
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
	///
	/// Reading or writing the backend directly will interfere with how replies
	/// are collected, so use this with care.
	pub fn backend_mut(&mut self) -> &mut B {
		self.transport.backend_mut()
	}

	/// Consume the driver and return the underlying backend.
	pub fn into_backend(self) -> B {
		self.transport.into_backend()
	}
}

impl<B: Backend> timeout_guard::Port<B> for Pump<B> {
	fn backend_mut(&mut self) -> &mut B {
		self.transport.backend_mut()
	}
	fn poison(&mut self, e: io::Error) {
		self.transport.poison(e);
	}
}

/// Decode reply bytes, falling back to a lossy decoding.
fn reply_text(bytes: &[u8]) -> String {
	decode_text(bytes).unwrap_or_else(|err| {
		log::warn!("{err}, decoding lossily");
		String::from_utf8_lossy(err.as_bytes()).into_owned()
	})
}
