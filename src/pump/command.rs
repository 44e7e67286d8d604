//! Types and functions for building Reglo ICC command frames.
//!
//! Every frame has the shape `{channel}{opcode}[payload]\r`, where the channel
//! is a decimal number, the opcode is one or two ASCII letters, and the only
//! payload is the five digit speed used by [`Opcode::SetSpeed`].

use crate::{
	error::InvalidChannelError,
	frame::{Frame, CARRIAGE_RETURN},
};

/// The lowest speed, in RPM, that can be requested.
pub const MIN_SPEED: f64 = 0.0;

/// The highest speed, in RPM, that can be requested.
pub const MAX_SPEED: f64 = 100.0;

/// A validated, 1-based pump channel.
///
/// A `Channel` can only be created with [`Channel::new`], which checks it
/// against the number of channels on the pump.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
	/// Validate `channel` against a pump with `count` channels.
	///
	/// ## Example
	///
	/// ```rust
	/// use benchproto::pump::Channel;
	///
	/// assert_eq!(Channel::new(4, 4).unwrap().get(), 4);
	/// assert!(Channel::new(0, 4).is_err());
	/// assert!(Channel::new(5, 4).is_err());
	/// ```
	pub fn new(channel: u8, count: u8) -> Result<Self, InvalidChannelError> {
		if (1..=count).contains(&channel) {
			Ok(Channel(channel))
		} else {
			Err(InvalidChannelError::new(channel, count))
		}
	}

	/// Get the channel number.
	pub fn get(self) -> u8 {
		self.0
	}

	/// The 0-based position of the channel.
	pub(crate) fn index(self) -> usize {
		usize::from(self.0 - 1)
	}
}

impl std::fmt::Display for Channel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The direction a channel rotates in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Direction {
	/// Clockwise rotation.
	#[default]
	Clockwise,
	/// Counter-clockwise rotation.
	CounterClockwise,
}

impl From<u8> for Direction {
	/// `1` is counter-clockwise; every other value is clockwise.
	fn from(value: u8) -> Self {
		match value {
			1 => Direction::CounterClockwise,
			_ => Direction::Clockwise,
		}
	}
}

/// The operating mode of a channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Mode {
	/// Speed is controlled in RPM.
	#[default]
	Rpm,
	/// Speed is controlled as a flow rate.
	FlowRate,
	/// Any other mode, e.g. volume dispensing.
	Volume,
}

impl From<u8> for Mode {
	/// `0` is RPM, `1` is flow rate and every other value is [`Mode::Volume`].
	fn from(value: u8) -> Self {
		match value {
			0 => Mode::Rpm,
			1 => Mode::FlowRate,
			_ => Mode::Volume,
		}
	}
}

/// A pump instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
	/// Start the channel (`H`).
	Start,
	/// Stop the channel (`I`).
	Stop,
	/// Rotate clockwise (`J`).
	SetClockwise,
	/// Rotate counter-clockwise (`K`).
	SetCounterClockwise,
	/// Switch to RPM mode (`L`).
	SetModeRpm,
	/// Switch to flow rate mode (`M`).
	SetModeFlowRate,
	/// Switch to any other mode (`G`).
	SetModeOther,
	/// Query the direction (`xD`).
	GetDirection,
	/// Query the mode (`xM`).
	GetMode,
	/// Query the speed (`S`).
	GetSpeed,
	/// Set the speed (`S0`), followed by a five digit speed.
	SetSpeed,
}

impl Opcode {
	/// Get the opcode as it appears on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			Opcode::Start => "H",
			Opcode::Stop => "I",
			Opcode::SetClockwise => "J",
			Opcode::SetCounterClockwise => "K",
			Opcode::SetModeRpm => "L",
			Opcode::SetModeFlowRate => "M",
			Opcode::SetModeOther => "G",
			Opcode::GetDirection => "xD",
			Opcode::GetMode => "xM",
			Opcode::GetSpeed => "S",
			Opcode::SetSpeed => "S0",
		}
	}

	/// The opcode that selects `direction`.
	pub const fn for_direction(direction: Direction) -> Self {
		match direction {
			Direction::Clockwise => Opcode::SetClockwise,
			Direction::CounterClockwise => Opcode::SetCounterClockwise,
		}
	}

	/// The opcode that selects `mode`.
	pub const fn for_mode(mode: Mode) -> Self {
		match mode {
			Mode::Rpm => Opcode::SetModeRpm,
			Mode::FlowRate => Opcode::SetModeFlowRate,
			Mode::Volume => Opcode::SetModeOther,
		}
	}
}

impl std::fmt::Display for Opcode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Clamp a requested speed to [`MIN_SPEED`]..=[`MAX_SPEED`].
///
/// `NaN` is treated as [`MIN_SPEED`].
pub fn clamp_speed(speed: f64) -> f64 {
	if speed.is_nan() {
		MIN_SPEED
	} else {
		speed.clamp(MIN_SPEED, MAX_SPEED)
	}
}

/// Encode a speed, in RPM, as the five digits the pump expects.
///
/// The speed is clamped with [`clamp_speed`] and then written as three
/// zero-padded integer digits followed by two digits of hundredths. Anything
/// finer than a hundredth is truncated. There is no decimal point.
///
/// ## Example
///
/// ```rust
/// use benchproto::pump::command::encode_speed;
///
/// assert_eq!(encode_speed(23.4), "02340");
/// assert_eq!(encode_speed(99.999), "09999");
/// assert_eq!(encode_speed(123.0), "10000");
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_speed(speed: f64) -> String {
	let scaled = clamp_speed(speed) * 100.0;
	// Scaling can land a few ulps below a whole number of hundredths (0.29 * 100
	// is 28.999...). Only that rounding error is absorbed; anything further
	// below is truncated.
	let nearest = scaled.round();
	let hundredths = (if (scaled - nearest).abs() <= scaled.max(1.0) * 1e-12 {
		nearest
	} else {
		scaled.floor()
	}) as u32;
	format!("{:03}{:02}", hundredths / 100, hundredths % 100)
}

/// Build the frame for `opcode` addressed to `channel`.
///
/// `payload` is appended verbatim between the opcode and the terminator.
///
/// ## Example
///
/// ```rust
/// use benchproto::pump::{command::encode, Channel, Opcode};
///
/// let channel = Channel::new(2, 4)?;
/// assert_eq!(encode(channel, Opcode::Start, None).as_bytes(), b"2H\r");
/// assert_eq!(
///     encode(channel, Opcode::SetSpeed, Some("02340")).as_bytes(),
///     b"2S002340\r"
/// );
/// # Ok::<(), benchproto::error::InvalidChannelError>(())
/// ```
pub fn encode(channel: Channel, opcode: Opcode, payload: Option<&str>) -> Frame {
	let mut bytes = format!("{channel}{opcode}{}", payload.unwrap_or_default()).into_bytes();
	bytes.push(CARRIAGE_RETURN);
	Frame::new(bytes)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod test {
	use super::*;

	#[test]
	fn speed_examples() {
		for (speed, expected) in [
			(23.4, "02340"),
			(7.5, "00750"),
			(0.1, "00010"),
			(0.29, "00029"),
			(99.99, "09999"),
			(99.999, "09999"),
			(100.0, "10000"),
			(123.0, "10000"),
			(0.0, "00000"),
			(-3.0, "00000"),
			(f64::NAN, "00000"),
			(f64::INFINITY, "10000"),
			(99.999_999_99, "09999"),
			(23.419_999_999, "02341"),
			(0.009_999_999, "00000"),
		] {
			assert_eq!(encode_speed(speed), expected, "speed {speed}");
		}
	}

	#[test]
	fn speed_is_always_five_digits() {
		for i in 0..=2_000 {
			let speed = f64::from(i) * 0.0613;
			let encoded = encode_speed(speed);
			assert_eq!(encoded.len(), 5, "speed {speed}");
			assert!(encoded.bytes().all(|b| b.is_ascii_digit()), "speed {speed}");
		}
	}

	#[test]
	fn clamp() {
		assert_eq!(clamp_speed(-0.5), MIN_SPEED);
		assert_eq!(clamp_speed(42.0), 42.0);
		assert_eq!(clamp_speed(150.0), MAX_SPEED);
		assert_eq!(clamp_speed(f64::NAN), MIN_SPEED);
	}

	#[test]
	fn frames() {
		let channel = Channel::new(3, 4).unwrap();
		for (opcode, expected) in [
			(Opcode::Start, "3H\r"),
			(Opcode::Stop, "3I\r"),
			(Opcode::SetClockwise, "3J\r"),
			(Opcode::SetCounterClockwise, "3K\r"),
			(Opcode::SetModeRpm, "3L\r"),
			(Opcode::SetModeFlowRate, "3M\r"),
			(Opcode::SetModeOther, "3G\r"),
			(Opcode::GetDirection, "3xD\r"),
			(Opcode::GetMode, "3xM\r"),
			(Opcode::GetSpeed, "3S\r"),
		] {
			assert_eq!(encode(channel, opcode, None).as_bytes(), expected.as_bytes());
		}
		let frame = encode(channel, Opcode::SetSpeed, Some(encode_speed(7.5).as_str()));
		assert_eq!(frame.as_bytes(), b"3S000750\r");
	}

	#[test]
	fn multi_digit_channels() {
		let channel = Channel::new(12, 12).unwrap();
		assert_eq!(encode(channel, Opcode::Stop, None).as_bytes(), b"12I\r");
	}

	#[test]
	fn channel_range() {
		assert!(Channel::new(0, 4).is_err());
		assert_eq!(Channel::new(1, 4).unwrap().index(), 0);
		assert_eq!(Channel::new(4, 4).unwrap().index(), 3);
		let err = Channel::new(5, 4).unwrap_err();
		assert_eq!((err.channel(), err.count()), (5, 4));
		assert!(Channel::new(1, 0).is_err());
	}

	#[test]
	fn integer_codes() {
		assert_eq!(Direction::from(0), Direction::Clockwise);
		assert_eq!(Direction::from(1), Direction::CounterClockwise);
		assert_eq!(Direction::from(7), Direction::Clockwise);
		assert_eq!(Mode::from(0), Mode::Rpm);
		assert_eq!(Mode::from(1), Mode::FlowRate);
		assert_eq!(Mode::from(2), Mode::Volume);
		assert_eq!(Mode::from(255), Mode::Volume);
	}

	#[test]
	fn opcode_selection() {
		assert_eq!(
			Opcode::for_direction(Direction::CounterClockwise),
			Opcode::SetCounterClockwise
		);
		assert_eq!(Opcode::for_mode(Mode::from(9)), Opcode::SetModeOther);
	}
}
