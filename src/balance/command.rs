//! Types and functions for building Sartorius command frames.
//!
//! Every frame is the escape byte followed by a single letter and a
//! terminator. The balance has no addressing.

use crate::frame::{Frame, CARRIAGE_RETURN, ESCAPE, LINE_FEED};

/// A balance instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
	/// Print the displayed value (`ESC P LF`).
	RequestReading,
	/// Print the balance's status (`ESC Q CR`).
	RequestStatus,
	/// Tare and zero in one step (`ESC T LF`).
	TareAndZero,
	/// Tare (`ESC U LF`).
	Tare,
	/// Zero (`ESC V LF`).
	Zero,
}

impl Opcode {
	/// The letter following the escape byte.
	pub const fn letter(self) -> u8 {
		match self {
			Opcode::RequestReading => b'P',
			Opcode::RequestStatus => b'Q',
			Opcode::TareAndZero => b'T',
			Opcode::Tare => b'U',
			Opcode::Zero => b'V',
		}
	}

	/// The byte terminating the frame.
	pub const fn terminator(self) -> u8 {
		match self {
			Opcode::RequestStatus => CARRIAGE_RETURN,
			_ => LINE_FEED,
		}
	}
}

/// Build the frame for `opcode`.
///
/// ## Example
///
/// ```rust
/// use benchproto::balance::{command::encode, Opcode};
///
/// assert_eq!(encode(Opcode::Tare).as_bytes(), b"\x1bU\n");
/// assert_eq!(encode(Opcode::RequestStatus).as_bytes(), b"\x1bQ\r");
/// ```
pub fn encode(opcode: Opcode) -> Frame {
	Frame::new(vec![ESCAPE, opcode.letter(), opcode.terminator()])
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn frames() {
		for (opcode, expected) in [
			(Opcode::RequestReading, b"\x1bP\n"),
			(Opcode::RequestStatus, b"\x1bQ\r"),
			(Opcode::TareAndZero, b"\x1bT\n"),
			(Opcode::Tare, b"\x1bU\n"),
			(Opcode::Zero, b"\x1bV\n"),
		] {
			assert_eq!(encode(opcode).as_bytes(), expected, "{opcode:?}");
		}
	}
}
