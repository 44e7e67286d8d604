//! Command frames and the text decoding shared by both instrument dialects.
//!
//! A [`Frame`] is the complete sequence of bytes for one command, terminator
//! included. Frames are built by the instrument specific codecs
//! ([`pump::command`](crate::pump::command) and
//! [`balance::command`](crate::balance::command)) and never change once built.

use crate::error::DecodeError;

/// The carriage return byte.
pub(crate) const CARRIAGE_RETURN: u8 = b'\r';

/// The line feed byte.
pub(crate) const LINE_FEED: u8 = b'\n';

/// The escape byte.
#[cfg_attr(not(feature = "balance"), allow(dead_code))]
pub(crate) const ESCAPE: u8 = 0x1b;

/// A complete command frame, ready to be written to an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame(Box<[u8]>);

impl Frame {
	/// Create a frame from its complete contents, terminator included.
	pub(crate) fn new(bytes: Vec<u8>) -> Self {
		debug_assert!(
			matches!(bytes.last().copied(), Some(CARRIAGE_RETURN | LINE_FEED)),
			"frames must be terminated"
		);
		Frame(bytes.into_boxed_slice())
	}

	/// Get the bytes of the frame.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Get the byte terminating the frame.
	pub fn terminator(&self) -> Option<u8> {
		self.0.last().copied()
	}
}

impl AsRef<[u8]> for Frame {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

impl std::fmt::Display for Frame {
	/// Display the frame with control characters escaped, e.g. `\x1bP\n`.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0.escape_ascii())
	}
}

/// Decode the bytes of a reply as text.
///
/// Bytes that are not valid UTF-8 produce a [`DecodeError`] holding the
/// offending bytes.
///
/// ## Example
///
/// ```rust
/// use benchproto::frame::decode_text;
///
/// assert_eq!(decode_text(b"*\r\n").unwrap(), "*\r\n");
/// assert!(decode_text(&[0xff, 0xfe]).is_err());
/// ```
pub fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
	std::str::from_utf8(bytes)
		.map(str::to_string)
		.map_err(|_| DecodeError::new(bytes))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn frame_display_escapes_control_bytes() {
		let frame = Frame::new(vec![ESCAPE, b'P', LINE_FEED]);
		assert_eq!(frame.to_string(), "\\x1bP\\n");
		assert_eq!(frame.terminator(), Some(LINE_FEED));
		assert_eq!(frame.as_bytes(), b"\x1bP\n");
	}

	#[test]
	fn decode_text_accepts_empty_replies() {
		assert_eq!(decode_text(b"").unwrap(), "");
	}

	#[test]
	fn decode_text_reports_invalid_bytes() {
		let err = decode_text(b"12\xff").unwrap_err();
		assert_eq!(err.as_bytes(), b"12\xff");
	}
}
