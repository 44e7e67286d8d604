//! Decoding of the lines the balance prints.

use crate::frame::decode_text;

/// The length, in characters and including the line ending, of a line printed
/// without an identifier prefix (menu code 7.1.1).
pub const SHORT_LINE_LENGTH: usize = 16;

/// The position of the unit within a printed line.
const UNIT_POSITION: usize = 11;

/// A value read from the balance.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Reading {
	/// The displayed value.
	Value(f64),
	/// The balance's reply could not be understood.
	#[default]
	NotAvailable,
}

impl Reading {
	/// Get the value, if there is one.
	pub fn value(self) -> Option<f64> {
		match self {
			Reading::Value(value) => Some(value),
			Reading::NotAvailable => None,
		}
	}

	/// Whether the reading holds a value.
	pub fn is_available(self) -> bool {
		matches!(self, Reading::Value(_))
	}
}

impl std::fmt::Display for Reading {
	/// Display the value, or `NA` if there isn't one.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Reading::Value(value) => write!(f, "{value}"),
			Reading::NotAvailable => f.write_str("NA"),
		}
	}
}

/// Decode a line printed by the balance into a [`Reading`].
///
/// A line of exactly [`SHORT_LINE_LENGTH`] characters holds the value in its
/// first 11 characters. Any other line is assumed to start with a 6 character
/// identifier, and the value is read from the 11 characters after it. Spaces
/// within the value are ignored.
///
/// Anything that is not valid text or not a number is
/// [`NotAvailable`](Reading::NotAvailable).
///
/// ## Example
///
/// ```rust
/// use benchproto::balance::{decode_reading, Reading};
///
/// assert_eq!(decode_reading(b"  123.45   g    "), Reading::Value(123.45));
/// assert_eq!(decode_reading(b"N     +      12.5 g  \r\n"), Reading::Value(12.5));
/// assert_eq!(decode_reading(b"  ------   g  \r\n"), Reading::NotAvailable);
/// ```
pub fn decode_reading(bytes: &[u8]) -> Reading {
	let text = match decode_text(bytes) {
		Ok(text) => text,
		Err(err) => {
			log::warn!("{err}");
			return Reading::NotAvailable;
		}
	};
	let chars: Vec<char> = text.chars().collect();
	let (start, end) = if chars.len() == SHORT_LINE_LENGTH {
		(0, 11)
	} else {
		(6, 17)
	};
	let field: String = chars[start.min(chars.len())..end.min(chars.len())]
		.iter()
		.filter(|c| **c != ' ')
		.collect();
	field
		.trim()
		.parse()
		.map_or(Reading::NotAvailable, Reading::Value)
}

/// Decode the unit from a line printed by the balance.
///
/// The unit is the single character at position 11. An empty string is
/// returned if the line is too short or is not valid text.
///
/// ## Example
///
/// ```rust
/// use benchproto::balance::decode_unit;
///
/// assert_eq!(decode_unit(b"    +12.5  g  \r\n"), "g");
/// assert_eq!(decode_unit(b"short"), "");
/// ```
pub fn decode_unit(bytes: &[u8]) -> String {
	if bytes.len() <= UNIT_POSITION {
		return String::new();
	}
	match decode_text(bytes) {
		Ok(text) => text
			.chars()
			.nth(UNIT_POSITION)
			.map(|c| c.to_string().trim().to_string())
			.unwrap_or_default(),
		Err(err) => {
			log::warn!("{err}");
			String::new()
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn short_layout() {
		assert_eq!(decode_reading(b"  123.45   g    "), Reading::Value(123.45));
		assert_eq!(decode_reading(b"-    0.013 g  \r\n"), Reading::Value(-0.013));
		assert_eq!(decode_reading(b"+ 1 234.5  g  \r\n"), Reading::Value(1234.5));
	}

	#[test]
	fn prefixed_layout() {
		assert_eq!(
			decode_reading(b"G     +    250.00 g  \r\n"),
			Reading::Value(250.0)
		);
		// Clamped to the end of a short line.
		assert_eq!(decode_reading(b"Net   -3.5\r\n"), Reading::Value(-3.5));
	}

	#[test]
	fn unreadable_lines() {
		assert_eq!(decode_reading(b""), Reading::NotAvailable);
		assert_eq!(decode_reading(b"\r\n"), Reading::NotAvailable);
		assert_eq!(decode_reading(b"  Low      g    "), Reading::NotAvailable);
		assert_eq!(decode_reading(b"G     +  250.00 \xff \r\n"), Reading::NotAvailable);
	}

	#[test]
	fn units() {
		assert_eq!(decode_unit(b"    +12.5  g  \r\n"), "g");
		assert_eq!(decode_unit(b"    +12.5     \r\n"), "");
		assert_eq!(decode_unit(b"    +12.5  "), "");
		assert_eq!(decode_unit(b"    +12.5  \xff\r\n"), "");
	}

	#[test]
	fn reading_display() {
		assert_eq!(Reading::Value(12.5).to_string(), "12.5");
		assert_eq!(Reading::NotAvailable.to_string(), "NA");
		assert_eq!(Reading::Value(1.0).value(), Some(1.0));
		assert!(!Reading::NotAvailable.is_available());
	}
}
