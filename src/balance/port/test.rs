use std::{io, time::Duration};

use crate::{
	balance::{Balance, Diagnostic, Reading},
	error::*,
};

const READING_REQUEST: &[u8] = b"\x1bP\n";

#[test]
fn read_value_requests_a_reading_when_nothing_is_waiting() {
	let mut balance = Balance::open_mock();
	balance.backend_mut().reply_on_write(b"    +12.5  g  \r\n");
	assert_eq!(balance.read_value().unwrap(), Reading::Value(12.5));
	assert_eq!(balance.backend().written(), READING_REQUEST);
}

#[test]
fn read_value_uses_waiting_line_without_requesting() {
	let mut balance = Balance::open_mock();
	balance.backend_mut().append_data(b"    +12.5  g  \r\n    +13.0  g  \r\n");
	assert_eq!(balance.read_value().unwrap(), Reading::Value(12.5));
	assert_eq!(balance.read_value().unwrap(), Reading::Value(13.0));
	assert!(balance.backend().written().is_empty());
}

#[test]
fn read_value_prefixed_layout() {
	let mut balance = Balance::open_mock();
	balance
		.backend_mut()
		.reply_on_write(b"G     +    250.00 g  \r\n");
	assert_eq!(balance.read_value().unwrap(), Reading::Value(250.0));
}

#[test]
fn unreadable_values_are_not_available() {
	let mut balance = Balance::open_mock();
	// No reply before the timeout
	assert_eq!(balance.read_value().unwrap(), Reading::NotAvailable);

	balance.backend_mut().reply_on_write(b"  Low      g  \r\n");
	assert_eq!(balance.read_value().unwrap(), Reading::NotAvailable);

	balance.backend_mut().reply_on_write(b"    +12\xff5  g  \r\n");
	assert_eq!(balance.read_value().unwrap(), Reading::NotAvailable);
}

#[test]
fn read_unit_always_requests_a_reading() {
	let mut balance = Balance::open_mock();
	balance.backend_mut().reply_on_write(b"    +12.5  g  \r\n");
	assert_eq!(balance.read_unit().unwrap(), "g");
	assert_eq!(balance.backend().written(), READING_REQUEST);

	// No reply
	assert_eq!(balance.read_unit().unwrap(), "");
}

#[test]
fn tare_and_zero_only_write() {
	let mut balance = Balance::open_mock();
	balance.tare_and_zero().unwrap();
	balance.tare().unwrap();
	balance.zero().unwrap();
	assert_eq!(balance.backend().written(), b"\x1bT\n\x1bU\n\x1bV\n");
}

#[test]
fn link_errors_are_reported() {
	let mut balance = Balance::open_mock();
	balance
		.backend_mut()
		.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));
	let err = balance.tare().unwrap_err();
	assert!(matches!(err, BalanceError::LinkUnavailable(_)), "{err:?}");

	balance
		.backend_mut()
		.bytes_to_read_error(Some(io::Error::other("port closed")));
	let err = balance.read_value().unwrap_err();
	assert!(matches!(err, BalanceError::Io(_)), "{err:?}");
}

#[test]
fn diagnostic_probe_reports_reply() {
	let mut balance = Balance::open_mock();
	balance.backend_mut().append_data(b"x");
	balance.backend_mut().reply_on_write(b"\r\nREADY\r\n");
	// The stale byte is read as part of the first line.
	assert_eq!(
		balance.diagnostic_probe(),
		Diagnostic::Response {
			bytes_waiting: 1,
			raw: b"x\r\n".to_vec(),
			text: "x\r\n".to_string(),
		}
	);
	assert_eq!(balance.backend().written(), b"\x1bQ\r");
}

#[test]
fn diagnostic_probe_decodes_lossily() {
	let mut balance = Balance::open_mock();
	balance.backend_mut().reply_on_write(b"OK\xff\n");
	match balance.diagnostic_probe() {
		Diagnostic::Response {
			bytes_waiting,
			raw,
			text,
		} => {
			assert_eq!(bytes_waiting, 0);
			assert_eq!(raw, b"OK\xff\n");
			assert_eq!(text, "OK\u{fffd}\n");
		}
		other => panic!("unexpected diagnostic {other:?}"),
	}
}

#[test]
fn diagnostic_probe_captures_failures() {
	let mut balance = Balance::open_mock();
	balance
		.backend_mut()
		.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));
	match balance.diagnostic_probe() {
		Diagnostic::Failed(message) => assert!(message.contains("unplugged"), "{message}"),
		other => panic!("unexpected diagnostic {other:?}"),
	}
	// The balance is still usable afterwards.
	balance.tare().unwrap();
}

#[test]
fn timeout_guard_restores_timeout() {
	let mut balance = Balance::open_mock();
	balance
		.set_read_timeout(Some(Duration::from_millis(500)))
		.unwrap();
	{
		let mut guard = balance.timeout_guard(None).unwrap();
		assert_eq!(guard.read_timeout().unwrap(), None);
		guard.backend_mut().reply_on_write(b"    +12.5  g  \r\n");
		assert_eq!(guard.read_value().unwrap(), Reading::Value(12.5));
	}
	assert_eq!(
		balance.read_timeout().unwrap(),
		Some(Duration::from_millis(500))
	);
}

#[test]
fn timeout_guard_poisons_driver_when_reset_fails() {
	let mut balance = Balance::open_mock();
	{
		let mut guard = balance
			.timeout_guard(Some(Duration::from_secs(2)))
			.unwrap();
		guard
			.backend_mut()
			.set_read_timeout_error(Some(io::Error::other("oops")));
	}
	let err = balance.read_unit().unwrap_err();
	assert!(matches!(err, BalanceError::Io(_)), "{err:?}");
	assert!(err.to_string().contains("failed to reset timeout"), "{err}");
	assert!(balance.backend().written().is_empty());
}
