//! Types for communicating with a Sartorius balance.
//!
//! ## Communicating with the Balance
//!
//! All communication with the balance starts with a [`Balance`], opened on a
//! serial port:
//!
//! ```rust
//! # use benchproto::{balance::Balance, error::BalanceError};
//! # fn wrapper() -> Result<(), BalanceError> {
//! let mut balance = Balance::open_serial("/dev/ttyUSB1")?;
//! balance.tare()?;
//! let reading = balance.read_value()?;
//! println!("{reading} {}", balance.read_unit()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Readings
//!
//! The balance prints each reading as a fixed width line whose layout depends
//! on how the balance's menu is configured. [`decode_reading`] understands both
//! the 16 character layout (menu code 7.1.1) and the wider layout with an
//! identifier prefix (menu code 7.1.2). A line that cannot be understood is
//! reported as [`Reading::NotAvailable`] rather than as an error.

pub mod command;
mod port;
pub mod reading;

pub use command::Opcode;
pub use port::*;
pub use reading::{decode_reading, decode_unit, Reading};
