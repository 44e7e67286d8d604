//! Types for communicating with a Reglo ICC peristaltic pump.
//!
//! ## Communicating with the Pump
//!
//! All communication with the pump starts with a [`Pump`], opened on a serial
//! port:
//!
//! ```rust
//! # use benchproto::{error::PumpError, pump::Pump};
//! # fn wrapper() -> Result<(), PumpError> {
//! let mut pump = Pump::open_serial("/dev/ttyUSB0")?;
//! # Ok(())
//! # }
//! ```
//!
//! Every command addresses a single channel, numbered from 1. Channels outside
//! of the pump's range are rejected before anything is written to the port.
//!
//! ```rust
//! # use benchproto::{backend::Backend, pump::{Direction, Pump}};
//! # fn wrapper<B: Backend>(mut pump: Pump<B>) -> Result<(), Box<dyn std::error::Error>> {
//! pump.set_direction(1, Direction::CounterClockwise)?;
//! pump.set_speed(1, 24.5)?;
//! pump.start_channel(1)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Replies
//!
//! The pump's replies are not framed, so each command waits a short
//! [settle delay](Pump::set_settle_delay) and then returns whatever text has
//! arrived, which may be empty. The text is returned as-is; its meaning is left
//! to the caller.
//!
//! ## Requested State
//!
//! The pump cannot be asked for everything it was told, so the driver remembers
//! the direction, mode and speed most recently sent to each channel. See
//! [`requested_state`](Pump::requested_state).

pub mod command;
mod port;

pub use command::{Channel, Direction, Mode, Opcode};
pub use port::*;
