//! A simple but easy to use library for communicating with a Reglo ICC
//! peristaltic pump and a Sartorius balance.
//!
//! Both instruments speak a plain ASCII dialect over a serial port, but the two
//! dialects share little beyond that. The [`pump`] uses channel-addressed
//! commands terminated by a carriage return, while the [`balance`] uses
//! escape-prefixed commands with no addressing at all. Each has its own driver
//! type built on a common [`Transport`](transport::Transport).

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(all(doc, feature = "doc_cfg"), feature(doc_cfg))]

pub mod backend;
#[cfg(feature = "balance")]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "balance")))]
pub mod balance;
pub mod error;
pub mod frame;
#[cfg(feature = "pump")]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "pump")))]
pub mod pump;
pub mod timeout_guard;
pub mod transport;

#[cfg(not(any(feature = "pump", feature = "balance")))]
compile_error!("At least one of the `pump` or `balance` features must be specified");
