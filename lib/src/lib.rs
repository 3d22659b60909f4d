// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for controlling the pins of a PC parallel port on Linux platforms.
//!
//! The signal pins are identified using the [`pin`] module.
//!
//! A port is acquired and its pins manipulated using the [`port`] module.
//!
//! To drive pin 3 high:
//! ```no_run
//! # use parpin::Result;
//! use parpin::pin::Pins;
//! use parpin::port::Port;
//!
//! # fn main() -> Result<()> {
//! let mut port = Port::builder().at_address(0x378).open()?;
//! port.output_mode(Pins::DATA)?;
//! port.set_pin(Pins::PIN03)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`pin`]: module@pin
//! [`port`]: module@port

#[cfg(not(any(feature = "dev_port", feature = "ppdev")))]
compile_error!("Either feature \"dev_port\" or \"ppdev\" must be enabled for this crate.");

use parport_uapi as uapi;
use std::path::PathBuf;

/// Types identifying pins and sets of pins.
pub mod pin;

/// Types and functions to acquire a port and control its pins.
///
/// The [`Builder`] acquires the [`Port`], which may be accessed through
/// `/dev/port` or the Linux `ppdev` driver, as selected by the [`Backend`].
///
/// [`Backend`]: enum.Backend.html
/// [`Builder`]: struct.Builder.html
/// [`Port`]: struct.Port.html
pub mod port;

pub use uapi::Register;

/// Errors returned by [`parpin`] functions.
///
/// [`parpin`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation requires output capable pins.
    #[error("{0} can only be used as input")]
    InputOnly(pin::Pins),

    /// The data pins can only change direction together.
    #[error("data pins must change direction as a group, not just {0}")]
    PartialDataGroup(pin::Pins),

    /// The value does not identify a signal pin.
    #[error("'{0}' is not a signal pin")]
    InvalidPin(String),

    /// The backend was not enabled when the library was built.
    #[error("the {0} backend is not supported by the library")]
    UnsupportedBackend(port::Backend),

    /// The port could not be acquired.
    #[error("unable to acquire parallel port \"{0}\"")]
    Port(PathBuf, #[source] uapi::Error),

    /// Accessing a port register failed.
    #[error("{0} register access failed")]
    Register(Register, #[source] uapi::Error),
}

/// The result for [`parpin`] functions.
///
/// [`parpin`]: crate
pub type Result<T> = std::result::Result<T, Error>;
