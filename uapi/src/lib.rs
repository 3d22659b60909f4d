// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A thin but safe Rust layer around the Linux interfaces to PC parallel port registers.
//!
//! Two access paths are provided:
//!
//! * [`dev_port`] performs raw port I/O through `/dev/port`, the user space equivalent
//!   of `ioperm` followed by `inb`/`outb`.
//! * [`ppdev`] uses the Linux `ppdev` driver via `/dev/parportN`, which arbitrates
//!   access to the port with other kernel users.
//!
//! Both implement the [`Registers`] trait.

pub(crate) mod common;

pub use common::{Control, Error, Register, Registers, Result, Status, REGISTER_SPAN};

/// Raw port I/O through `/dev/port`.
///
/// Requires `CAP_SYS_RAWIO`, as `ioperm` does.
#[cfg(feature = "dev_port")]
pub mod dev_port;

/// Port access through the Linux `ppdev` driver.
#[cfg(feature = "ppdev")]
pub mod ppdev;
