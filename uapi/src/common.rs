// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;
use std::fmt;
use std::io::Error as IoError;

/// The number of consecutive I/O addresses occupied by a standard parallel port.
pub const REGISTER_SPAN: u64 = 3;

/// The registers of a standard parallel port (SPP).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Register {
    /// The eight data lines, base + 0.
    Data = 0,
    /// The read-only status lines, base + 1.
    Status = 1,
    /// The control lines and port direction, base + 2.
    Control = 2,
}

impl Register {
    /// The offset of the register from the port base address.
    #[inline]
    pub fn offset(self) -> u64 {
        self as u64
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Data => write!(f, "data"),
            Register::Status => write!(f, "status"),
            Register::Control => write!(f, "control"),
        }
    }
}

bitflags! {
    /// Bits of the status register.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Status: u8 {
        /// nError, pin 15.
        const ERROR = 0x08;

        /// Select, pin 13.
        const SELECT = 0x10;

        /// Paper out, pin 12.
        const PAPER_OUT = 0x20;

        /// nAck, pin 10.
        const ACK = 0x40;

        /// Busy, pin 11.
        ///
        /// Inverted by the port hardware.
        const BUSY = 0x80;
    }
}

bitflags! {
    /// Bits of the control register.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Control: u8 {
        /// nStrobe, pin 1.
        ///
        /// Inverted by the port hardware.
        const STROBE = 0x01;

        /// nAutoFeed, pin 14.
        ///
        /// Inverted by the port hardware.
        const AUTO_FEED = 0x02;

        /// nInit, pin 16.
        const INIT = 0x04;

        /// nSelectIn, pin 17.
        ///
        /// Inverted by the port hardware.
        const SELECT_IN = 0x08;

        /// Enable the interrupt on the rising edge of nAck.
        const IRQ_ENABLE = 0x10;

        /// Tristate the data lines so they may be read as inputs.
        const REVERSE = 0x20;
    }
}

/// Access to the registers of a single parallel port.
///
/// Register values are the raw values seen by the port hardware, so
/// any hardware inversion is the concern of the caller.
pub trait Registers {
    /// Read the current value of a register.
    fn read(&self, reg: Register) -> Result<u8>;

    /// Write a value to a register.
    ///
    /// The status register is read-only.
    fn write(&self, reg: Register, value: u8) -> Result<()>;
}

impl<R: Registers + ?Sized> Registers for Box<R> {
    #[inline]
    fn read(&self, reg: Register) -> Result<u8> {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u8) -> Result<()> {
        (**self).write(reg, value)
    }
}

impl<R: Registers + ?Sized> Registers for &R {
    #[inline]
    fn read(&self, reg: Register) -> Result<u8> {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u8) -> Result<()> {
        (**self).write(reg, value)
    }
}

/// The result returned by [`parport_uapi`] functions.
///
/// [`parport_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`parport_uapi`] functions.
///
/// [`parport_uapi`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(#[from] IoError),

    /// An attempt to write a register that the hardware does not allow to be written.
    #[error("the {0} register is read-only")]
    ReadOnly(Register),

    /// The port registers would extend beyond the I/O address space.
    #[error("base address {0:#x} is outside the I/O address space")]
    InvalidAddress(u64),
}

impl Error {
    pub(crate) fn from_errno() -> Error {
        Error::Os(IoError::last_os_error())
    }
}
