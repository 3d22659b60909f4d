// SPDX-FileCopyrightText: 2024 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::common::{Control, Error, Register, Registers, Result};
use libc::{c_int, c_uchar, ioctl};
use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::mem::size_of;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// The default ppdev device.
pub const DEFAULT_DEVICE: &str = "/dev/parport0";

pub(crate) const IOCTL_MAGIC: u8 = b'p';

#[repr(u8)]
enum Ioctl {
    ReadStatus = 0x81,
    ReadControl = 0x83,
    WriteControl = 0x84,
    ReadData = 0x85,
    WriteData = 0x86,
    Claim = 0x8b,
    Release = 0x8c,
    Exclusive = 0x8f,
    DataDir = 0x90,
}

// The control lines that ppdev passes through PPWCONTROL.
const CONTROL_LINES: u8 = 0x0f;

/// A parallel port claimed through the Linux `ppdev` driver.
///
/// The port is claimed when opened and released when dropped.
#[derive(Debug)]
pub struct Ppdev {
    f: File,
    // ppdev manages the data direction separately from the control lines.
    reverse: Cell<bool>,
}

impl Ppdev {
    /// Open and claim a ppdev device, such as `/dev/parport0`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Ppdev> {
        Self::open_with(path, false)
    }

    /// Open and claim a ppdev device, preventing other drivers sharing the port.
    pub fn open_exclusive<P: AsRef<Path>>(path: P) -> Result<Ppdev> {
        Self::open_with(path, true)
    }

    fn open_with<P: AsRef<Path>>(path: P, exclusive: bool) -> Result<Ppdev> {
        let f = OpenOptions::new().read(true).write(true).open(path)?;
        let p = Ppdev {
            f,
            reverse: Cell::new(false),
        };
        if exclusive {
            p.ioctl_none(nix::request_code_none!(IOCTL_MAGIC, Ioctl::Exclusive))?;
        }
        p.ioctl_none(nix::request_code_none!(IOCTL_MAGIC, Ioctl::Claim))?;
        Ok(p)
    }

    fn ioctl_none(&self, code: nix::sys::ioctl::ioctl_num_type) -> Result<()> {
        // SAFETY: the request takes no argument.
        match unsafe { ioctl(self.f.as_raw_fd(), code) } {
            0 => Ok(()),
            _ => Err(Error::from_errno()),
        }
    }

    fn read_u8(&self, ioc: Ioctl) -> Result<u8> {
        let mut value: c_uchar = 0;
        // SAFETY: value is a valid destination for the single byte returned.
        match unsafe {
            ioctl(
                self.f.as_raw_fd(),
                nix::request_code_read!(IOCTL_MAGIC, ioc, size_of::<c_uchar>()),
                &mut value,
            )
        } {
            0 => Ok(value),
            _ => Err(Error::from_errno()),
        }
    }

    fn write_u8(&self, ioc: Ioctl, value: u8) -> Result<()> {
        let value: c_uchar = value;
        // SAFETY: value is not modified.
        match unsafe {
            ioctl(
                self.f.as_raw_fd(),
                nix::request_code_write!(IOCTL_MAGIC, ioc, size_of::<c_uchar>()),
                &value,
            )
        } {
            0 => Ok(()),
            _ => Err(Error::from_errno()),
        }
    }

    fn set_data_dir(&self, reverse: bool) -> Result<()> {
        let dir: c_int = reverse.into();
        // SAFETY: dir is not modified.
        match unsafe {
            ioctl(
                self.f.as_raw_fd(),
                nix::request_code_write!(IOCTL_MAGIC, Ioctl::DataDir, size_of::<c_int>()),
                &dir,
            )
        } {
            0 => {
                self.reverse.set(reverse);
                Ok(())
            }
            _ => Err(Error::from_errno()),
        }
    }
}

impl Registers for Ppdev {
    fn read(&self, reg: Register) -> Result<u8> {
        match reg {
            Register::Data => self.read_u8(Ioctl::ReadData),
            Register::Status => self.read_u8(Ioctl::ReadStatus),
            Register::Control => {
                let mut ctrl = self.read_u8(Ioctl::ReadControl)? & CONTROL_LINES;
                if self.reverse.get() {
                    ctrl |= Control::REVERSE.bits();
                }
                Ok(ctrl)
            }
        }
    }

    fn write(&self, reg: Register, value: u8) -> Result<()> {
        match reg {
            Register::Data => self.write_u8(Ioctl::WriteData, value),
            Register::Status => Err(Error::ReadOnly(reg)),
            Register::Control => {
                let reverse = Control::from_bits_retain(value).contains(Control::REVERSE);
                if reverse != self.reverse.get() {
                    self.set_data_dir(reverse)?;
                }
                self.write_u8(Ioctl::WriteControl, value & CONTROL_LINES)
            }
        }
    }
}

impl Drop for Ppdev {
    fn drop(&mut self) {
        _ = self.ioctl_none(nix::request_code_none!(IOCTL_MAGIC, Ioctl::Release));
    }
}
