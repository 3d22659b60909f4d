// SPDX-FileCopyrightText: 2024 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::common::{Error, Register, Registers, Result, REGISTER_SPAN};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

/// The default device providing raw access to the I/O address space.
pub const DEV_PORT: &str = "/dev/port";

/// The size of the x86 I/O address space.
const IO_SPACE_SIZE: u64 = 0x1_0000;

/// A parallel port accessed by raw I/O on a file mapping the I/O address space.
///
/// The byte at file offset N is I/O address N, so `/dev/port` gives the same
/// effect as `inb`/`outb` without requiring `ioperm`.
/// Any seekable file may be used in place of `/dev/port`, which is useful
/// for exercising code without hardware.
#[derive(Debug)]
pub struct DevPort {
    f: File,
    base: u64,
}

impl DevPort {
    /// Open the port with the given base address on the given device.
    ///
    /// * `path` - The device mapping the I/O address space, typically [`DEV_PORT`].
    /// * `base` - The I/O address of the data register.
    pub fn open<P: AsRef<Path>>(path: P, base: u64) -> Result<DevPort> {
        if base
            .checked_add(REGISTER_SPAN)
            .map_or(true, |end| end > IO_SPACE_SIZE)
        {
            return Err(Error::InvalidAddress(base));
        }
        let f = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(DevPort { f, base })
    }

    /// The I/O address of the data register.
    pub fn base(&self) -> u64 {
        self.base
    }
}

impl Registers for DevPort {
    fn read(&self, reg: Register) -> Result<u8> {
        let mut buf = [0_u8; 1];
        self.f.read_exact_at(&mut buf, self.base + reg.offset())?;
        Ok(buf[0])
    }

    fn write(&self, reg: Register, value: u8) -> Result<()> {
        if reg == Register::Status {
            return Err(Error::ReadOnly(reg));
        }
        self.f.write_all_at(&[value], self.base + reg.offset())?;
        Ok(())
    }
}
