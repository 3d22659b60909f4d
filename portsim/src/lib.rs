// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for simulating a PC parallel port in memory, to test pin control
//! software without hardware.
//!
//! A [`Sim`] implements [`Registers`] with the electrical behaviour of a
//! standard parallel port, including the inverted lines.
//! Clones share the same port, so a test can hand one clone to the code under
//! test and use another to inspect pin levels and drive inputs.
//!
//! Pull state models the outside world connected to the port.
//! Unconnected inputs float high.
//!
//! [`Registers`]: parport_uapi::Registers

use parport_uapi::{Control, Register, Registers, Status};
use std::sync::{Arc, Mutex, MutexGuard};

/// The number of the pin on the connector.
pub type PinNumber = u8;

/// The electrical level of a pin.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(b: bool) -> Self {
        if b {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// The location of a pin's bit in the port registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Wiring {
    Data(u8),
    Status(u8),
    Control(u8),
}

fn wiring(pin: PinNumber) -> Result<Wiring> {
    Ok(match pin {
        1 => Wiring::Control(Control::STROBE.bits()),
        2..=9 => Wiring::Data(1 << (pin - 2)),
        10 => Wiring::Status(Status::ACK.bits()),
        11 => Wiring::Status(Status::BUSY.bits()),
        12 => Wiring::Status(Status::PAPER_OUT.bits()),
        13 => Wiring::Status(Status::SELECT.bits()),
        14 => Wiring::Control(Control::AUTO_FEED.bits()),
        15 => Wiring::Status(Status::ERROR.bits()),
        16 => Wiring::Control(Control::INIT.bits()),
        17 => Wiring::Control(Control::SELECT_IN.bits()),
        _ => return Err(Error::InvalidPin(pin)),
    })
}

#[derive(Debug, Default)]
struct Port {
    // latched register values, as last written
    data: u8,
    control: u8,

    // external pulls, as register masks of lines pulled low
    data_pulled_low: u8,
    status_pulled_low: u8,
    control_pulled_low: u8,

    writes: usize,
}

impl Port {
    fn reverse(&self) -> bool {
        self.control & Control::REVERSE.bits() != 0
    }

    fn data_levels(&self) -> u8 {
        if self.reverse() {
            !self.data_pulled_low
        } else {
            self.data
        }
    }

    fn status_levels(&self) -> u8 {
        !self.status_pulled_low & Status::all().bits()
    }

    // open collector, so either end may pull a line low
    fn control_levels(&self) -> u8 {
        let driven = self.control ^ INVERTED_CONTROL;
        driven & !self.control_pulled_low & CONTROL_LINES
    }

    fn level(&self, pin: PinNumber) -> Result<Level> {
        let high = match wiring(pin)? {
            Wiring::Data(bit) => self.data_levels() & bit != 0,
            Wiring::Status(bit) => self.status_levels() & bit != 0,
            Wiring::Control(bit) => self.control_levels() & bit != 0,
        };
        Ok(high.into())
    }
}

const CONTROL_LINES: u8 = 0x0f;
const INVERTED_CONTROL: u8 = Control::STROBE.bits()
    | Control::AUTO_FEED.bits()
    | Control::SELECT_IN.bits();
const INVERTED_STATUS: u8 = Status::BUSY.bits();

/// A simulated parallel port.
#[derive(Clone, Debug, Default)]
pub struct Sim {
    port: Arc<Mutex<Port>>,
}

impl Sim {
    /// A port with all registers cleared, as at power on.
    pub fn new() -> Sim {
        Sim::default()
    }

    fn port(&self) -> MutexGuard<'_, Port> {
        // a panic while holding the lock can only come from a failed test assertion
        match self.port.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Pull a pin to simulate the pin being externally driven.
    ///
    /// Data pins only follow the pull while the port is reversed.
    pub fn set_pull(&self, pin: PinNumber, pull: Level) -> Result<()> {
        let mut port = self.port();
        let (mask, bit) = match wiring(pin)? {
            Wiring::Data(bit) => (&mut port.data_pulled_low, bit),
            Wiring::Status(bit) => (&mut port.status_pulled_low, bit),
            Wiring::Control(bit) => (&mut port.control_pulled_low, bit),
        };
        match pull {
            Level::Low => *mask |= bit,
            Level::High => *mask &= !bit,
        }
        Ok(())
    }

    /// Pull a pin up to simulate the pin being externally driven high.
    pub fn pullup(&self, pin: PinNumber) -> Result<()> {
        self.set_pull(pin, Level::High)
    }

    /// Pull a pin down to simulate the pin being externally driven low.
    pub fn pulldown(&self, pin: PinNumber) -> Result<()> {
        self.set_pull(pin, Level::Low)
    }

    /// Get the current state of the simulated external pull on a pin.
    pub fn get_pull(&self, pin: PinNumber) -> Result<Level> {
        let port = self.port();
        let low = match wiring(pin)? {
            Wiring::Data(bit) => port.data_pulled_low & bit,
            Wiring::Status(bit) => port.status_pulled_low & bit,
            Wiring::Control(bit) => port.control_pulled_low & bit,
        };
        Ok((low == 0).into())
    }

    /// Get the current electrical level of a pin.
    pub fn get_level(&self, pin: PinNumber) -> Result<Level> {
        self.port().level(pin)
    }

    /// The value last written to a register.
    ///
    /// The status register is never written so returns the value the port would read.
    pub fn latched(&self, reg: Register) -> u8 {
        let port = self.port();
        match reg {
            Register::Data => port.data,
            Register::Status => port.status_levels() ^ INVERTED_STATUS,
            Register::Control => port.control,
        }
    }

    /// The number of register writes performed on the port.
    pub fn writes(&self) -> usize {
        self.port().writes
    }

    /// Reset the count of register writes.
    pub fn clear_writes(&self) {
        self.port().writes = 0;
    }
}

impl Registers for Sim {
    fn read(&self, reg: Register) -> parport_uapi::Result<u8> {
        let port = self.port();
        Ok(match reg {
            Register::Data => port.data_levels(),
            Register::Status => port.status_levels() ^ INVERTED_STATUS,
            Register::Control => {
                (port.control_levels() ^ INVERTED_CONTROL) | (port.control & !CONTROL_LINES)
            }
        })
    }

    fn write(&self, reg: Register, value: u8) -> parport_uapi::Result<()> {
        let mut port = self.port();
        match reg {
            Register::Data => port.data = value,
            Register::Status => return Err(parport_uapi::Error::ReadOnly(reg)),
            Register::Control => port.control = value,
        }
        port.writes += 1;
        Ok(())
    }
}

/// Start building a parallel port simulator.
pub fn builder() -> Builder {
    Builder::default()
}

/// A builder of port simulators with initial register and pull state.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    data: u8,
    control: u8,
    pulldowns: Vec<PinNumber>,
}

impl Builder {
    /// Set the initial value of the data register.
    pub fn with_data(&mut self, data: u8) -> &mut Self {
        self.data = data;
        self
    }

    /// Set the initial value of the control register.
    pub fn with_control(&mut self, control: u8) -> &mut Self {
        self.control = control;
        self
    }

    /// Pull a pin low from the start.
    pub fn with_pulldown(&mut self, pin: PinNumber) -> &mut Self {
        self.pulldowns.push(pin);
        self
    }

    /// Build the simulator.
    pub fn build(&self) -> Result<Sim> {
        let sim = Sim {
            port: Arc::new(Mutex::new(Port {
                data: self.data,
                control: self.control,
                ..Default::default()
            })),
        };
        for pin in &self.pulldowns {
            sim.pulldown(*pin)?;
        }
        Ok(sim)
    }
}

/// The result for [`portsim`] functions.
///
/// [`portsim`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`portsim`] functions.
///
/// [`portsim`]: crate
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// The pin is not a signal pin on the connector.
    #[error("pin {0} is not a signal pin")]
    InvalidPin(PinNumber),
}
