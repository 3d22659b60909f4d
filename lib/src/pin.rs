// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
use bitflags::bitflags;
use parport_uapi::{Control, Status};
use std::fmt;
use std::str::FromStr;

/// A signal pin on the 25 pin parallel port connector.
///
/// Pins 18 to 25 are ground, so valid pins are 1 to 17.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pin(u8);

impl Pin {
    /// The lowest numbered signal pin.
    pub const MIN: u8 = 1;

    /// The highest numbered signal pin.
    pub const MAX: u8 = 17;

    /// Create a pin from its number on the connector.
    pub fn new(number: u8) -> Result<Pin> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Ok(Pin(number))
        } else {
            Err(Error::InvalidPin(number.to_string()))
        }
    }

    /// The number of the pin on the connector.
    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Pin {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        Pin::new(number)
    }
}

impl FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number = s
            .trim()
            .parse::<u8>()
            .map_err(|_| Error::InvalidPin(s.into()))?;
        Pin::new(number)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// A set of pins.
    ///
    /// Bit N corresponds to pin N, so single pin sets can be built from a [`Pin`]
    /// with `Pins::from(pin)`.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Pins: u32 {
        const PIN01 = 1 << 1;
        const PIN02 = 1 << 2;
        const PIN03 = 1 << 3;
        const PIN04 = 1 << 4;
        const PIN05 = 1 << 5;
        const PIN06 = 1 << 6;
        const PIN07 = 1 << 7;
        const PIN08 = 1 << 8;
        const PIN09 = 1 << 9;
        const PIN10 = 1 << 10;
        const PIN11 = 1 << 11;
        const PIN12 = 1 << 12;
        const PIN13 = 1 << 13;
        const PIN14 = 1 << 14;
        const PIN15 = 1 << 15;
        const PIN16 = 1 << 16;
        const PIN17 = 1 << 17;

        /// The eight data pins, 2 to 9.
        ///
        /// These change direction together.
        const DATA = Self::PIN02.bits()
            | Self::PIN03.bits()
            | Self::PIN04.bits()
            | Self::PIN05.bits()
            | Self::PIN06.bits()
            | Self::PIN07.bits()
            | Self::PIN08.bits()
            | Self::PIN09.bits();

        /// The open collector control pins, which may be inputs or outputs individually.
        const SWITCHABLE = Self::PIN01.bits()
            | Self::PIN14.bits()
            | Self::PIN16.bits()
            | Self::PIN17.bits();

        /// The input only status pins.
        const STATUS = Self::PIN10.bits()
            | Self::PIN11.bits()
            | Self::PIN12.bits()
            | Self::PIN13.bits()
            | Self::PIN15.bits();

        /// The pins which may be driven as outputs.
        const OUTPUT_CAPABLE = Self::DATA.bits() | Self::SWITCHABLE.bits();

        /// All signal pins.
        const SIGNALS = Self::OUTPUT_CAPABLE.bits() | Self::STATUS.bits();
    }
}

impl Pins {
    /// Iterate over the pins in the set, in pin order.
    pub fn pins(self) -> impl Iterator<Item = Pin> {
        (Pin::MIN..=Pin::MAX)
            .filter(move |n| self.bits() & (1 << n) != 0)
            .map(Pin)
    }
}

impl From<Pin> for Pins {
    fn from(pin: Pin) -> Self {
        Pins::from_bits_retain(1 << pin.0)
    }
}

impl FromIterator<Pin> for Pins {
    fn from_iter<I: IntoIterator<Item = Pin>>(iter: I) -> Self {
        iter.into_iter().fold(Pins::empty(), |acc, p| acc | p.into())
    }
}

impl fmt::Display for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.pins().map(|p| p.to_string()).collect();
        match numbers.len() {
            0 => write!(f, "no pins"),
            1 => write!(f, "pin {}", numbers[0]),
            _ => write!(f, "pins {}", numbers.join(",")),
        }
    }
}

/// The electrical level of a pin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Level {
    #[default]
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

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

// Mapping between pins and register bits.
//
// Register values are raw, so the inverted lines are flipped here and
// callers deal only in electrical levels.

const DATA_SHIFT: u32 = 2;

// control and status pins, with the register bit they occupy
const CONTROL_WIRING: [(Pins, Control); 4] = [
    (Pins::PIN01, Control::STROBE),
    (Pins::PIN14, Control::AUTO_FEED),
    (Pins::PIN16, Control::INIT),
    (Pins::PIN17, Control::SELECT_IN),
];
const STATUS_WIRING: [(Pins, Status); 5] = [
    (Pins::PIN10, Status::ACK),
    (Pins::PIN11, Status::BUSY),
    (Pins::PIN12, Status::PAPER_OUT),
    (Pins::PIN13, Status::SELECT),
    (Pins::PIN15, Status::ERROR),
];

/// The control lines inverted between register and connector.
pub(crate) const INVERTED_CONTROL: Control = Control::STROBE
    .union(Control::AUTO_FEED)
    .union(Control::SELECT_IN);

/// The status lines inverted between connector and register.
pub(crate) const INVERTED_STATUS: Status = Status::BUSY;

/// The data register bits for the data pins in the set.
pub(crate) fn data_bits(pins: Pins) -> u8 {
    ((pins & Pins::DATA).bits() >> DATA_SHIFT) as u8
}

/// The data pins corresponding to the data register bits.
pub(crate) fn data_pins(bits: u8) -> Pins {
    Pins::from_bits_retain(u32::from(bits) << DATA_SHIFT)
}

/// The control register bits for the switchable pins in the set.
pub(crate) fn control_bits(pins: Pins) -> Control {
    CONTROL_WIRING
        .iter()
        .filter(|(p, _)| pins.contains(*p))
        .fold(Control::empty(), |acc, (_, c)| acc | *c)
}

/// The switchable pins that are high given a raw control register value.
pub(crate) fn control_levels(raw: Control) -> Pins {
    let levels = raw ^ INVERTED_CONTROL;
    CONTROL_WIRING
        .iter()
        .filter(|(_, c)| levels.contains(*c))
        .fold(Pins::empty(), |acc, (p, _)| acc | *p)
}

/// The status pins that are high given a raw status register value.
pub(crate) fn status_levels(raw: Status) -> Pins {
    let levels = raw ^ INVERTED_STATUS;
    STATUS_WIRING
        .iter()
        .filter(|(_, s)| levels.contains(*s))
        .fold(Pins::empty(), |acc, (p, _)| acc | *p)
}
