// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::pin::{self, Level, Pins};
use crate::{Error, Result};
#[cfg(feature = "dev_port")]
use parport_uapi::dev_port::DevPort;
#[cfg(feature = "ppdev")]
use parport_uapi::ppdev::Ppdev;
use parport_uapi::{Control, Register, Registers, Status};
use std::fmt;
use std::path::{Path, PathBuf};

/// The I/O base address of the port on a common PCI parallel port card.
pub const DEFAULT_ADDRESS: u64 = 0xe400;

/// The mechanism used to reach the port registers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Backend {
    /// Raw port I/O through `/dev/port`.
    #[default]
    DevPort,

    /// The Linux `ppdev` driver.
    Ppdev,
}

impl Backend {
    /// The device used by the backend unless another is specified.
    pub fn default_device(self) -> &'static str {
        match self {
            Backend::DevPort => "/dev/port",
            Backend::Ppdev => "/dev/parport0",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::DevPort => write!(f, "dev-port"),
            Backend::Ppdev => write!(f, "ppdev"),
        }
    }
}

/// A builder of [`Port`]s.
///
/// ```no_run
/// # use parpin::Result;
/// use parpin::port::{Backend, Port};
///
/// # fn main() -> Result<()> {
/// let port = Port::builder()
///     .with_backend(Backend::Ppdev)
///     .on_device("/dev/parport1")
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Builder {
    backend: Backend,
    device: Option<PathBuf>,
    address: u64,
    exclusive: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            backend: Backend::default(),
            device: None,
            address: DEFAULT_ADDRESS,
            exclusive: false,
        }
    }
}

impl Builder {
    /// Select the mechanism used to access the port.
    pub fn with_backend(&mut self, backend: Backend) -> &mut Self {
        self.backend = backend;
        self
    }

    /// Select the device file used by the backend.
    ///
    /// Defaults to [`Backend::default_device`].
    pub fn on_device<P: AsRef<Path>>(&mut self, device: P) -> &mut Self {
        self.device = Some(device.as_ref().to_path_buf());
        self
    }

    /// Select the I/O base address of the port.
    ///
    /// Only relevant to the [`Backend::DevPort`] backend, as ppdev devices
    /// identify the port by the device.
    pub fn at_address(&mut self, address: u64) -> &mut Self {
        self.address = address;
        self
    }

    /// Request exclusive access to the port.
    ///
    /// Only relevant to the [`Backend::Ppdev`] backend, where it prevents other
    /// drivers sharing the port while it is claimed.
    pub fn with_exclusive(&mut self, exclusive: bool) -> &mut Self {
        self.exclusive = exclusive;
        self
    }

    /// The device the port will be opened on.
    pub fn device(&self) -> PathBuf {
        match &self.device {
            Some(d) => d.clone(),
            None => PathBuf::from(self.backend.default_device()),
        }
    }

    /// Acquire the port.
    ///
    /// The port is released when the returned [`Port`] is dropped.
    pub fn open(&self) -> Result<Port> {
        let device = self.device();
        let regs: Box<dyn Registers + Send> = match self.backend {
            #[cfg(feature = "dev_port")]
            Backend::DevPort => Box::new(
                DevPort::open(&device, self.address).map_err(|e| Error::Port(device.clone(), e))?,
            ),
            #[cfg(feature = "ppdev")]
            Backend::Ppdev => {
                let p = if self.exclusive {
                    Ppdev::open_exclusive(&device)
                } else {
                    Ppdev::open(&device)
                };
                Box::new(p.map_err(|e| Error::Port(device.clone(), e))?)
            }
            #[allow(unreachable_patterns)]
            b => return Err(Error::UnsupportedBackend(b)),
        };
        let name = match self.backend {
            Backend::DevPort => format!("{}@{:#x}", device.display(), self.address),
            Backend::Ppdev => device.display().to_string(),
        };
        Port::with_name(regs, name)
    }
}

/// A parallel port acquired for pin control.
///
/// Holds shadow copies of the data and control registers, so individual pins
/// can be changed without disturbing the others.
///
/// All levels are electrical levels on the connector, so the lines inverted by
/// the port hardware need no special treatment by the caller.
pub struct Port {
    regs: Box<dyn Registers + Send>,
    name: String,

    // shadows of the raw data and control registers
    data: u8,
    control: Control,

    // output capable pins currently configured as inputs
    inputs: Pins,
}

// control bits that are meaningful on a standard port
const CONTROL_MASK: u8 = 0x3f;

impl Port {
    /// Start building a new port.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Wrap an existing register interface, such as a simulator.
    pub fn from_registers<R: Registers + Send + 'static>(regs: R) -> Result<Port> {
        Self::with_name(Box::new(regs), String::from("registers"))
    }

    fn with_name(regs: Box<dyn Registers + Send>, name: String) -> Result<Port> {
        let data = regs
            .read(Register::Data)
            .map_err(|e| Error::Register(Register::Data, e))?;
        let raw = regs
            .read(Register::Control)
            .map_err(|e| Error::Register(Register::Control, e))?;
        let control = Control::from_bits_retain(raw & CONTROL_MASK);
        let inputs = if control.contains(Control::REVERSE) {
            Pins::DATA
        } else {
            Pins::empty()
        };
        tracing::debug!(port = %name, data, control = control.bits(), "acquired parallel port");
        Ok(Port {
            regs,
            name,
            data,
            control,
            inputs,
        })
    }

    /// A description of the port, identifying the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The output capable pins currently configured as inputs.
    ///
    /// Status pins are always inputs so are not included.
    pub fn inputs(&self) -> Pins {
        self.inputs
    }

    /// Configure pins as outputs.
    ///
    /// The data pins can only change direction as a group, so the set must contain
    /// all of them or none.
    /// Status pins cannot be outputs.
    pub fn output_mode(&mut self, pins: Pins) -> Result<()> {
        check_output_capable(pins)?;
        let data = check_data_group(pins)?;
        if data && self.control.contains(Control::REVERSE) {
            self.write_control(self.control - Control::REVERSE)?;
        }
        self.inputs -= pins & Pins::OUTPUT_CAPABLE;
        tracing::debug!(port = %self.name, %pins, "output mode");
        Ok(())
    }

    /// Configure pins as inputs.
    ///
    /// The data pins can only change direction as a group, so the set must contain
    /// all of them or none.
    /// Switchable pins are driven high, so external devices can pull them low.
    /// Status pins are always inputs.
    pub fn input_mode(&mut self, pins: Pins) -> Result<()> {
        let data = check_data_group(pins)?;
        let mut control = self.control;
        if data {
            control |= Control::REVERSE;
        }
        let switchable = pins & Pins::SWITCHABLE;
        if !switchable.is_empty() {
            control = drive_control(control, switchable, Level::High);
        }
        if control != self.control {
            self.write_control(control)?;
        }
        self.inputs |= pins & Pins::OUTPUT_CAPABLE;
        tracing::debug!(port = %self.name, %pins, "input mode");
        Ok(())
    }

    /// Drive pins high.
    pub fn set_pin(&mut self, pins: Pins) -> Result<()> {
        self.change_pin(pins, Level::High)
    }

    /// Drive pins low.
    pub fn clear_pin(&mut self, pins: Pins) -> Result<()> {
        self.change_pin(pins, Level::Low)
    }

    /// Drive pins to the given level.
    ///
    /// Only the registers containing the pins are written.
    pub fn change_pin(&mut self, pins: Pins, level: Level) -> Result<()> {
        check_output_capable(pins)?;
        let bits = pin::data_bits(pins);
        if bits != 0 {
            let data = match level {
                Level::High => self.data | bits,
                Level::Low => self.data & !bits,
            };
            self.write_data(data)?;
        }
        let switchable = pins & Pins::SWITCHABLE;
        if !switchable.is_empty() {
            self.write_control(drive_control(self.control, switchable, level))?;
        }
        Ok(())
    }

    /// Read the levels of pins.
    ///
    /// Returns the subset of `pins` that are high.
    /// Only the registers containing the pins are read.
    pub fn pin_is_set(&self, pins: Pins) -> Result<Pins> {
        let mut high = Pins::empty();
        if pins.intersects(Pins::DATA) {
            high |= pin::data_pins(self.read(Register::Data)?);
        }
        if pins.intersects(Pins::STATUS) {
            high |= pin::status_levels(Status::from_bits_retain(self.read(Register::Status)?));
        }
        if pins.intersects(Pins::SWITCHABLE) {
            high |= pin::control_levels(Control::from_bits_retain(self.read(Register::Control)?));
        }
        Ok(high & pins)
    }

    /// The level of all signal pins.
    pub fn levels(&self) -> Result<Pins> {
        self.pin_is_set(Pins::SIGNALS)
    }

    fn read(&self, reg: Register) -> Result<u8> {
        self.regs.read(reg).map_err(|e| Error::Register(reg, e))
    }

    fn write_data(&mut self, data: u8) -> Result<()> {
        tracing::trace!(port = %self.name, data, "write data");
        self.regs
            .write(Register::Data, data)
            .map_err(|e| Error::Register(Register::Data, e))?;
        self.data = data;
        Ok(())
    }

    fn write_control(&mut self, control: Control) -> Result<()> {
        tracing::trace!(port = %self.name, control = control.bits(), "write control");
        self.regs
            .write(Register::Control, control.bits())
            .map_err(|e| Error::Register(Register::Control, e))?;
        self.control = control;
        Ok(())
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("control", &self.control)
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        tracing::debug!(port = %self.name, "released parallel port");
    }
}

fn check_output_capable(pins: Pins) -> Result<()> {
    let status = pins & Pins::STATUS;
    if status.is_empty() {
        Ok(())
    } else {
        Err(Error::InputOnly(status))
    }
}

// returns true if the set contains the data group
fn check_data_group(pins: Pins) -> Result<bool> {
    let data = pins & Pins::DATA;
    if data.is_empty() {
        Ok(false)
    } else if data == Pins::DATA {
        Ok(true)
    } else {
        Err(Error::PartialDataGroup(data))
    }
}

fn drive_control(control: Control, pins: Pins, level: Level) -> Control {
    let bits = pin::control_bits(pins);
    let mut levels = control ^ pin::INVERTED_CONTROL;
    match level {
        Level::High => levels |= bits,
        Level::Low => levels -= bits,
    }
    levels ^ pin::INVERTED_CONTROL
}
