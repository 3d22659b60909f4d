// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use anyhow::Result;
use clap::{Parser, ValueEnum};
use parpin::port::{Backend, Port};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// common helper functions

/// The exit status for any failure, -1 as seen by the shell.
pub fn exit_invalid() -> ExitCode {
    ExitCode::from(255)
}

pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a subscriber may already be installed when run from tests
    _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn emit_error(verbose: bool, e: &anyhow::Error) {
    eprintln!("{}", format_error(verbose, e));
}

pub fn format_error(verbose: bool, e: &anyhow::Error) -> String {
    if verbose {
        format!("{e:#}")
    } else {
        format!("{e}")
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseAddressError {
    #[error("'{0}' must start with a digit")]
    NoDigits(String),
    #[error("'{0}' {1}")]
    ParseDigits(String, std::num::ParseIntError),
}

/// Parse an I/O address, in decimal or with a 0x prefix in hex.
pub fn parse_address(s: &str) -> std::result::Result<u64, ParseAddressError> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    if !digits.starts_with(|c: char| c.is_digit(radix)) {
        return Err(ParseAddressError::NoDigits(s.into()));
    }
    u64::from_str_radix(digits, radix).map_err(|e| ParseAddressError::ParseDigits(s.into(), e))
}

// common command line parser options

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum BackendFlags {
    #[default]
    DevPort,
    Ppdev,
}
impl From<BackendFlags> for Backend {
    fn from(b: BackendFlags) -> Self {
        match b {
            BackendFlags::DevPort => Backend::DevPort,
            BackendFlags::Ppdev => Backend::Ppdev,
        }
    }
}

#[derive(Clone, Debug, Parser)]
/// Options to control the selection of the port.
pub struct PortOpts {
    /// The I/O base address of the port
    ///
    /// Only used by the dev-port backend.
    /// The address may be decimal or hex with a 0x prefix.
    #[arg(
        long,
        value_name = "address",
        env = "PARPIN_ADDRESS",
        value_parser = parse_address,
        default_value = "0xe400",
        display_order = 700
    )]
    pub address: u64,

    /// How the port registers are accessed
    #[arg(
        long,
        value_name = "backend",
        env = "PARPIN_BACKEND",
        value_enum,
        default_value_t = BackendFlags::DevPort,
        ignore_case = true,
        display_order = 701
    )]
    pub backend: BackendFlags,

    /// The device used to access the port
    ///
    /// Defaults to /dev/port for dev-port and /dev/parport0 for ppdev.
    #[arg(long, value_name = "path", env = "PARPIN_DEVICE", display_order = 702)]
    pub device: Option<PathBuf>,

    /// Prevent other drivers sharing the port
    ///
    /// Only used by the ppdev backend.
    #[arg(long, display_order = 703)]
    pub exclusive: bool,
}

impl PortOpts {
    pub fn open(&self) -> Result<Port> {
        let mut builder = Port::builder();
        builder
            .with_backend(self.backend.into())
            .at_address(self.address)
            .with_exclusive(self.exclusive);
        if let Some(device) = &self.device {
            builder.on_device(device);
        }
        let port = builder.open()?;
        tracing::debug!(port = port.name(), backend = %Backend::from(self.backend), "opened port");
        Ok(port)
    }
}

/// Errors returned by cli functions.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    #[error("pin out of range")]
    PinOutOfRange(String),

    #[error("invalid sleep value")]
    InvalidSleep(String),
}
