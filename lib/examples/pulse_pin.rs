// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of pulsing a single pin.

use anyhow::Context;
use parpin::pin::Pins;
use parpin::port::Port;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // acquire the port and drive the pin high
    let mut port = Port::builder()
        .at_address(0x378)
        .open()
        .context("unable to open port at 0x378")?;
    port.output_mode(Pins::DATA)?;
    port.set_pin(Pins::PIN03)?;

    // some time later
    thread::sleep(Duration::from_millis(500));
    // change the level...
    port.clear_pin(Pins::PIN03)?;

    Ok(())
}
