// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading the status pins through ppdev.

use parpin::pin::Pins;
use parpin::port::{Backend, Port};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = Port::builder()
        .with_backend(Backend::Ppdev)
        .on_device("/dev/parport0")
        .open()?;

    let high = port.pin_is_set(Pins::STATUS)?;
    for pin in Pins::STATUS.pins() {
        let level = if high.contains(pin.into()) { "high" } else { "low" };
        println!("{pin}={level}");
    }

    Ok(())
}
