// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use parport_uapi::{Control, Register, Registers, Status};
use portsim::{Error, Level, Sim};

#[test]
fn power_on_levels() {
    let s = Sim::new();
    for pin in 2..=9 {
        assert_eq!(s.get_level(pin), Ok(Level::Low), "data pin {pin}");
    }
    // inverted control lines
    assert_eq!(s.get_level(1), Ok(Level::High));
    assert_eq!(s.get_level(14), Ok(Level::High));
    assert_eq!(s.get_level(16), Ok(Level::Low));
    assert_eq!(s.get_level(17), Ok(Level::High));
    // floating inputs
    for pin in [10, 11, 12, 13, 15] {
        assert_eq!(s.get_level(pin), Ok(Level::High), "status pin {pin}");
    }
}

#[test]
fn invalid_pins() {
    let s = Sim::new();
    assert_eq!(s.get_level(0), Err(Error::InvalidPin(0)));
    assert_eq!(s.get_level(18), Err(Error::InvalidPin(18)));
    assert_eq!(s.pulldown(25), Err(Error::InvalidPin(25)));
    assert_eq!(
        Error::InvalidPin(20).to_string(),
        "pin 20 is not a signal pin"
    );
}

#[test]
fn data_register_drives_pins() {
    let s = Sim::new();
    s.write(Register::Data, 0b0000_0101).unwrap();
    assert_eq!(s.get_level(2), Ok(Level::High));
    assert_eq!(s.get_level(3), Ok(Level::Low));
    assert_eq!(s.get_level(4), Ok(Level::High));
    assert_eq!(s.read(Register::Data).unwrap(), 0b0000_0101);
    assert_eq!(s.latched(Register::Data), 0b0000_0101);
    assert_eq!(s.writes(), 1);
    s.clear_writes();
    assert_eq!(s.writes(), 0);
}

#[test]
fn reversed_data_follows_pulls() {
    let s = Sim::new();
    s.write(Register::Data, 0xff).unwrap();
    s.pulldown(5).unwrap();
    // outputs ignore pulls
    assert_eq!(s.get_level(5), Ok(Level::High));
    s.write(Register::Control, Control::REVERSE.bits()).unwrap();
    assert_eq!(s.get_level(5), Ok(Level::Low));
    assert_eq!(s.read(Register::Data).unwrap(), 0xf7);
    assert_eq!(s.latched(Register::Data), 0xff);
}

#[test]
fn status_register_inversion() {
    let s = Sim::new();
    // busy is inverted, so a floating busy reads as zero
    assert_eq!(
        s.read(Register::Status).unwrap(),
        (Status::all() - Status::BUSY).bits()
    );
    s.pulldown(11).unwrap();
    s.pulldown(10).unwrap();
    assert_eq!(s.get_level(11), Ok(Level::Low));
    assert_eq!(
        s.read(Register::Status).unwrap(),
        (Status::ERROR | Status::SELECT | Status::PAPER_OUT | Status::BUSY).bits()
    );
    assert_eq!(s.get_pull(10), Ok(Level::Low));
    s.pullup(10).unwrap();
    assert_eq!(s.get_pull(10), Ok(Level::High));
}

#[test]
fn status_register_is_read_only() {
    let s = Sim::new();
    assert!(s.write(Register::Status, 0).is_err());
    assert_eq!(s.writes(), 0);
}

#[test]
fn control_lines_are_open_collector() {
    let s = Sim::new();
    s.write(Register::Control, Control::INIT.bits()).unwrap();
    assert_eq!(s.get_level(16), Ok(Level::High));
    s.pulldown(16).unwrap();
    assert_eq!(s.get_level(16), Ok(Level::Low));
    // read back shows the line low
    assert_eq!(s.read(Register::Control).unwrap() & Control::INIT.bits(), 0);
    assert_eq!(s.latched(Register::Control), Control::INIT.bits());
}

#[test]
fn builder_initial_state() {
    let s = portsim::builder()
        .with_data(0x80)
        .with_control(Control::STROBE.bits())
        .with_pulldown(13)
        .build()
        .unwrap();
    assert_eq!(s.get_level(9), Ok(Level::High));
    assert_eq!(s.get_level(1), Ok(Level::Low));
    assert_eq!(s.get_level(13), Ok(Level::Low));
    assert_eq!(s.writes(), 0);

    assert_eq!(
        portsim::builder().with_pulldown(0).build().unwrap_err(),
        Error::InvalidPin(0)
    );
}

#[test]
fn clones_share_the_port() {
    let s = Sim::new();
    let c = s.clone();
    c.write(Register::Data, 0x02).unwrap();
    assert_eq!(s.get_level(3), Ok(Level::High));
    assert_eq!(s.writes(), 1);
}
