// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::common::{Error, PortOpts};
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use parpin::pin::{Pin, Pins};
use parpin::port::Port;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

// ids of the order sensitive arguments
pub const USAGE: &str = "usage";
pub const CLEAR_ALL: &str = "clear_all";
pub const SET: &str = "set";
pub const UNSET: &str = "unset";
pub const SLEEP: &str = "sleep";

/// The pins that may be controlled from the command line.
pub const PIN_RANGE: RangeInclusive<i64> = 2..=7;

/// A single command line operation.
///
/// Values are kept as provided and only validated when the operation is applied,
/// so the operations preceding an invalid value still take effect.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Usage,
    ClearAll,
    Set(String),
    Unset(String),
    Sleep(String),
}

impl Op {
    fn uses_port(&self) -> bool {
        matches!(self, Op::ClearAll | Op::Set(_) | Op::Unset(_))
    }
}

/// Extract the operations from the matches, in command line order.
pub fn from_matches(m: &ArgMatches) -> Vec<Op> {
    let mut ops = BTreeMap::new();
    extract(m, USAGE, &mut ops, |_: &bool| Op::Usage);
    extract(m, CLEAR_ALL, &mut ops, |_: &bool| Op::ClearAll);
    extract(m, SET, &mut ops, |v: &String| Op::Set(v.clone()));
    extract(m, UNSET, &mut ops, |v: &String| Op::Unset(v.clone()));
    extract(m, SLEEP, &mut ops, |v: &String| Op::Sleep(v.clone()));
    ops.into_values().collect()
}

fn extract<T, F>(m: &ArgMatches, id: &str, ops: &mut BTreeMap<usize, Op>, op: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> Op,
{
    if let (Some(values), Some(indices)) = (m.get_many::<T>(id), m.indices_of(id)) {
        for (value, index) in values.zip(indices) {
            ops.insert(index, op(value));
        }
    }
}

pub fn cmd(opts: &PortOpts, ops: &[Op], usage: &str, out: &mut dyn Write) -> Result<()> {
    let port = if ops.iter().any(|op| op.uses_port()) {
        let mut port = opts.open()?;
        port.output_mode(Pins::DATA | Pins::SWITCHABLE)
            .context("unable to configure pins as outputs")?;
        Some(port)
    } else {
        None
    };
    let mut sequencer = Sequencer { port, usage, out };
    for op in ops {
        sequencer.apply(op)?;
    }
    Ok(())
}

struct Sequencer<'a> {
    // only acquired if the sequence drives pins
    port: Option<Port>,

    usage: &'a str,

    // destination for progress messages
    out: &'a mut dyn Write,
}

impl Sequencer<'_> {
    fn apply(&mut self, op: &Op) -> Result<()> {
        match op {
            Op::Usage => {
                _ = write!(self.out, "{}", self.usage);
                Ok(())
            }
            Op::ClearAll => self.do_clear_all(),
            Op::Set(pin) => self.do_set(pin),
            Op::Unset(pin) => self.do_unset(pin),
            Op::Sleep(ms) => self.do_sleep(ms),
        }
    }

    fn port(&mut self) -> Result<&mut Port> {
        match self.port.as_mut() {
            Some(port) => Ok(port),
            None => bail!("port has not been acquired"),
        }
    }

    fn do_clear_all(&mut self) -> Result<()> {
        _ = writeln!(self.out, "unset all");
        let pins: Pins = PIN_RANGE
            .filter_map(|n| u8::try_from(n).ok())
            .filter_map(|n| Pin::new(n).ok())
            .collect();
        self.port()?
            .clear_pin(pins)
            .with_context(|| format!("unable to clear {pins}"))
    }

    fn do_set(&mut self, value: &str) -> Result<()> {
        let pin = pin_from(value)?;
        _ = writeln!(self.out, "set pin {pin}");
        self.port()?
            .set_pin(pin.into())
            .with_context(|| format!("unable to set pin {pin}"))
    }

    fn do_unset(&mut self, value: &str) -> Result<()> {
        let pin = pin_from(value)?;
        _ = writeln!(self.out, "unset pin {pin}");
        self.port()?
            .clear_pin(pin.into())
            .with_context(|| format!("unable to unset pin {pin}"))
    }

    fn do_sleep(&mut self, value: &str) -> Result<()> {
        let d = sleep_duration(value)?;
        _ = writeln!(self.out, "sleeping for {}ms", d.as_millis());
        thread::sleep(d);
        Ok(())
    }
}

fn parse_value(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn pin_from(value: &str) -> Result<Pin> {
    let pin = parse_value(value)
        .filter(|n| PIN_RANGE.contains(n))
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| Error::PinOutOfRange(value.into()))?;
    Ok(Pin::new(pin)?)
}

fn sleep_duration(value: &str) -> Result<Duration> {
    match parse_value(value).and_then(|ms| u64::try_from(ms).ok()) {
        Some(ms) if ms > 0 => Ok(Duration::from_micros(ms.saturating_mul(1000))),
        _ => bail!(Error::InvalidSleep(value.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parpin::Register;
    use portsim::{Level, Sim};

    fn run(sim: &Sim, ops: &[Op]) -> (Result<()>, String) {
        let mut out = Vec::new();
        let mut port = Port::from_registers(sim.clone()).expect("sim port should open");
        port.output_mode(Pins::DATA | Pins::SWITCHABLE)
            .expect("output mode should succeed");
        let res = {
            let mut sequencer = Sequencer {
                port: Some(port),
                usage: "usage\n",
                out: &mut out,
            };
            ops.iter().try_for_each(|op| sequencer.apply(op))
        };
        (res, String::from_utf8(out).expect("output should be utf8"))
    }

    fn cli_error(res: Result<()>) -> Error {
        res.expect_err("sequence should fail")
            .downcast::<Error>()
            .expect("error should be a cli error")
    }

    fn set(pin: i64) -> Op {
        Op::Set(pin.to_string())
    }

    fn unset(pin: i64) -> Op {
        Op::Unset(pin.to_string())
    }

    fn sleep_ms(ms: i64) -> Op {
        Op::Sleep(ms.to_string())
    }

    mod parse {
        use super::super::*;
        use super::{set, sleep_ms, unset};
        use clap::{Arg, ArgAction, Command};

        fn flag(id: &'static str, short: char) -> Arg {
            Arg::new(id)
                .short(short)
                .num_args(0)
                .default_missing_value("true")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(bool))
        }

        fn option(id: &'static str, short: char) -> Arg {
            Arg::new(id)
                .short(short)
                .action(ArgAction::Append)
                .allow_negative_numbers(true)
        }

        fn ops(args: &[&str]) -> Vec<Op> {
            let m = Command::new("parpin")
                .disable_help_flag(true)
                .arg(flag(USAGE, 'h'))
                .arg(flag(CLEAR_ALL, 'c'))
                .arg(option(SET, 's'))
                .arg(option(UNSET, 'u'))
                .arg(option(SLEEP, 'z'))
                .try_get_matches_from(args)
                .expect("arguments should parse");
            from_matches(&m)
        }

        #[test]
        fn command_line_order() {
            let args = [
                "parpin", "-c", "-z", "50", "-s", "3", "-z", "100", "-u", "3", "-z", "50", "-c",
            ];
            assert_eq!(
                ops(&args),
                vec![
                    Op::ClearAll,
                    sleep_ms(50),
                    set(3),
                    sleep_ms(100),
                    unset(3),
                    sleep_ms(50),
                    Op::ClearAll
                ]
            );
        }

        #[test]
        fn repeated_flags() {
            assert_eq!(
                ops(&["parpin", "-h", "-s", "2", "-h", "-c", "-c"]),
                vec![Op::Usage, set(2), Op::Usage, Op::ClearAll, Op::ClearAll]
            );
        }

        #[test]
        fn negative_values() {
            assert_eq!(
                ops(&["parpin", "-s", "-1", "-z", "-5"]),
                vec![set(-1), sleep_ms(-5)]
            );
        }

        #[test]
        fn unparsed_values() {
            assert_eq!(
                ops(&["parpin", "-s", "2", "-s", "three", "-z", "soon"]),
                vec![
                    set(2),
                    Op::Set("three".into()),
                    Op::Sleep("soon".into())
                ]
            );
        }

        #[test]
        fn empty() {
            assert_eq!(ops(&["parpin"]), vec![]);
        }
    }

    #[test]
    fn set_and_unset_in_range() {
        for n in PIN_RANGE {
            let s = Sim::new();
            let pin = n as u8;
            let (res, out) = run(&s, &[set(n)]);
            assert!(res.is_ok());
            assert_eq!(out, format!("set pin {n}\n"));
            assert_eq!(s.get_level(pin), Ok(Level::High));

            let (res, out) = run(&s, &[unset(n)]);
            assert!(res.is_ok());
            assert_eq!(out, format!("unset pin {n}\n"));
            assert_eq!(s.get_level(pin), Ok(Level::Low));
        }
    }

    #[test]
    fn out_of_range() {
        for n in [-1, 0, 1, 8, 9, 17, 256, i64::MAX, i64::MIN] {
            let s = Sim::new();
            let (res, out) = run(&s, &[set(n)]);
            assert_eq!(cli_error(res), Error::PinOutOfRange(n.to_string()));
            assert!(out.is_empty());
            let (res, _) = run(&s, &[unset(n)]);
            assert_eq!(cli_error(res), Error::PinOutOfRange(n.to_string()));
            assert_eq!(s.writes(), 0);
        }
    }

    #[test]
    fn earlier_operations_are_applied() {
        let s = Sim::new();
        let (res, out) = run(&s, &[set(4), set(8), set(5)]);
        assert_eq!(cli_error(res), Error::PinOutOfRange("8".into()));
        assert_eq!(out, "set pin 4\n");
        assert_eq!(s.get_level(4), Ok(Level::High));
        assert_eq!(s.get_level(5), Ok(Level::Low));
    }

    #[test]
    fn unparsable_pin_applies_earlier_operations() {
        for value in ["three", "", "3x", "99999999999999999999"] {
            let s = portsim::builder().with_data(0xff).build().unwrap();
            let (res, out) = run(&s, &[Op::ClearAll, set(2), Op::Unset(value.into())]);
            assert_eq!(cli_error(res), Error::PinOutOfRange(value.into()));
            assert_eq!(out, "unset all\nset pin 2\n");
            assert_eq!(s.latched(Register::Data), 0xc1, "{value}");
        }
    }

    #[test]
    fn unparsable_sleep_applies_earlier_operations() {
        let s = Sim::new();
        let (res, out) = run(&s, &[set(3), Op::Sleep("soon".into())]);
        assert_eq!(cli_error(res), Error::InvalidSleep("soon".into()));
        assert_eq!(out, "set pin 3\n");
        assert_eq!(s.get_level(3), Ok(Level::High));
    }

    #[test]
    fn surrounding_whitespace() {
        let s = Sim::new();
        let (res, out) = run(&s, &[Op::Set(" 5 ".into())]);
        assert!(res.is_ok());
        assert_eq!(out, "set pin 5\n");
        assert_eq!(s.get_level(5), Ok(Level::High));
    }

    #[test]
    fn clear_all() {
        let s = portsim::builder().with_data(0xff).build().unwrap();
        let (res, out) = run(&s, &[Op::ClearAll]);
        assert!(res.is_ok());
        assert_eq!(out, "unset all\n");
        // only pins 2 to 7
        assert_eq!(s.latched(Register::Data), 0xc0);
        assert_eq!(s.get_level(8), Ok(Level::High));
        assert_eq!(s.get_level(9), Ok(Level::High));
    }

    #[test]
    fn clear_all_matches_unset_each() {
        let a = portsim::builder().with_data(0x5a).build().unwrap();
        let b = portsim::builder().with_data(0x5a).build().unwrap();
        run(&a, &[Op::ClearAll]).0.unwrap();
        let each: Vec<Op> = PIN_RANGE.map(unset).collect();
        run(&b, &each).0.unwrap();
        assert_eq!(a.latched(Register::Data), b.latched(Register::Data));
    }

    #[test]
    fn order_is_significant() {
        let s = Sim::new();
        run(&s, &[set(3), unset(3)]).0.unwrap();
        assert_eq!(s.get_level(3), Ok(Level::Low));
        run(&s, &[unset(3), set(3)]).0.unwrap();
        assert_eq!(s.get_level(3), Ok(Level::High));
    }

    #[test]
    fn sleep() {
        let s = Sim::new();
        let start = std::time::Instant::now();
        let (res, out) = run(&s, &[sleep_ms(20)]);
        assert!(res.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(out, "sleeping for 20ms\n");
    }

    #[test]
    fn invalid_sleep() {
        for ms in ["0", "-1", "-9223372036854775808", "", "1.5"] {
            let s = Sim::new();
            let (res, out) = run(&s, &[Op::Sleep(ms.into())]);
            assert_eq!(cli_error(res), Error::InvalidSleep(ms.into()));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn sleep_duration_is_microseconds() {
        assert_eq!(sleep_duration("1").unwrap(), Duration::from_micros(1000));
        assert_eq!(sleep_duration("250").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn usage_continues() {
        let s = Sim::new();
        let (res, out) = run(&s, &[Op::Usage, set(2)]);
        assert!(res.is_ok());
        assert_eq!(out, "usage\nset pin 2\n");
        assert_eq!(s.get_level(2), Ok(Level::High));
    }

    #[test]
    fn port_only_acquired_for_pin_operations() {
        assert!(!Op::Usage.uses_port());
        assert!(!sleep_ms(1).uses_port());
        assert!(Op::ClearAll.uses_port());
        assert!(set(2).uses_port());
        assert!(unset(2).uses_port());

        // would fail if the port were opened
        let opts = PortOpts {
            address: 0,
            backend: crate::common::BackendFlags::DevPort,
            device: Some("/this/path/does/not/exist".into()),
            exclusive: false,
        };
        let mut out = Vec::new();
        assert!(cmd(&opts, &[Op::Usage, sleep_ms(1)], "usage\n", &mut out).is_ok());
        let err = cmd(&opts, &[set(2)], "usage\n", &mut out).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("unable to acquire parallel port"));
    }
}
