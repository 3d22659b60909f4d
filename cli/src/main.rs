// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A command line tool for setting, clearing and pulsing parallel port pins.

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

mod common;
mod sequence;

use common::PortOpts;

fn main() -> ExitCode {
    run(std::env::args_os())
}

fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let mut cmd = Opts::command();
    let usage = cmd.render_help().to_string();
    if args.len() <= 1 {
        eprint!("{usage}");
        return common::exit_invalid();
    }
    let matches = match cmd.try_get_matches_from_mut(&args) {
        Ok(m) => m,
        Err(e) => {
            _ = e.print();
            return if e.use_stderr() {
                common::exit_invalid()
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let opts = match Opts::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(e) => {
            _ = e.print();
            return common::exit_invalid();
        }
    };
    common::init_logging(opts.verbose);

    let ops = sequence::from_matches(&matches);
    let mut stderr = io::stderr();
    match sequence::cmd(&opts.port_opts, &ops, &usage, &mut stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            common::emit_error(opts.verbose, &e);
            common::exit_invalid()
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "parpin",
    about = "A utility to set, clear and pulse the pins of a PC parallel port.",
    version,
    disable_help_flag = true,
    override_usage = "parpin [-c] [-s PIN] [-u PIN] [-z MS]",
    after_help = "Options can occur multiple times, and are applied in order. Example:\n\n    \
        parpin -c -z 50 -s 3 -z 100 -u 3 -z 50 -c"
)]
struct Opts {
    /// print this usage
    #[arg(
        short = 'h',
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        value_parser = clap::value_parser!(bool),
        display_order = 1
    )]
    usage: Vec<bool>,

    /// unset all pins
    #[arg(
        short = 'c',
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append,
        value_parser = clap::value_parser!(bool),
        display_order = 2
    )]
    clear_all: Vec<bool>,

    /// set pin high
    #[arg(
        short = 's',
        value_name = "PIN",
        action = ArgAction::Append,
        allow_negative_numbers = true,
        display_order = 3
    )]
    set: Vec<String>,

    /// set pin low
    #[arg(
        short = 'u',
        value_name = "PIN",
        action = ArgAction::Append,
        allow_negative_numbers = true,
        display_order = 4
    )]
    unset: Vec<String>,

    /// sleep (milliseconds)
    #[arg(
        short = 'z',
        value_name = "MS",
        action = ArgAction::Append,
        allow_negative_numbers = true,
        display_order = 5
    )]
    sleep: Vec<String>,

    #[command(flatten)]
    port_opts: PortOpts,

    /// Provide more detailed error messages and debug logging.
    #[arg(short = 'v', long, display_order = 800)]
    verbose: bool,
}
