//! `yang-replay`: plan and apply recorded NETCONF replays to a YANG tree.
//!
//! Usage:
//!   yang-replay keys '<xpath>'
//!   yang-replay strip '<xpath>'
//!   yang-replay plan  < input.json
//!   yang-replay apply < input.json
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=yang_replay=debug`) for diagnostics on
//! stderr.

use std::io::{self, Read};

use yang_replay::cli::{self, CliError};

const USAGE: &str = "yang-replay keys <xpath> | strip <xpath> | plan | apply";

fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn run(args: &[String]) -> Result<String, CliError> {
    match (args.get(1).map(String::as_str), args.get(2)) {
        (Some("keys"), Some(xpath)) => cli::keys(xpath),
        (Some("strip"), Some(xpath)) => Ok(cli::strip(xpath)),
        (Some("plan"), None) => cli::plan(&read_stdin()?),
        (Some("apply"), None) => cli::apply(&read_stdin()?),
        _ => Err(CliError::Usage(USAGE.to_string())),
    }
}

fn main() {
    cli::init_logging();
    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
