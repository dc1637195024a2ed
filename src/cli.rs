use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use crate::signal::KillSignal;

/// Kills the processes listening on the given TCP ports.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct KillTcpArgs {
    /// A list of TCP port numbers to kill processes on.
    #[arg(
        name = "ports",
        help = "The list of TCP port numbers to kill processes on",
        required = true
    )]
    pub ports: Vec<u16>,

    /// An option to specify the type of signal to be sent.
    #[arg(
        long,
        short = 's',
        name = "SIG",
        help = "SIG is a signal name",
        default_value = "sigkill",
        value_parser = parse_signal
    )]
    pub signal: KillSignal,

    /// A verbosity flag to control the level of logging output.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// Dry-run flag to only display what would be done without taking action.
    #[arg(long, help = "Perform a dry run without killing any processes")]
    pub dry_run: bool,
}

fn parse_signal(arg: &str) -> Result<KillSignal, std::io::Error> {
    arg.parse()
}
