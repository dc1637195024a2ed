//! The `killtcp` command-line utility kills the processes listening on the
//! given TCP ports.
//!
//! Listening sockets are read from `/proc/net/tcp` and `/proc/net/tcp6`,
//! their inodes are matched against every process's descriptor table and
//! the owners are sent a signal (`SIGKILL` unless told otherwise).

use anyhow::Context;
use clap::Parser;
use killtcp::cli::KillTcpArgs;
use killtcp::config::ProcConfig;
use killtcp::killtcp::{KillTcp, KillTcpOperations};
use killtcp::unix::UnixSignaller;
use log::{error, warn};
use nix::unistd::geteuid;
use std::process::exit;

fn run(args: &KillTcpArgs) -> anyhow::Result<bool> {
    let killtcp = KillTcp::new(ProcConfig::default(), UnixSignaller);
    let mut stdout = std::io::stdout().lock();

    let summary = killtcp
        .kill_listeners(&args.ports, args.signal, args.dry_run, &mut stdout)
        .context("Unable to scan for listening sockets")?;

    Ok(summary.is_clean())
}

/// The `main` function is the entry point of the `killtcp` utility.
///
/// It parses command-line arguments, sets up the logging environment, and
/// kills the processes listening on the specified ports.
fn main() {
    let args = KillTcpArgs::parse();

    let log_level = args
        .verbose
        .log_level()
        .map(|level| level.to_level_filter())
        .unwrap_or(log::LevelFilter::Off);

    env_logger::Builder::new()
        .format_module_path(log_level == log::LevelFilter::Trace)
        .format_target(log_level == log::LevelFilter::Trace)
        .format_timestamp(Option::None)
        .filter_level(log_level)
        .init();

    if !geteuid().is_root() {
        warn!("Not running as root, processes owned by other users may be missed");
    }

    match run(&args) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(err) => {
            error!("{:#}", err);
            exit(1);
        }
    }
}
