use crate::signal::KillSignal;
use log::info;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::io::Error;

/// Delivers signals to processes.
pub trait ProcessSignaller {
    fn signal(&self, pid: Pid, signal: KillSignal) -> Result<(), Error>;
}

/// Sends real signals through `kill(2)`.
#[derive(Debug, Default)]
pub struct UnixSignaller;

impl ProcessSignaller for UnixSignaller {
    fn signal(&self, pid: Pid, signal: KillSignal) -> Result<(), Error> {
        info!("Sending {} to process with PID {}", signal, pid);

        kill(pid, signal.0).map_err(|e| {
            Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to send {} to process with PID {}: {}", signal, pid, e),
            )
        })
    }
}
