//! Signal sent to the processes found listening on the requested ports.

use nix::sys::signal::Signal;
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillSignal(pub Signal);

impl Default for KillSignal {
    fn default() -> Self {
        KillSignal(Signal::SIGKILL)
    }
}

impl Display for KillSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for KillSignal {
    type Err = std::io::Error;

    /// Accepts names like `SIGTERM`, in any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let signal = Signal::from_str(&value.to_uppercase())?;
        Ok(KillSignal(signal))
    }
}
