use crate::config::ProcConfig;
use crate::inode::{executable_path, find_inode_owner, InodeOwner};
use crate::signal::KillSignal;
use crate::socket_table::{read_listening_sockets, ListeningSocket};
use crate::unix::ProcessSignaller;
use log::{debug, error, warn};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::fmt::Display;
use std::io::{Error, ErrorKind, Write};
use std::path::PathBuf;

/// A listening socket joined with the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProcess {
    pub socket: ListeningSocket,
    pub owner: InodeOwner,
    pub executable: Option<PathBuf>,
}

impl ResolvedProcess {
    /// The executable path for reports, `unknown` when unreadable.
    pub fn executable_name(&self) -> String {
        self.executable
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// One process reported as killed (or, in a dry run, as a target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KilledProcess {
    pub pid: Pid,
    pub executable: String,
    pub port: u16,
}

impl Display for KilledProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (pid {}) listening on port {}",
            self.executable, self.pid, self.port
        )
    }
}

/// What a run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KillSummary {
    pub killed: Vec<KilledProcess>,
    /// Matched sockets whose owning process could not be found.
    pub unresolved: usize,
    /// Matched sockets whose owner could not be signalled.
    pub failed: usize,
}

impl KillSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub trait KillTcpOperations {
    /// Finds the listening sockets bound to `ports` and their owners.
    fn find_target_processes(&self, ports: &[u16]) -> Result<Vec<ResolvedProcess>, Error>;

    /// Signals the owners of the sockets listening on `ports` and writes a
    /// report line for each of them to `out`.
    fn kill_listeners(
        &self,
        ports: &[u16],
        signal: KillSignal,
        dry_run: bool,
        out: &mut dyn Write,
    ) -> Result<KillSummary, Error>;
}

pub struct KillTcp<S: ProcessSignaller> {
    config: ProcConfig,
    signaller: S,
}

impl<S: ProcessSignaller> KillTcp<S> {
    pub fn new(config: ProcConfig, signaller: S) -> Self {
        Self { config, signaller }
    }

    /// Collects the listening sockets of every readable table.
    ///
    /// Fails only when none of the configured tables can be opened.
    fn find_listening_sockets(&self, ports: &HashSet<u16>) -> Result<Vec<ListeningSocket>, Error> {
        let mut sockets = Vec::new();
        let mut readable = 0;

        for table in &self.config.tcp_tables {
            match read_listening_sockets(table, ports) {
                Ok(entries) => {
                    readable += 1;
                    sockets.extend(entries);
                }
                Err(err) => warn!("Skipping connection table {}: {}", table.display(), err),
            }
        }

        if readable == 0 {
            return Err(Error::new(
                ErrorKind::NotFound,
                "Unable to read any TCP connection table",
            ));
        }

        Ok(sockets)
    }
}

impl<S: ProcessSignaller> KillTcpOperations for KillTcp<S> {
    /// Finds the sockets listening on `ports` in every configured table and
    /// resolves the process owning each of them.
    ///
    /// # Arguments
    ///
    /// * `ports` - The requested ports.
    fn find_target_processes(&self, ports: &[u16]) -> Result<Vec<ResolvedProcess>, Error> {
        let requested: HashSet<u16> = ports.iter().copied().collect();
        let sockets = self.find_listening_sockets(&requested)?;

        Ok(sockets
            .into_iter()
            .filter(|socket| requested.contains(&socket.local_port))
            .map(|socket| {
                let owner = find_inode_owner(&self.config.proc_root, socket.inode);
                let executable = owner
                    .pid()
                    .and_then(|pid| executable_path(&self.config.proc_root, pid));
                ResolvedProcess {
                    socket,
                    owner,
                    executable,
                }
            })
            .collect())
    }

    /// Signals the owners of the sockets listening on `ports`.
    ///
    /// # Arguments
    ///
    /// * `ports` - The requested ports.
    /// * `signal` - The signal to deliver.
    /// * `dry_run` - If true, only reports what would be killed.
    /// * `out` - Destination of the human readable report.
    fn kill_listeners(
        &self,
        ports: &[u16],
        signal: KillSignal,
        dry_run: bool,
        out: &mut dyn Write,
    ) -> Result<KillSummary, Error> {
        let targets = self.find_target_processes(ports)?;
        self.kill_targets(targets, ports, signal, dry_run, out)
    }
}

impl<S: ProcessSignaller> KillTcp<S> {
    /// Signals every resolved owner once and reports each matched socket.
    ///
    /// Sockets without a known owner are never signalled. When nothing was
    /// killed and no signal failed, a single "found no process" line is
    /// written instead.
    ///
    /// # Returns
    ///
    /// * `KillSummary` - Killed processes and counts of unresolved or failed sockets.
    pub fn kill_targets(
        &self,
        targets: Vec<ResolvedProcess>,
        ports: &[u16],
        signal: KillSignal,
        dry_run: bool,
        out: &mut dyn Write,
    ) -> Result<KillSummary, Error> {
        let mut summary = KillSummary::default();
        let mut signalled: HashSet<Pid> = HashSet::new();

        for target in targets {
            let port = target.socket.local_port;
            let pid = match target.owner {
                InodeOwner::Found(pid) => pid,
                InodeOwner::NotFound => {
                    warn!(
                        "No process found holding socket inode {} listening on port {}",
                        target.socket.inode, port
                    );
                    summary.unresolved += 1;
                    continue;
                }
                InodeOwner::PermissionDenied => {
                    warn!(
                        "Unable to find the owner of socket inode {} listening on port {}. The process might be running as another user or root. Try again with sudo",
                        target.socket.inode, port
                    );
                    summary.unresolved += 1;
                    continue;
                }
            };

            let killed = KilledProcess {
                pid,
                executable: target.executable_name(),
                port,
            };

            if dry_run {
                writeln!(out, "Would kill {}", killed)?;
                summary.killed.push(killed);
                continue;
            }

            if signalled.contains(&pid) {
                debug!("Process with PID {} was already signalled", pid);
            } else if let Err(err) = self.signaller.signal(pid, signal) {
                error!("{}", err);
                summary.failed += 1;
                continue;
            } else {
                signalled.insert(pid);
            }

            writeln!(out, "Killed {}", killed)?;
            summary.killed.push(killed);
        }

        if summary.killed.is_empty() && summary.failed == 0 {
            let ports: Vec<String> = ports.iter().map(u16::to_string).collect();
            writeln!(
                out,
                "Found no process listening on port(s) {}",
                ports.join(" ")
            )?;
        }

        Ok(summary)
    }
}
