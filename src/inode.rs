use log::debug;
use nix::unistd::Pid;
use procfs::process::{all_processes_with_root, FDTarget, Process};
use procfs::ProcError;
use std::path::{Path, PathBuf};

/// Outcome of looking for the process that holds a socket inode open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeOwner {
    Found(Pid),
    NotFound,
    /// Nothing matched, but some descriptor tables could not be read.
    PermissionDenied,
}

impl InodeOwner {
    pub fn pid(&self) -> Option<Pid> {
        match self {
            InodeOwner::Found(pid) => Some(*pid),
            _ => None,
        }
    }
}

/// Whether a failed read may have hidden the owner of a socket.
fn hides_owner(err: &ProcError) -> bool {
    matches!(err, ProcError::PermissionDenied(_))
}

/// Finds the process holding a descriptor for the socket `inode`.
///
/// Every descriptor of every process under `proc_root` is inspected and the
/// first `socket:[<inode>]` match wins. Processes that exit mid-scan or
/// whose descriptors are unreadable are skipped.
///
/// # Arguments
///
/// * `proc_root` - Directory laid out like `/proc`.
/// * `inode` - The socket inode from the connection table.
pub fn find_inode_owner(proc_root: &Path, inode: u64) -> InodeOwner {
    let processes = match all_processes_with_root(proc_root) {
        Ok(processes) => processes,
        Err(err) => {
            debug!("Unable to list processes in {}: {}", proc_root.display(), err);
            return InodeOwner::NotFound;
        }
    };
    let mut denied = false;

    for process in processes {
        let process = match process {
            Ok(process) => process,
            Err(err) => {
                denied |= hides_owner(&err);
                continue;
            }
        };

        let fds = match process.fd() {
            Ok(fds) => fds,
            Err(err) => {
                denied |= hides_owner(&err);
                continue;
            }
        };

        for fd in fds {
            match fd {
                Ok(fd) => {
                    if let FDTarget::Socket(sock_inode) = fd.target {
                        if inode == sock_inode {
                            debug!("Found process with PID {} holding inode {}", process.pid, inode);
                            return InodeOwner::Found(Pid::from_raw(process.pid));
                        }
                    }
                }
                Err(err) => denied |= hides_owner(&err),
            }
        }
    }

    if denied {
        InodeOwner::PermissionDenied
    } else {
        InodeOwner::NotFound
    }
}

/// Resolves the executable behind `pid`, if the `exe` link is readable.
pub fn executable_path(proc_root: &Path, pid: Pid) -> Option<PathBuf> {
    let exe = Process::new_with_root(proc_root.join(pid.to_string())).and_then(|process| process.exe());

    match exe {
        Ok(path) => Some(path),
        Err(err) => {
            debug!("Unable to read the executable of PID {}: {}", pid, err);
            None
        }
    }
}
