use std::path::{Path, PathBuf};

/// Where the kernel tables and the per-process entries are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcConfig {
    /// TCP connection tables, scanned in order.
    pub tcp_tables: Vec<PathBuf>,
    /// Directory holding one entry per pid.
    pub proc_root: PathBuf,
}

impl ProcConfig {
    /// Derives every path from an alternative proc root.
    ///
    /// # Arguments
    ///
    /// * `root` - A directory laid out like `/proc`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            tcp_tables: vec![root.join("net/tcp"), root.join("net/tcp6")],
            proc_root: root.to_path_buf(),
        }
    }
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_proc() {
        let config = ProcConfig::default();
        assert_eq!(
            config.tcp_tables,
            vec![
                PathBuf::from("/proc/net/tcp"),
                PathBuf::from("/proc/net/tcp6")
            ]
        );
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
    }
}
