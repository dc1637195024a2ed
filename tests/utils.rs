use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::{fs, thread, time::Duration};

const LISTENER_SOURCE: &str = r#"
use std::net::TcpListener;

fn main() {
    let port = std::env::args().nth(1).expect("missing port");
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).expect("bind failed");
    loop {
        let _ = listener.accept();
    }
}
"#;

/// A helper binary bound to a TCP port on 127.0.0.1, killed on drop.
pub struct ListenerProcess {
    child: Child,
}

impl ListenerProcess {
    /// Builds `tcp_listener` in `dir` and starts it on `port`, returning once
    /// the port accepts connections.
    pub fn start(dir: &Path, port: u16) -> Self {
        let child = Command::new(build_listener(dir))
            .arg(port.to_string())
            .spawn()
            .expect("Failed to start the listener");
        let mut listener = Self { child };

        for _ in 0..50 {
            if TcpStream::connect(("127.0.0.1", port)).is_ok() {
                return listener;
            }
            assert!(
                listener.child.try_wait().unwrap().is_none(),
                "Listener exited before binding port {}",
                port
            );
            thread::sleep(Duration::from_millis(100));
        }
        panic!("Listener never bound port {}", port);
    }

    /// Waits for the process to exit.
    pub fn wait(&mut self) -> ExitStatus {
        self.child.wait().unwrap()
    }

    pub fn is_running(&mut self) -> bool {
        self.child.try_wait().unwrap().is_none()
    }
}

impl Drop for ListenerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn build_listener(dir: &Path) -> PathBuf {
    let source = dir.join("tcp_listener.rs");
    fs::write(&source, LISTENER_SOURCE).expect("Failed to write the listener source");

    let status = Command::new("rustc")
        .arg(&source)
        .arg("--out-dir")
        .arg(dir)
        .status()
        .expect("Failed to run rustc");
    assert!(status.success(), "Compilation of the listener failed");

    dir.join("tcp_listener")
}
