#![cfg(target_os = "linux")]

mod utils;
use regex::bytes::Regex;
use utils::ListenerProcess;

use assert_cmd::Command;
use tempfile::tempdir;

// test helper
fn assert_match(data: &[u8], msg: &str, port: u16) {
    let re = Regex::new(&format!(
        r"{msg} \S*tcp_listener \(pid \d+\) listening on port {port}\n"
    ))
    .unwrap();
    assert!(re.is_match(data), "{}", String::from_utf8_lossy(data));
}

#[test]
fn test_no_ports_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    cmd.assert().failure().code(2);
}

#[test]
fn test_invalid_port_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    cmd.args(["notaport"]).assert().failure().code(2);
}

#[test]
fn test_kill_no_process() {
    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    cmd.args(["8383", "8384"])
        .assert()
        .success()
        .stdout("Found no process listening on port(s) 8383 8384\n");
}

/// Kills a process listening on a port without any additional options.
#[test]
fn test_basic_kill_process() {
    let tempdir = tempdir().unwrap();
    let mut listener = ListenerProcess::start(tempdir.path(), 8180);

    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    let command = cmd.args(["8180"]).assert().success();
    assert_match(&command.get_output().stdout, "Killed", 8180);

    assert!(!listener.wait().success());
}

/// Tests the `--signal` option.
#[test]
fn test_signal_option() {
    let tempdir = tempdir().unwrap();
    let mut listener = ListenerProcess::start(tempdir.path(), 8280);

    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    let command = cmd.args(["8280", "-s", "sigterm"]).assert().success();
    assert_match(&command.get_output().stdout, "Killed", 8280);

    assert!(!listener.wait().success());
}

/// Tests the `--dry-run` option to ensure no actual killing of the process.
#[test]
fn test_dry_run_option() {
    let tempdir = tempdir().unwrap();
    let mut listener = ListenerProcess::start(tempdir.path(), 8480);

    let mut cmd = Command::cargo_bin("killtcp").unwrap();
    let command = cmd.args(["8480", "--dry-run"]).assert().success();
    assert_match(&command.get_output().stdout, "Would kill", 8480);

    assert!(listener.is_running());
}
