#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("killtcp reads /proc and only supports Linux");

pub mod cli;
pub mod config;
pub mod inode;
pub mod killtcp;
pub mod signal;
pub mod socket_table;
pub mod unix;
