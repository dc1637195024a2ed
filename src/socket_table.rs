//! Reader for the kernel's textual TCP connection tables (`/proc/net/tcp`
//! and `/proc/net/tcp6`).
//!
//! Each line after the header describes one socket:
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue:rx_queue tr:tm->when retrnsmt   uid  timeout inode
//!    0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 ...
//! ```

use log::{debug, warn};
use procfs::net::TcpState;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Error};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

/// Number of leading columns needed to build a `ListeningSocket`.
const REQUIRED_FIELDS: usize = 10;

/// A listening TCP socket read from one line of a connection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningSocket {
    /// The `sl` column, without its trailing colon.
    pub connection_id: String,
    pub local_host: IpAddr,
    pub local_port: u16,
    pub state: TcpState,
    pub uid: u32,
    pub inode: u64,
}

/// Decodes an address as stored in the tables: each 32-bit group is written
/// with its bytes reversed, so `0100007F` is `127.0.0.1`.
///
/// Accepts 8 hex digits (IPv4) or 32 hex digits (IPv6).
pub fn decode_address(hex: &str) -> Option<IpAddr> {
    match hex.len() {
        8 => decode_group(hex).map(|bytes| IpAddr::V4(Ipv4Addr::from(bytes))),
        32 => {
            let mut octets = [0u8; 16];
            for (index, chunk) in octets.chunks_mut(4).enumerate() {
                let start = index * 8;
                chunk.copy_from_slice(&decode_group(hex.get(start..start + 8)?)?);
            }
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

/// Decodes one 8-digit group, taking bytes from offsets [6:8], [4:6], [2:4]
/// and [0:2].
fn decode_group(hex: &str) -> Option<[u8; 4]> {
    let byte = |start: usize| {
        hex.get(start..start + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    Some([byte(6)?, byte(4)?, byte(2)?, byte(0)?])
}

/// Decodes the 4 hex digit port, e.g. `1F90` is 8080.
pub fn decode_port(hex: &str) -> Option<u16> {
    if hex.len() != 4 {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

/// Splits a `HEXADDR:HEXPORT` column into its decoded parts.
fn decode_endpoint(field: &str) -> Option<(IpAddr, u16)> {
    let (host, port) = field.split_once(':')?;
    Some((decode_address(host)?, decode_port(port)?))
}

/// Parses one table line, whatever its state.
///
/// Returns `None` when the line is malformed.
pub fn parse_line(line: &str) -> Option<ListeningSocket> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < REQUIRED_FIELDS {
        return None;
    }

    let (local_host, local_port) = decode_endpoint(fields[1])?;
    let state = u8::from_str_radix(fields[3], 16)
        .ok()
        .and_then(TcpState::from_u8)?;

    Some(ListeningSocket {
        connection_id: fields[0].trim_end_matches(':').to_string(),
        local_host,
        local_port,
        state,
        uid: fields[7].parse().ok()?,
        inode: fields[9].parse().ok()?,
    })
}

/// Yields the listening sockets of `lines` bound to one of `ports`.
///
/// The first line is the header and is skipped. Malformed lines are skipped
/// too; a read error ends the sequence.
pub fn listening_sockets<'a, I>(
    lines: I,
    ports: &'a HashSet<u16>,
) -> impl Iterator<Item = ListeningSocket> + 'a
where
    I: Iterator<Item = Result<String, Error>> + 'a,
{
    lines
        .skip(1)
        .map_while(|line| match line {
            Ok(line) => Some(line),
            Err(err) => {
                warn!("Stopped reading connection table: {}", err);
                None
            }
        })
        .filter_map(|line| {
            let socket = parse_line(&line);
            if socket.is_none() && !line.trim().is_empty() {
                debug!("Skipping malformed line: {}", line.trim());
            }
            socket
        })
        .filter(move |socket| socket.state == TcpState::Listen && ports.contains(&socket.local_port))
}

/// Opens the table at `path` and yields its listening sockets bound to one
/// of `ports`, in table order.
///
/// # Arguments
///
/// * `path` - Path of a table formatted like `/proc/net/tcp`.
/// * `ports` - The requested ports.
pub fn read_listening_sockets<'a>(
    path: &Path,
    ports: &'a HashSet<u16>,
) -> Result<impl Iterator<Item = ListeningSocket> + 'a, Error> {
    debug!("Reading connection table {}", path.display());
    let file = File::open(path)?;

    Ok(listening_sockets(BufReader::new(file).lines(), ports))
}
