//! Address families, socket kinds, and the script-friendly address tuple.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr as StdSocketAddr, SocketAddrV6};

use crate::error;

/// Address family of a socket or a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4.
    V4,
    /// IPv6.
    V6,
    /// No preference; resolution tries IPv4 first and falls back to IPv6.
    Unspec,
}

/// Transport style of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SockType {
    /// Connection-oriented byte stream (TCP).
    Stream,
    /// Connectionless datagrams (UDP).
    Dgram,
}

/// Transport protocol carried by an address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Transmission Control Protocol.
    Tcp,
    /// User Datagram Protocol.
    Udp,
}

/// A transport address in presentation form, as handed to and from scripts.
///
/// The address is kept as its canonical text representation (dotted-decimal
/// for IPv4, RFC 5952 colon-hex for IPv6) so that callers may compare it as a
/// string; [`SockAddr::to_std`] converts it back to a binary address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SockAddr {
    /// An IPv4 endpoint: address text and port.
    V4 {
        /// Dotted-decimal address text.
        addr: String,
        /// Port, carried verbatim.
        port: u16,
    },
    /// An IPv6 endpoint: address text, port, flow label, and scope.
    V6 {
        /// Colon-hex address text.
        addr: String,
        /// Port, carried verbatim.
        port: u16,
        /// Flow information; always zero in resolved records.
        flowinfo: u32,
        /// Interface scope identifier.
        scope_id: u32,
    },
}

impl SockAddr {
    /// Builds an IPv4 endpoint.
    pub fn v4(addr: impl Into<String>, port: u16) -> SockAddr {
        SockAddr::V4 {
            addr: addr.into(),
            port,
        }
    }

    /// Builds an IPv6 endpoint with a zero flow label.
    pub fn v6(addr: impl Into<String>, port: u16, scope_id: u32) -> SockAddr {
        SockAddr::V6 {
            addr: addr.into(),
            port,
            flowinfo: 0,
            scope_id,
        }
    }

    /// The family this endpoint belongs to.
    pub fn family(&self) -> Family {
        match self {
            SockAddr::V4 { .. } => Family::V4,
            SockAddr::V6 { .. } => Family::V6,
        }
    }

    /// The address text.
    pub fn addr(&self) -> &str {
        match self {
            SockAddr::V4 { addr, .. } => addr,
            SockAddr::V6 { addr, .. } => addr,
        }
    }

    /// The port.
    pub fn port(&self) -> u16 {
        match self {
            SockAddr::V4 { port, .. } => *port,
            SockAddr::V6 { port, .. } => *port,
        }
    }

    /// Parses the presentation-form address back into a binary socket address.
    pub fn to_std(&self) -> crate::Result<StdSocketAddr> {
        match self {
            SockAddr::V4 { addr, port } => {
                let ip: Ipv4Addr = addr.parse().map_err(error::invalid_addr)?;
                Ok((ip, *port).into())
            }
            SockAddr::V6 {
                addr,
                port,
                flowinfo,
                scope_id,
            } => {
                let ip: Ipv6Addr = addr.parse().map_err(error::invalid_addr)?;
                Ok(SocketAddrV6::new(ip, *port, *flowinfo, *scope_id).into())
            }
        }
    }
}

impl From<StdSocketAddr> for SockAddr {
    fn from(addr: StdSocketAddr) -> SockAddr {
        match addr {
            StdSocketAddr::V4(v4) => SockAddr::V4 {
                addr: v4.ip().to_string(),
                port: v4.port(),
            },
            // The flow label is not propagated, matching resolved records.
            StdSocketAddr::V6(v6) => SockAddr::V6 {
                addr: v6.ip().to_string(),
                port: v6.port(),
                flowinfo: 0,
                scope_id: v6.scope_id(),
            },
        }
    }
}

impl fmt::Display for SockAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SockAddr::V4 { addr, port } => write!(f, "{addr}:{port}"),
            SockAddr::V6 { addr, port, .. } => write!(f, "[{addr}]:{port}"),
        }
    }
}

/// One resolved address entry.
///
/// Mirrors the classic `getaddrinfo` record: family, socket type, protocol,
/// canonical name, and the address tuple itself. The socket type and protocol
/// are fixed to the stream defaults and the canonical name is always empty;
/// the native resolver does not report either, and the fields are kept so the
/// record shape stays stable for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrInfo {
    /// Address family of the record.
    pub family: Family,
    /// Socket type; always [`SockType::Stream`].
    pub socktype: SockType,
    /// Protocol; always [`Protocol::Tcp`].
    pub protocol: Protocol,
    /// Canonical hostname; always empty.
    pub canonical_name: String,
    /// The resolved endpoint, with the caller-supplied port attached.
    pub addr: SockAddr,
}
