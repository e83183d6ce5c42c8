#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! # netbind
//!
//! Blocking, script-friendly network bindings over asynchronous native
//! backends.
//!
//! The crate exists for hosts that embed an interpreter or otherwise drive
//! networking from a synchronous thread of control: it presents classic
//! `getaddrinfo`-shaped name resolution and BSD-shaped sockets, while the
//! native machinery underneath stays callback-driven and asynchronous.
//!
//! - Hostname resolution with IPv4-then-IPv6 fallback and presentation-form
//!   address text
//! - Pluggable resolver backends behind the [`dns::Resolve`] trait
//! - Stream and datagram sockets with blocking and nonblocking data paths
//!
//! ## Resolving a hostname
//!
//! For a single lookup, use the [`resolve`] shortcut:
//!
//! ```no_run
//! use netbind::Family;
//!
//! # fn run() -> netbind::Result<()> {
//! for info in netbind::resolve("example.com", 443, Family::Unspec)? {
//!     println!("{}", info.addr);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Repeated lookups should share a [`Resolver`], which also takes a custom
//! backend, static host overrides, and a per-query timeout:
//!
//! ```no_run
//! use std::time::Duration;
//! use netbind::{dns, Family};
//!
//! # fn run() -> netbind::Result<()> {
//! let resolver = netbind::Resolver::builder()
//!     .timeout(Duration::from_secs(1))
//!     .resolve("router.local", dns::RawRecord::new([192, 168, 0, 1]))
//!     .build()?;
//! let infos = resolver.resolve("router.local", 80, Family::V4)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sockets
//!
//! ```no_run
//! use netbind::{Family, SockAddr, Socket, SockType};
//!
//! # fn run() -> netbind::Result<()> {
//! let mut sock = Socket::new(Family::V4, SockType::Stream)?;
//! sock.connect(&SockAddr::v4("93.184.216.34", 80))?;
//! sock.send(b"GET / HTTP/1.0\r\n\r\n")?;
//! let reply = sock.recv(4096)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking semantics
//!
//! Every call blocks the calling thread until the underlying asynchronous
//! operation completes; resolver callbacks run on the crate's own runtime
//! and hand their results over a channel, so no partial results are ever
//! observed. The crate must not be driven from inside another async
//! executor.

pub use crate::addr::{AddrInfo, Family, Protocol, SockAddr, SockType};
pub use crate::dns::Resolver;
pub use crate::error::{Error, Result};
pub use crate::socket::Socket;

mod addr;
pub mod dns;
mod error;
mod runtime;
mod socket;

/// Shortcut to resolve a hostname with a default [`Resolver`].
///
/// The caller-supplied `port` is attached verbatim to every returned record.
/// See [`Resolver::resolve`] for the family plan and failure semantics.
#[cfg(feature = "hickory-dns")]
pub fn resolve(host: &str, port: u16, family: Family) -> Result<Vec<AddrInfo>> {
    Resolver::builder().build()?.resolve(host, port, family)
}
