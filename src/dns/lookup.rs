use std::net::IpAddr;
use std::time::Duration;

use crate::addr::{AddrInfo, Family, Protocol, SockAddr, SockType};
use crate::error;

use super::resolve::{query_channel, Outcome, QueryType, RawRecord, Resolve};

/// Resolves `host` into address records, blocking until done.
///
/// One query is issued per family in the plan: the requested family alone, or
/// for [`Family::Unspec`] an IPv4 query with an IPv6 fallback taken only when
/// IPv4 produced nothing. The backend delivers each query's records and its
/// terminal status through a channel, and this function parks on that channel,
/// so the backend's writes are ordered before the records are read.
///
/// An error status is surfaced only when the whole call collected zero
/// records; a family that failed while the other answered is not an error.
pub(crate) fn lookup(
    backend: &dyn Resolve,
    host: &str,
    port: u16,
    family: Family,
    timeout: Option<Duration>,
) -> crate::Result<Vec<AddrInfo>> {
    let plan: &[QueryType] = match family {
        Family::V4 => &[QueryType::A],
        Family::V6 => &[QueryType::Aaaa],
        Family::Unspec => &[QueryType::A, QueryType::Aaaa],
    };

    let mut out = Vec::new();
    let mut status = 0;

    for &qtype in plan {
        let (sink, events) = query_channel();
        backend.query(host, qtype, timeout, sink)?;
        let (records, outcome) = events.wait();
        log::trace!("dns {qtype:?} query for {host:?}: {outcome:?}");

        status = match outcome {
            Outcome::AllDone => 0,
            Outcome::Failed(code) => code,
        };
        out.extend(records.into_iter().map(|record| addr_info(record, port)));

        if !out.is_empty() {
            break;
        }
    }

    if status != 0 && out.is_empty() {
        return Err(error::resolve(status));
    }
    Ok(out)
}

fn addr_info(record: RawRecord, port: u16) -> AddrInfo {
    let (family, addr) = match record.ip {
        IpAddr::V4(ip) => (Family::V4, SockAddr::v4(ip.to_string(), port)),
        IpAddr::V6(ip) => (
            Family::V6,
            SockAddr::v6(ip.to_string(), port, record.scope_id),
        ),
    };
    AddrInfo {
        family,
        socktype: SockType::Stream,
        protocol: Protocol::Tcp,
        canonical_name: String::new(),
        addr,
    }
}
