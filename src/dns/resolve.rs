use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::addr::Family;

/// Opaque resolver status codes.
///
/// Backends that have no native numbering report these glibc-style `EAI`
/// values; the lookup layer passes whatever code it receives through without
/// reinterpreting it.
pub mod code {
    /// The hostname is not known.
    pub const EAI_NONAME: i32 = -2;
    /// Temporary failure; the query may succeed later.
    pub const EAI_AGAIN: i32 = -3;
    /// Non-recoverable resolver failure.
    pub const EAI_FAIL: i32 = -4;
    /// The host exists but has no records of the requested family.
    pub const EAI_NODATA: i32 = -5;
}

/// The record type a single query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// IPv4 host addresses.
    A,
    /// IPv6 host addresses.
    Aaaa,
}

impl QueryType {
    /// The address family this query type produces.
    pub fn family(&self) -> Family {
        match self {
            QueryType::A => Family::V4,
            QueryType::Aaaa => Family::V6,
        }
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            QueryType::A => ip.is_ipv4(),
            QueryType::Aaaa => ip.is_ipv6(),
        }
    }
}

/// One raw address as delivered by a resolver backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    /// The resolved address.
    pub ip: IpAddr,
    /// IPv6 scope identifier; zero for IPv4 and unscoped addresses.
    pub scope_id: u32,
}

impl RawRecord {
    /// Builds a record with a zero scope.
    pub fn new(ip: impl Into<IpAddr>) -> RawRecord {
        RawRecord {
            ip: ip.into(),
            scope_id: 0,
        }
    }
}

/// Terminal status of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All records were delivered; zero records is still success.
    AllDone,
    /// The query failed with a native status code.
    Failed(i32),
}

pub(crate) enum Event {
    Record(RawRecord),
    Done(Outcome),
}

/// The delivery half of one query.
///
/// A backend calls [`address`][QuerySink::address] zero or more times and then
/// [`finish`][QuerySink::finish] exactly once, from whatever execution context
/// it runs on. Dropping the sink without finishing is reported to the waiting
/// caller as [`code::EAI_FAIL`].
#[derive(Debug)]
pub struct QuerySink {
    tx: mpsc::Sender<Event>,
}

impl QuerySink {
    /// Delivers one resolved record.
    pub fn address(&self, record: RawRecord) {
        let _ = self.tx.send(Event::Record(record));
    }

    /// Delivers the terminal status, consuming the sink.
    pub fn finish(self, outcome: Outcome) {
        let _ = self.tx.send(Event::Done(outcome));
    }
}

pub(crate) struct QueryEvents {
    rx: mpsc::Receiver<Event>,
}

impl QueryEvents {
    /// Blocks until the terminal event, collecting records in arrival order.
    ///
    /// The channel handoff orders the backend's writes before this returns.
    pub(crate) fn wait(self) -> (Vec<RawRecord>, Outcome) {
        let mut records = Vec::new();
        loop {
            match self.rx.recv() {
                Ok(Event::Record(record)) => records.push(record),
                Ok(Event::Done(outcome)) => return (records, outcome),
                // Sink dropped without a terminal status.
                Err(mpsc::RecvError) => return (records, Outcome::Failed(code::EAI_FAIL)),
            }
        }
    }
}

pub(crate) fn query_channel() -> (QuerySink, QueryEvents) {
    let (tx, rx) = mpsc::channel();
    (QuerySink { tx }, QueryEvents { rx })
}

/// Trait for pluggable resolver backends.
///
/// `query` issues exactly one asynchronous lookup and must not block on its
/// completion: records and the terminal status flow back through the sink,
/// possibly from another thread. The timeout is forwarded verbatim; enforcing
/// it is the backend's business. An `Err` return means the query could not be
/// issued at all and is surfaced to the caller immediately.
pub trait Resolve: Send + Sync {
    /// Issues a single query for `host`.
    fn query(
        &self,
        host: &str,
        qtype: QueryType,
        timeout: Option<Duration>,
        sink: QuerySink,
    ) -> crate::Result<()>;
}

/// A backend answering from a fixed host table.
///
/// Hosts answer with their matching-family records and an all-done status;
/// unknown hosts fail with [`code::EAI_NONAME`]. Useful for tests and for
/// embedders with a static address map.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<RawRecord>>,
}

impl StaticResolver {
    /// An empty table.
    pub fn new() -> StaticResolver {
        StaticResolver::default()
    }

    /// Adds a record for `host`, keeping earlier ones.
    pub fn insert(&mut self, host: impl Into<String>, record: RawRecord) -> &mut StaticResolver {
        self.hosts.entry(host.into()).or_default().push(record);
        self
    }
}

impl Resolve for StaticResolver {
    fn query(
        &self,
        host: &str,
        qtype: QueryType,
        _timeout: Option<Duration>,
        sink: QuerySink,
    ) -> crate::Result<()> {
        match self.hosts.get(host) {
            Some(records) => answer_static(records, qtype, sink),
            None => sink.finish(Outcome::Failed(code::EAI_NONAME)),
        }
        Ok(())
    }
}

/// Delivers the matching-family subset of `records` and completes the query.
fn answer_static(records: &[RawRecord], qtype: QueryType, sink: QuerySink) {
    for record in records {
        if qtype.matches(&record.ip) {
            sink.address(*record);
        }
    }
    sink.finish(Outcome::AllDone);
}

/// Wraps a backend with a host override table consulted before every query.
pub(crate) struct OverriddenResolver {
    inner: Arc<dyn Resolve>,
    overrides: HashMap<String, Vec<RawRecord>>,
}

impl OverriddenResolver {
    pub(crate) fn new(
        inner: Arc<dyn Resolve>,
        overrides: HashMap<String, Vec<RawRecord>>,
    ) -> OverriddenResolver {
        OverriddenResolver { inner, overrides }
    }
}

impl Resolve for OverriddenResolver {
    fn query(
        &self,
        host: &str,
        qtype: QueryType,
        timeout: Option<Duration>,
        sink: QuerySink,
    ) -> crate::Result<()> {
        match self.overrides.get(host) {
            Some(records) => {
                answer_static(records, qtype, sink);
                Ok(())
            }
            None => self.inner.query(host, qtype, timeout, sink),
        }
    }
}
