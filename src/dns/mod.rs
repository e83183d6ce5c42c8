//! Blocking name resolution over asynchronous backends.
//!
//! The native resolver protocol is callback-driven: a query is issued once
//! and answers trickle back, ending with a terminal status. [`Resolver`]
//! hides that behind a synchronous [`resolve`][Resolver::resolve] call,
//! parking the calling thread until each query completes.

pub use self::resolve::{code, Outcome, QuerySink, QueryType, RawRecord, Resolve, StaticResolver};

#[cfg(feature = "hickory-dns")]
pub use self::hickory::HickoryDnsResolver;

#[cfg(feature = "hickory-dns")]
mod hickory;
pub(crate) mod lookup;
pub(crate) mod resolve;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::addr::{AddrInfo, Family};

/// Timeout handed to backends when the builder does not override it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A blocking hostname resolver.
///
/// Holds a backend and per-query settings; cheap to clone and share. See the
/// [module docs][self] for the resolution model.
#[derive(Clone)]
pub struct Resolver {
    backend: Arc<dyn Resolve>,
    timeout: Option<Duration>,
}

impl Resolver {
    /// A resolver over the default backend.
    ///
    /// # Panics
    ///
    /// Panics if the default backend cannot be constructed. Use
    /// [`Resolver::builder()`] to handle the failure.
    #[cfg(feature = "hickory-dns")]
    pub fn new() -> Resolver {
        ResolverBuilder::new().build().expect("Resolver::new()")
    }

    /// A builder for configuring the backend, overrides, and timeout.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolves `host` into address records, blocking until done.
    ///
    /// With [`Family::Unspec`] an IPv4 query is issued first and an IPv6
    /// query is tried only if IPv4 produced no records. The caller-supplied
    /// `port` is attached verbatim to every returned record.
    ///
    /// Fails only when zero records were collected: either every issued query
    /// ended in an error (the last status code is surfaced), or the backend
    /// refused the query outright.
    pub fn resolve(&self, host: &str, port: u16, family: Family) -> crate::Result<Vec<AddrInfo>> {
        lookup::lookup(&*self.backend, host, port, family, self.timeout)
    }
}

#[cfg(feature = "hickory-dns")]
impl Default for Resolver {
    fn default() -> Resolver {
        Resolver::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configures a [`Resolver`].
#[must_use]
pub struct ResolverBuilder {
    backend: Option<Arc<dyn Resolve>>,
    overrides: HashMap<String, Vec<RawRecord>>,
    timeout: Option<Duration>,
}

impl ResolverBuilder {
    fn new() -> ResolverBuilder {
        ResolverBuilder {
            backend: None,
            overrides: HashMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Uses a custom backend instead of the default one.
    pub fn dns_backend(mut self, backend: impl Resolve + 'static) -> ResolverBuilder {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Answers queries for `host` from `record` instead of the backend.
    ///
    /// May be called repeatedly to pin several records to one host.
    pub fn resolve(mut self, host: &str, record: RawRecord) -> ResolverBuilder {
        self.overrides.entry(host.to_owned()).or_default().push(record);
        self
    }

    /// Per-query timeout forwarded to the backend. Default 3 seconds.
    pub fn timeout(mut self, timeout: Duration) -> ResolverBuilder {
        self.timeout = Some(timeout);
        self
    }

    /// Lets queries run as long as the backend allows.
    pub fn no_timeout(mut self) -> ResolverBuilder {
        self.timeout = None;
        self
    }

    /// Builds the resolver.
    ///
    /// Fails when no backend was configured and the crate was built without a
    /// default one.
    pub fn build(self) -> crate::Result<Resolver> {
        let backend = match self.backend {
            Some(backend) => backend,
            None => default_backend()?,
        };
        let backend: Arc<dyn Resolve> = if self.overrides.is_empty() {
            backend
        } else {
            Arc::new(resolve::OverriddenResolver::new(backend, self.overrides))
        };
        Ok(Resolver {
            backend,
            timeout: self.timeout,
        })
    }
}

impl fmt::Debug for ResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("overrides", &self.overrides)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(feature = "hickory-dns")]
fn default_backend() -> crate::Result<Arc<dyn Resolve>> {
    Ok(Arc::new(HickoryDnsResolver::new()))
}

#[cfg(not(feature = "hickory-dns"))]
fn default_backend() -> crate::Result<Arc<dyn Resolve>> {
    Err(crate::error::builder(
        "no dns backend configured (enable the `hickory-dns` feature or supply one)",
    ))
}
