//! DNS resolution via the [hickory-resolver](https://github.com/hickory-dns/hickory-dns) crate

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::{
    config::ResolverConfig, name_server::TokioConnectionProvider, ResolveError, TokioResolver,
};
use once_cell::sync::OnceCell;

use crate::runtime;

use super::resolve::{code, Outcome, QuerySink, QueryType, RawRecord, Resolve};

/// A [`Resolve`] backend driven by hickory's async resolver.
///
/// Lookups run on the crate's shared runtime, so completions reach the sink
/// from the executor's thread, never the caller's.
#[derive(Debug, Default, Clone)]
pub struct HickoryDnsResolver {
    /// Construction is delayed until the first query so that building a
    /// resolver never touches the system configuration.
    state: Arc<OnceCell<TokioResolver>>,
}

impl HickoryDnsResolver {
    /// A backend reading the system resolver configuration lazily.
    pub fn new() -> HickoryDnsResolver {
        HickoryDnsResolver::default()
    }

    async fn run(
        &self,
        host: &str,
        qtype: QueryType,
        timeout: Option<Duration>,
        sink: &QuerySink,
    ) -> Outcome {
        let resolver = self.state.get_or_init(new_resolver);

        let deliver = async {
            match qtype {
                QueryType::A => {
                    let lookup = resolver.ipv4_lookup(host).await?;
                    for a in lookup.iter() {
                        sink.address(RawRecord::new(a.0));
                    }
                }
                QueryType::Aaaa => {
                    let lookup = resolver.ipv6_lookup(host).await?;
                    for aaaa in lookup.iter() {
                        sink.address(RawRecord::new(aaaa.0));
                    }
                }
            }
            Ok::<(), ResolveError>(())
        };

        let result = match timeout {
            Some(duration) => match tokio::time::timeout(duration, deliver).await {
                Ok(result) => result,
                Err(_elapsed) => return Outcome::Failed(code::EAI_AGAIN),
            },
            None => deliver.await,
        };

        match result {
            Ok(()) => Outcome::AllDone,
            Err(err) if err.is_no_records_found() => Outcome::Failed(code::EAI_NODATA),
            Err(_) => Outcome::Failed(code::EAI_FAIL),
        }
    }
}

impl Resolve for HickoryDnsResolver {
    fn query(
        &self,
        host: &str,
        qtype: QueryType,
        timeout: Option<Duration>,
        sink: QuerySink,
    ) -> crate::Result<()> {
        let resolver = self.clone();
        let host = host.to_owned();
        runtime::global().spawn(async move {
            let outcome = resolver.run(&host, qtype, timeout, &sink).await;
            sink.finish(outcome);
        });
        Ok(())
    }
}

/// Create a new resolver with the default configuration, which reads from
/// the system configuration. If that fails, fall back to hickory_resolver's
/// built-in defaults.
fn new_resolver() -> TokioResolver {
    TokioResolver::builder_tokio()
        .unwrap_or_else(|err| {
            log::debug!(
                "failed to load system DNS configuration, using library defaults: {err:?}"
            );
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
        })
        .build()
}
