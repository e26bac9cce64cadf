use crate::{Error, Result};
use hickory_resolver::{
    Resolver, TokioResolver,
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};
use log::{debug, warn};
use std::{fmt, future::Future, net::Ipv4Addr};
use tokio::runtime::{Builder, Handle, Runtime};

/// Sorted IPv4 addresses of a single domain, rendered as strings
pub type AddressList = Vec<String>;

/// Outcome of a single A query that did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The domain has A records
    Records(Vec<Ipv4Addr>),
    /// The domain exists but has no A records
    NoRecords,
    /// The domain does not exist
    NxDomain,
}

/// Something able to answer A queries
///
/// Anything other than the three [`Answer`] outcomes must be reported as an error, it will abort
/// the whole run.
pub trait ARecordSource {
    /// Query the A records of `domain`
    fn query_a(&self, domain: &str) -> Result<Answer>;
}

/// Resolve `domain` to its IPv4 addresses.
///
/// Addresses are sorted as strings, so `"10.0.0.1"` comes before `"9.0.0.1"`. Duplicates are kept.
/// A missing domain or a domain without A records is logged and yields an empty list.
pub fn resolve<S: ARecordSource + ?Sized>(source: &S, domain: &str) -> Result<AddressList> {
    match source.query_a(domain)? {
        Answer::Records(addrs) => {
            let mut entries = addrs
                .into_iter()
                .map(|addr| addr.to_string())
                .collect::<AddressList>();
            entries.sort();
            debug!("{domain} resolved to {} address(es)", entries.len());
            Ok(entries)
        }
        Answer::NoRecords => {
            warn!("No answer found for {domain} with record type A.");
            Ok(Vec::new())
        }
        Answer::NxDomain => {
            warn!("Domain {domain} does not exist.");
            Ok(Vec::new())
        }
    }
}

/// [`ARecordSource`] backed by `hickory-dns`
///
/// Queries are driven to completion one at a time on a current-thread `tokio` runtime owned by
/// the source. Querying from within an async context is refused with [`Error::AsyncContext`].
pub struct HickorySource {
    resolver: TokioResolver,
    // only taken on drop
    runtime: Option<Runtime>,
}

impl HickorySource {
    /// Build a source querying the name servers of `config`
    pub fn new(config: ResolverConfig, opts: ResolverOpts) -> Result<Self> {
        Self::with_runtime(|| {
            Ok(
                Resolver::builder_with_config(config, TokioConnectionProvider::default())
                    .with_options(opts)
                    .build(),
            )
        })
    }

    /// Build a source from `/etc/resolv.conf` (or the platform equivalent)
    pub fn from_system_conf() -> Result<Self> {
        Self::with_runtime(|| Ok(Resolver::builder_tokio()?.build()))
    }

    fn with_runtime(build: impl FnOnce() -> Result<TokioResolver>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let resolver = {
            let _guard = runtime.enter();
            build()
        };
        match resolver {
            Ok(resolver) => Ok(Self {
                resolver,
                runtime: Some(runtime),
            }),
            Err(e) => {
                runtime.shutdown_background();
                Err(e)
            }
        }
    }

    fn block_on<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        match &self.runtime {
            Some(runtime) if Handle::try_current().is_err() => Ok(runtime.block_on(fut)),
            _ => Err(Error::AsyncContext),
        }
    }
}

impl ARecordSource for HickorySource {
    fn query_a(&self, domain: &str) -> Result<Answer> {
        match self.block_on(self.resolver.ipv4_lookup(domain))? {
            Ok(lookup) => Ok(Answer::Records(lookup.iter().map(|a| a.0).collect())),
            // NXDOMAIN is a special case of "no records", check it first
            Err(e) if e.is_nx_domain() => Ok(Answer::NxDomain),
            Err(e) if e.is_no_records_found() => Ok(Answer::NoRecords),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for HickorySource {
    fn drop(&mut self) {
        // a plain drop blocks, which panics inside an async context
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for HickorySource {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("HickorySource").finish_non_exhaustive()
    }
}
