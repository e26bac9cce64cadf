#![deny(missing_docs, missing_debug_implementations)]

//! outbound-ip-monitor
//!
//! Snapshot the current IPv4 addresses of a list of domains
//!
//! Every domain gets one A query through `hickory-dns`, one after the other. The answers are
//! gathered into a [`Report`] which is then written as plain text or JSON. A domain that does not
//! exist, or that has no A record, ends up with an empty address list; any other resolver failure
//! aborts the run.
//!
//! ## Example
//!
//! ```rust,no_run
//! use outbound_ip_monitor::{Format, HickorySource, OutputTarget, generate};
//!
//! let source = HickorySource::from_system_conf()?;
//! let report = generate(&source, ["www.rust-lang.org", "crates.io"])?;
//! report.write(&OutputTarget::Stdout, Format::Json)?;
//! # Ok::<(), outbound_ip_monitor::Error>(())
//! ```

mod error;
mod report;
mod resolve;

pub use error::{Error, Result};
pub use report::{Format, OutputTarget, Report};
pub use resolve::{ARecordSource, AddressList, Answer, HickorySource, resolve};

use log::info;

/// Resolve every domain in order and gather the results.
///
/// Each domain appears exactly once in the report. The first fatal resolver error is returned
/// as is and nothing gathered so far is kept.
pub fn generate<S, I>(source: &S, domains: I) -> Result<Report>
where
    S: ARecordSource + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut report = Report::new();
    for domain in domains {
        let domain = domain.as_ref();
        report.insert(domain, resolve(source, domain)?);
    }
    info!(
        "Resolved {} domain(s), {} address(es)",
        report.len(),
        report.iter().map(|(_, addrs)| addrs.len()).sum::<usize>()
    );
    Ok(report)
}

/// Split a comma separated domain list, trimming every entry and dropping empty ones
///
/// Empty entries are never queried, so `""` or `"a.test,"` do not produce a blank domain.
pub fn parse_domains(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::StaticSource;

    #[test]
    fn keeps_supplied_order() {
        let source = StaticSource::default()
            .with("a.test", Answer::NoRecords)
            .records("b.test", &["1.2.3.4", "1.2.3.3"]);
        let report = generate(&source, ["a.test", "b.test"]).unwrap();
        let mut out = Vec::new();
        report.render(Format::Text, &mut out).unwrap();
        assert_eq!(out, b"# a.test\n# b.test\n1.2.3.3\n1.2.3.4\n");
    }

    #[test]
    fn single_domain() {
        let source = StaticSource::default().records("example.com", &["93.184.216.34"]);
        let report = generate(&source, ["example.com"]).unwrap();
        let mut out = Vec::new();
        report.render(Format::Text, &mut out).unwrap();
        assert_eq!(out, b"# example.com\n93.184.216.34\n");
    }

    #[test]
    fn repeated_domain_once() {
        let source = StaticSource::default()
            .records("a.test", &["1.1.1.1"])
            .with("b.test", Answer::NxDomain);
        let report = generate(&source, ["a.test", "b.test", "a.test"]).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.get("a.test").unwrap(), &["1.1.1.1"]);
    }

    #[test]
    fn fatal_error_aborts() {
        let source = StaticSource::default().records("a.test", &["1.1.1.1"]);
        assert!(matches!(
            generate(&source, ["a.test", "down.test"]),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn splits_domain_list() {
        assert_eq!(
            parse_domains(" example.com, a.test ,,b.test,"),
            ["example.com", "a.test", "b.test"]
        );
        assert!(parse_domains("").is_empty());
        assert!(parse_domains(" , ").is_empty());
    }
}
