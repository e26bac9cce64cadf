use crate::{AddressList, Error, Result};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::{
    convert::Infallible,
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

/// Domains and their addresses, in the order the domains were supplied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<(String, AddressList)>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the addresses of `domain`.
    ///
    /// A domain that is already present keeps its position and gets its addresses replaced.
    pub fn insert(&mut self, domain: impl Into<String>, addresses: AddressList) {
        let domain = domain.into();
        match self.entries.iter_mut().find(|(d, _)| *d == domain) {
            Some((_, existing)) => *existing = addresses,
            None => self.entries.push((domain, addresses)),
        }
    }

    /// Addresses recorded for `domain`
    pub fn get(&self, domain: &str) -> Option<&AddressList> {
        self.entries
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, addrs)| addrs)
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AddressList)> {
        self.entries.iter().map(|(d, addrs)| (d.as_str(), addrs))
    }

    /// Number of domains in the report
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report holds no domain at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the report into `writer`
    pub fn render<W: Write>(&self, format: Format, mut writer: W) -> Result<()> {
        match format {
            Format::Text => {
                for (domain, addrs) in self.iter() {
                    writeln!(writer, "# {domain}")?;
                    for addr in addrs {
                        writeln!(writer, "{addr}")?;
                    }
                }
            }
            Format::Json => {
                let mut ser = serde_json::Serializer::with_formatter(&mut writer, SpacedFormatter);
                self.serialize(&mut ser)?;
            }
        }
        Ok(())
    }

    /// Serialize the report to `target`.
    ///
    /// A file target is truncated and closed once writing is over, whether it succeeded or not.
    /// Standard output is flushed but stays open.
    pub fn write(&self, target: &OutputTarget, format: Format) -> Result<()> {
        match target {
            OutputTarget::Stdout => {
                let mut out = io::stdout().lock();
                self.render(format, &mut out)?;
                out.flush()?;
            }
            OutputTarget::File(path) => {
                let mut out = BufWriter::new(File::create(path)?);
                self.render(format, &mut out)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<D: Into<String>> FromIterator<(D, AddressList)> for Report {
    fn from_iter<I: IntoIterator<Item = (D, AddressList)>>(iter: I) -> Self {
        let mut report = Report::new();
        for (domain, addrs) in iter {
            report.insert(domain, addrs);
        }
        report
    }
}

/// JSON layout with a space after `:` and `,`, e.g. `{"a.test": ["1.2.3.4", "1.2.3.5"]}`
///
/// Non-ASCII domains are written as raw UTF-8, never as `\uXXXX` escapes.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Output format of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `# <domain>` header lines, each followed by one address per line
    #[default]
    Text,
    /// A single JSON object mapping domains to arrays of addresses
    Json,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "txt" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(Error::UnknownFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Text => "txt",
            Format::Json => "json",
        })
    }
}

/// Where a report gets written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output, spelled `-`
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(match s {
            "-" => OutputTarget::Stdout,
            path => OutputTarget::File(PathBuf::from(path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rendered(report: &Report, format: Format) -> String {
        let mut buf = Vec::new();
        report.render(format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> Report {
        Report::from_iter([
            ("a.test", vec![]),
            ("b.test", vec!["1.2.3.3".to_owned(), "1.2.3.4".to_owned()]),
        ])
    }

    #[test]
    fn text_layout() {
        assert_eq!(
            rendered(&sample(), Format::Text),
            "# a.test\n# b.test\n1.2.3.3\n1.2.3.4\n"
        );
    }

    #[test]
    fn json_layout() {
        assert_eq!(
            rendered(&sample(), Format::Json),
            r#"{"a.test": [], "b.test": ["1.2.3.3", "1.2.3.4"]}"#
        );
        let nx = Report::from_iter([("nxdomain.invalid", vec![])]);
        assert_eq!(rendered(&nx, Format::Json), r#"{"nxdomain.invalid": []}"#);
    }

    #[test]
    fn json_keeps_utf8_domains() {
        let report = Report::from_iter([("bücher.test", vec![])]);
        assert_eq!(rendered(&report, Format::Json), r#"{"bücher.test": []}"#);
    }

    #[test]
    fn json_decodes_back() {
        let report = sample();
        let decoded: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&rendered(&report, Format::Json)).unwrap();
        assert_eq!(decoded.len(), report.len());
        for (domain, addrs) in report.iter() {
            assert_eq!(decoded.get(domain), Some(addrs));
        }
    }

    #[test]
    fn empty_report() {
        assert_eq!(rendered(&Report::new(), Format::Text), "");
        assert_eq!(rendered(&Report::new(), Format::Json), "{}");
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut report = sample();
        report.insert("a.test", vec!["5.5.5.5".to_owned()]);
        let domains = report.iter().map(|(d, _)| d).collect::<Vec<_>>();
        assert_eq!(domains, ["a.test", "b.test"]);
        assert_eq!(report.get("a.test").unwrap(), &["5.5.5.5"]);
    }

    #[test]
    fn parse_format() {
        assert_eq!("txt".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert!(matches!("yaml".parse::<Format>(), Err(Error::UnknownFormat(f)) if f == "yaml"));
    }

    #[test]
    fn parse_target() {
        assert_eq!("-".parse::<OutputTarget>().unwrap(), OutputTarget::Stdout);
        assert_eq!(
            "out/ips.txt".parse::<OutputTarget>().unwrap(),
            OutputTarget::File(PathBuf::from("out/ips.txt"))
        );
    }

    #[test]
    fn file_targets_are_identical() {
        let report = sample();
        let dir = std::env::temp_dir();
        let first = dir.join(format!("outbound-ip-monitor-{}-first.json", std::process::id()));
        let second = dir.join(format!("outbound-ip-monitor-{}-second.json", std::process::id()));
        // truncation
        std::fs::write(&second, "stale content that is longer than the report itself").unwrap();

        report
            .write(&OutputTarget::File(first.clone()), Format::Json)
            .unwrap();
        report
            .write(&OutputTarget::File(second.clone()), Format::Json)
            .unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        std::fs::remove_file(&first).unwrap();
        std::fs::remove_file(&second).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, rendered(&report, Format::Json).into_bytes());
    }
}
