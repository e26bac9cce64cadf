use clap::{CommandFactory, Parser};
use env_logger::Env;
use outbound_ip_monitor::{Format, HickorySource, OutputTarget, generate, parse_domains};
use std::process::exit;

/// Resolve the IPv4 addresses of a list of domains and write them to a file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma separated list of domains, may be given several times
    #[arg(short, long)]
    domains: Vec<String>,

    /// Output file, `-` for standard output
    #[arg(short, long, default_value = "output.txt")]
    output: OutputTarget,

    /// Output format: `txt` or `json`
    #[arg(short, long, default_value_t = Format::Text)]
    format: Format,
}

impl Args {
    fn domains(&self) -> Vec<String> {
        self.domains.iter().flat_map(|list| parse_domains(list)).collect()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let domains = args.domains();
    if domains.is_empty() {
        println!("No domains provided");
        Args::command().print_help()?;
        exit(1);
    }

    let source = HickorySource::from_system_conf()?;
    let report = generate(&source, &domains)?;
    report.write(&args.output, args.format)?;
    Ok(())
}
