use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use futures::StreamExt;
use std::path::PathBuf;

use webcheck::{
    config::CheckConfig,
    output::{OutputConfig, OutputFormat, OutputManager},
    scanner::{CheckEngine, CheckSummary},
    utils::file_input::HostFileReader,
};

fn build_cli() -> Command {
    Command::new("webcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read a list of hosts from FILE and report servers listening on ports 80 or 443")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Host list, one name per line; blank lines and lines starting with '#' are ignored")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML config file (default: ~/.webcheck.toml if present)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ports")
                .short('p')
                .long("ports")
                .value_name("PORTS")
                .help("Comma separated candidate ports, probed and reported in order [default: 80,443]")
                .value_delimiter(',')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("MS")
                .help("Timeout for each connection attempt in milliseconds [default: 3000]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("resolve-timeout")
                .long("resolve-timeout")
                .value_name("MS")
                .help("Timeout for each DNS lookup in milliseconds [default: 5000]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("COUNT")
                .help("Number of hosts checked concurrently")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json", "grep"])
                .default_value("text"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write results to FILE instead of stdout"),
        )
        .arg(
            Arg::new("dedup")
                .long("dedup")
                .help("Check each distinct host name only once")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-hosts")
                .long("max-hosts")
                .value_name("COUNT")
                .help("Check at most COUNT hosts from the top of FILE")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable coloured output")
                .action(ArgAction::SetTrue),
        )
}

/// Config file (explicit or default location) with command line overrides on top
fn load_config(matches: &ArgMatches) -> anyhow::Result<CheckConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => CheckConfig::from_toml_file(path)?,
        None => CheckConfig::load_default_config(),
    };

    if let Some(ports) = matches.get_many::<u16>("ports") {
        config.ports = ports.copied().collect();
    }
    if let Some(&timeout) = matches.get_one::<u64>("timeout") {
        config.timeout = timeout;
    }
    if let Some(&resolve_timeout) = matches.get_one::<u64>("resolve-timeout") {
        config.resolve_timeout = resolve_timeout;
    }
    if let Some(&workers) = matches.get_one::<usize>("workers") {
        config.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

fn output_config(matches: &ArgMatches) -> anyhow::Result<OutputConfig> {
    let format = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<OutputFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(OutputFormat::Text);

    let colored = !matches.get_flag("no-color");
    if !colored {
        colored::control::set_override(false);
    }

    Ok(OutputConfig {
        format,
        file: matches.get_one::<String>("output").cloned(),
        colored,
    })
}

fn host_reader(matches: &ArgMatches) -> HostFileReader {
    let reader = HostFileReader::new().deduplicate(matches.get_flag("dedup"));
    match matches.get_one::<usize>("max-hosts") {
        Some(&max) => reader.max_hosts(max),
        None => reader,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();
    let config = load_config(&matches)?;

    let infile = matches
        .get_one::<PathBuf>("file")
        .context("missing required file argument")?;
    let (hosts, stats) = host_reader(&matches).read_hosts_from_file(infile)?;
    if hosts.is_empty() {
        bail!("empty hosts file");
    }
    log::info!(
        "Checking {} hosts from {} ({} lines skipped, {} duplicates removed)",
        stats.hosts,
        infile.display(),
        stats.skipped_lines,
        stats.duplicates_removed
    );

    let mut output = OutputManager::new(output_config(&matches)?).context("Failed to open output")?;
    let engine = CheckEngine::new(config)?;

    let mut summary = CheckSummary::new();
    let mut results = engine.check_all(hosts);
    while let Some(result) = results.next().await {
        summary.record(&result);
        output.write_result(&result).context("Failed to write result")?;
    }
    output.flush()?;
    summary.finish();

    log::info!("{}", summary);
    Ok(())
}
