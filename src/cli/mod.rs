use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;

use crate::interval::{CalendarInterval, Granularity};
use crate::parsers::parse_traffic_payload;
use crate::services::{
    ClientConfig, CredentialSource, Credentials, EnvironmentObservations, ResponseCacheService,
    StatsClient, TableAssembler,
};
use crate::sinks::CsvSink;

const MGMT_SERVER: &str = "https://api.enterprise.apigee.com";

/// Traffic-by-API summarizer for Apigee Edge analytics
#[derive(Parser)]
#[command(name = "traffictally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Name of the Edge organization
    #[arg(short, long)]
    org: String,

    /// Username for authenticating to Edge
    #[arg(short, long)]
    username: Option<String>,

    /// Rely on ~/.netrc for credentials instead of prompting
    #[arg(short, long)]
    netrc: bool,

    /// Four-digit year to report on. Default: the current year
    #[arg(short, long)]
    year: Option<i32>,

    /// Report start in compact form (YYYYMMDD daily, YYYYMM monthly)
    #[arg(long, conflicts_with = "year")]
    from: Option<String>,

    /// Report end in compact form. Default: the end of the start's month
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Day-sized period columns instead of month-sized ones
    #[arg(short, long)]
    daily: bool,

    /// Do not use cached data; always retrieve from the stats API
    #[arg(short = 'N', long)]
    no_cache: bool,

    /// Directory the CSV files are written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Management server base URL
    #[arg(long, default_value = MGMT_SERVER)]
    server: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let granularity = if self.daily {
            Granularity::Daily
        } else {
            Granularity::Monthly
        };

        let interval = match &self.from {
            Some(from) => CalendarInterval::from_compact(from, self.to.as_deref(), granularity)?,
            None => {
                let year = self.year.unwrap_or_else(|| Local::now().year());
                let start = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| anyhow::anyhow!("bad year {}", year))?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| anyhow::anyhow!("bad year {}", year))?;
                CalendarInterval::new(start, end, granularity)?
            }
        };

        if self.verbose {
            println!(
                "reporting {} over {} ({} periods)",
                self.org,
                interval.period_label(),
                interval.period_count()
            );
        }

        let source = if self.netrc {
            CredentialSource::Netrc
        } else {
            println!("\nAuthenticate to {}", self.server);
            CredentialSource::Prompt {
                username: self.username.clone(),
            }
        };
        let credentials = Credentials::resolve(&source, host_of(&self.server))?;

        if !self.no_cache {
            // Entries from previous days can never hit again
            if let Ok(cache) = ResponseCacheService::new() {
                match cache.sweep() {
                    Ok(n) if n > 0 && self.verbose => {
                        println!("swept {} stale cache entries", n);
                    }
                    Ok(_) => {}
                    Err(e) => eprintln!("[traffictally] Warning: cache sweep failed: {}", e),
                }
            }
        }

        let client = StatsClient::new(ClientConfig {
            base_url: self.server.clone(),
            organization: self.org.clone(),
            auth_header: credentials.basic_auth_header(),
            use_cache: !self.no_cache,
            verbose: self.verbose,
        })?;

        let environments = client.list_environments()?;
        if environments.is_empty() {
            eprintln!(
                "[traffictally] Warning: organization {} has no environments",
                self.org
            );
        }

        // One environment at a time, in listed order: rollup seeding is
        // order-sensitive.
        let mut streams = Vec::with_capacity(environments.len());
        for environment in &environments {
            let body = client.fetch_traffic(environment, &interval)?;
            let mut bytes = body.into_bytes();
            let observations = parse_traffic_payload(&mut bytes, self.verbose)?;
            streams.push(EnvironmentObservations {
                environment: environment.clone(),
                observations,
            });
        }

        let tables = TableAssembler::new(&interval).assemble(&self.org, &streams)?;

        let sink = CsvSink::new(&self.output_dir);
        let label = format!("{}-{}", self.org, interval.period_label());

        let detail_path = sink.write(&format!("traffic-by-api--{}", label), &tables.detail)?;
        println!("writing CSV output to   {}", detail_path.display());

        let rollup_path = sink.write(
            &format!("traffic-by-environment--{}", label),
            &tables.rollup,
        )?;
        println!("writing CSV output to   {}", rollup_path.display());

        Ok(())
    }
}

/// Hostname part of the management URL, for the netrc lookup.
fn host_of(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or(without_scheme)
}
