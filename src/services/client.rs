//! Management API client (retrieval collaborator)
//!
//! Lists an organization's environments and fetches per-environment traffic
//! stats, consulting the response cache before touching the network. All
//! requests are synchronous; environments are fetched one at a time in the
//! listed order.

use crate::interval::CalendarInterval;
use crate::services::cache::ResponseCacheService;
use crate::types::{Result, TallyError};
use serde::Deserialize;
use std::time::Duration;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything the client needs, resolved once by the CLI.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Management server base URL, e.g. `https://api.enterprise.apigee.com`
    pub base_url: String,
    pub organization: String,
    /// Pre-built `Basic ...` header value
    pub auth_header: String,
    /// `false` bypasses the response cache entirely
    pub use_cache: bool,
    pub verbose: bool,
}

/// Environments listing payload (`GET v1/o/{org}`)
#[derive(Deserialize)]
struct OrganizationDetail {
    #[serde(default)]
    environments: Vec<String>,
}

pub struct StatsClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    cache: Option<ResponseCacheService>,
}

impl StatsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let cache = if config.use_cache {
            match ResponseCacheService::new() {
                Ok(c) => Some(c),
                Err(e) => {
                    eprintln!("[traffictally] Warning: cache unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// List the organization's environments, in the order the server
    /// reports them. That order is preserved downstream because rollup
    /// seeding is order-sensitive.
    pub fn list_environments(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/v1/o/{}",
            self.config.base_url, self.config.organization
        );
        println!("GET \"{}\"", url);

        let response = self
            .http
            .get(&url)
            .header("authorization", &self.config.auth_header)
            .header("accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(TallyError::Config(format!(
                "environment listing failed: HTTP {}",
                response.status()
            )));
        }

        let detail: OrganizationDetail = response.json()?;
        Ok(detail.environments)
    }

    /// Fetch the raw stats payload for one environment over the interval.
    /// Today's cached body is reused unless caching is off.
    pub fn fetch_traffic(&self, environment: &str, interval: &CalendarInterval) -> Result<String> {
        let url = format!(
            "{}/v1/o/{}/e/{}/stats/apis",
            self.config.base_url, self.config.organization, environment
        );
        let query = [
            ("select", "sum(message_count)".to_string()),
            ("timeUnit", interval.granularity().time_unit().to_string()),
            ("timeRange", time_range(interval)),
        ];

        let descriptor = format!(
            "GET {}?select={}&timeUnit={}&timeRange={}",
            url, query[0].1, query[1].1, query[2].1
        );

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.lookup(&descriptor) {
                println!("using cached data.");
                return Ok(body);
            }
        }

        println!("GET \"{}\"", descriptor.trim_start_matches("GET "));
        let response = self
            .http
            .get(&url)
            .query(&query)
            .header("authorization", &self.config.auth_header)
            .header("accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(TallyError::Config(format!(
                "stats query for {} failed: HTTP {}",
                environment,
                response.status()
            )));
        }

        let body = response.text()?;
        if self.config.verbose {
            println!("{}", body);
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&descriptor, &body) {
                eprintln!("[traffictally] Warning: failed to cache response: {}", e);
            }
        }

        Ok(body)
    }
}

/// `MM/DD/YYYY 00:00~MM/DD/YYYY 00:00` range the stats API expects.
fn time_range(interval: &CalendarInterval) -> String {
    format!(
        "{}~{}",
        interval.start().format("%m/%d/%Y 00:00"),
        interval.end().format("%m/%d/%Y 00:00")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Granularity;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_time_range_format() {
        let interval =
            CalendarInterval::new(date(2018, 1, 1), date(2018, 12, 31), Granularity::Monthly)
                .unwrap();
        assert_eq!(time_range(&interval), "01/01/2018 00:00~12/31/2018 00:00");
    }

    #[test]
    fn test_environments_payload_deserializes() {
        let detail: OrganizationDetail =
            serde_json::from_str(r#"{"name":"acme","environments":["test","prod"]}"#).unwrap();
        assert_eq!(detail.environments, vec!["test", "prod"]);
    }

    #[test]
    fn test_environments_payload_defaults_empty() {
        let detail: OrganizationDetail = serde_json::from_str(r#"{"name":"acme"}"#).unwrap();
        assert!(detail.environments.is_empty());
    }
}
