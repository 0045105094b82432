//! Parsers for analytics API payloads

mod stats;

pub use stats::parse_traffic_payload;
