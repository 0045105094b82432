//! Services for retrieval, aggregation, and rollup

pub mod accumulator;
pub mod assembler;
pub mod cache;
pub mod client;
pub mod credentials;
pub mod rollup;
pub mod summarizer;

pub use accumulator::ObservationAccumulator;
pub use assembler::{EnvironmentObservations, TableAssembler};
pub use cache::ResponseCacheService;
pub use client::{ClientConfig, StatsClient};
pub use credentials::{CredentialSource, Credentials};
pub use rollup::rollup_environments;
