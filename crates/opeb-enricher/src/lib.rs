//! OpenEBench repository enricher.
//!
//! This library discovers and enriches metadata about open-source scientific
//! software by cross-referencing OpenEBench registry entries with code
//! hosting platforms (GitHub, Bitbucket).
//!
//! Two collaborating components:
//!
//! - the **registry extractor** ([`registry`]) loads the registry payload
//!   (from the network or a local, possibly XZ-compressed file) and walks a
//!   declarative feature map to collect candidate repository links per tool;
//! - the **rate-limited fetcher** ([`matcher`]) is a reusable paginated
//!   fetch loop that follows `rel='next'` links, paces itself under a
//!   per-platform hourly quota, and returns partial results instead of
//!   failing when a platform answers with an HTTP error.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use opeb_enricher::{Config, GitHubMatcher, RegistryQueries, RepoMatcher};
//! use opeb_enricher::http::ReqwestTransport;
//!
//! let config = Config::load()?;
//! let transport = Arc::new(ReqwestTransport::default());
//!
//! let queries = RegistryQueries::from_config(&config, transport.clone());
//! let github = GitHubMatcher::new(&config, transport);
//!
//! for (id, links) in queries.extract_queryable_repo_ids().await? {
//!     for link in links {
//!         if let Some(repo) = github.matches(&link) {
//!             let outcome = github.repo_metadata(&repo).await?;
//!             // outcome.success == false means partial data, not failure.
//!         }
//!     }
//! }
//! ```

pub mod bitbucket;
pub mod config;
pub mod github;
pub mod http;
pub mod matcher;
pub mod registry;

pub use bitbucket::BitbucketMatcher;
pub use config::{Config, ConfigError};
pub use github::GitHubMatcher;
pub use matcher::{
    Credentials, FetchError, FetchOutcome, PageFetcher, RateQuota, RepoId, RepoMatcher,
};
pub use registry::{FeatureSpec, OPENEBENCH_SOURCE, RegistryError, RegistryQueries, extract_links};
