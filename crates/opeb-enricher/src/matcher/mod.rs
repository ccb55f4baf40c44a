//! Repository matching atop a shared rate-limited, paginated fetch loop.
//!
//! A matcher recognizes URLs belonging to one hosting platform and retrieves
//! repository metadata while staying under that platform's hourly request
//! quota. The non-trivial state, timing, and failure handling all live in
//! [`PageFetcher`]; platform implementations ([`crate::github`],
//! [`crate::bitbucket`]) compose it rather than inherit anything.
//!
//! # Example
//!
//! ```ignore
//! use opeb_enricher::{Config, GitHubMatcher, RepoMatcher};
//! use opeb_enricher::http::ReqwestTransport;
//! use std::sync::Arc;
//!
//! let config = Config::load()?;
//! let matcher = GitHubMatcher::new(&config, Arc::new(ReqwestTransport::default()));
//!
//! if let Some(id) = matcher.matches("https://github.com/inab/openEBench") {
//!     let outcome = matcher.repo_metadata(&id).await?;
//!     if !outcome.success {
//!         // Partial data: an HTTP error truncated the page sequence.
//!     }
//! }
//! ```

mod errors;
mod fetcher;
mod quota;
mod types;

pub use errors::{FetchError, Result};
pub use fetcher::PageFetcher;
pub use quota::{DEFAULT_REQUESTS_PER_WINDOW, RateQuota, WINDOW_SECONDS};
pub use types::{
    BUILD_SYSTEMS_BY_LANG, COMPILED_LANGUAGES, Credentials, FetchOutcome, INTERPRETED_LANGUAGES,
    LanguageKind, RepoId, RepoMatcher, build_system_for, classify_language,
};
