//! GitHub repository matcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::http::HttpTransport;
use crate::matcher::{
    Credentials, FetchOutcome, PageFetcher, RateQuota, RepoId, RepoMatcher, Result,
    build_system_for, classify_language,
};

pub const GITHUB_KIND: &str = "github";
pub const GITHUB_API: &str = "https://api.github.com";
pub const GITHUB_HOST: &str = "github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Single-segment github.com paths that are site features, not owners.
fn is_reserved_owner(segment: &str) -> bool {
    matches!(
        segment.to_lowercase().as_str(),
        "about"
            | "apps"
            | "collections"
            | "explore"
            | "features"
            | "login"
            | "logout"
            | "marketplace"
            | "notifications"
            | "orgs"
            | "pricing"
            | "search"
            | "settings"
            | "site"
            | "topics"
            | "users"
    )
}

/// Matches `github.com/{owner}/{repo}` URLs and retrieves repository
/// metadata from the GitHub REST API through the shared fetch loop.
pub struct GitHubMatcher {
    credentials: Credentials,
    fetcher: PageFetcher,
}

impl GitHubMatcher {
    /// Resolve credentials and quota from the `[github]` section and build
    /// the matcher's one reusable fetcher.
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let section = &config.github;
        let credentials = Credentials::basic(
            GITHUB_API,
            section.user.clone(),
            section.token.clone(),
        );
        let quota = RateQuota::from_config(config, GITHUB_KIND);
        let fetcher = PageFetcher::new(transport, quota, &credentials);

        Self {
            credentials,
            fetcher,
        }
    }

    #[must_use]
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Fetch the per-language byte counts for a repository and fold them
    /// into an execution-kind profile.
    async fn language_profile(&self, id: &RepoId) -> Result<Option<Value>> {
        let url = format!("{GITHUB_API}/repos/{}/{}/languages", id.owner, id.name);
        let outcome = self.fetcher.fetch_json(&url, Some(GITHUB_ACCEPT), 0, None).await?;
        if !outcome.success {
            return Ok(None);
        }

        let Some(Value::Object(languages)) = outcome.items.first() else {
            return Ok(None);
        };

        let mut kinds = serde_json::Map::new();
        let mut build_systems = Vec::new();
        for language in languages.keys() {
            if let Some(system) = build_system_for(language) {
                build_systems.push(Value::String(system.to_string()));
            } else {
                kinds.insert(
                    language.clone(),
                    Value::String(classify_language(language).as_str().to_string()),
                );
            }
        }

        Ok(Some(serde_json::json!({
            "languages": kinds,
            "build_systems": build_systems,
        })))
    }
}

#[async_trait]
impl RepoMatcher for GitHubMatcher {
    fn kind(&self) -> &'static str {
        GITHUB_KIND
    }

    fn matches(&self, url: &str) -> Option<RepoId> {
        let parsed = Url::parse(url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        if host != GITHUB_HOST {
            return None;
        }

        let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 || is_reserved_owner(segments[0]) {
            return None;
        }

        let name = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
        if name.is_empty() {
            return None;
        }

        Some(RepoId::new(segments[0], name))
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn repo_metadata(&self, id: &RepoId) -> Result<FetchOutcome> {
        let url = format!("{GITHUB_API}/repos/{}/{}", id.owner, id.name);
        let mut outcome = self.fetcher.fetch_json(&url, Some(GITHUB_ACCEPT), 0, None).await?;
        if !outcome.success {
            return Ok(outcome);
        }

        if let Some(profile) = self.language_profile(id).await? {
            if let Some(Value::Object(repo)) = outcome.items.first_mut() {
                repo.insert("language_profile".to_string(), profile);
            }
        }

        Ok(outcome)
    }
}
