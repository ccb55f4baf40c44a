//! Bitbucket repository matcher.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::Config;
use crate::http::HttpTransport;
use crate::matcher::{
    Credentials, FetchOutcome, PageFetcher, RateQuota, RepoId, RepoMatcher, Result,
};

pub const BITBUCKET_KIND: &str = "bitbucket";
pub const BITBUCKET_API: &str = "https://api.bitbucket.org/2.0";
pub const BITBUCKET_HOST: &str = "bitbucket.org";

const BITBUCKET_ACCEPT: &str = "application/json";

/// Matches `bitbucket.org/{workspace}/{slug}` URLs and retrieves repository
/// metadata from the Bitbucket 2.0 API through the shared fetch loop.
pub struct BitbucketMatcher {
    credentials: Credentials,
    fetcher: PageFetcher,
}

impl BitbucketMatcher {
    /// Resolve credentials and quota from the `[bitbucket]` section and
    /// build the matcher's one reusable fetcher.
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let section = &config.bitbucket;
        let credentials = Credentials::basic(
            BITBUCKET_API,
            section.user.clone(),
            section.token.clone(),
        );
        let quota = RateQuota::from_config(config, BITBUCKET_KIND);
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
}

#[async_trait]
impl RepoMatcher for BitbucketMatcher {
    fn kind(&self) -> &'static str {
        BITBUCKET_KIND
    }

    fn matches(&self, url: &str) -> Option<RepoId> {
        let parsed = Url::parse(url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        if host != BITBUCKET_HOST {
            return None;
        }

        let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return None;
        }

        let slug = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
        if slug.is_empty() {
            return None;
        }

        Some(RepoId::new(segments[0], slug))
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn repo_metadata(&self, id: &RepoId) -> Result<FetchOutcome> {
        let url = format!("{BITBUCKET_API}/repositories/{}/{}", id.owner, id.name);
        self.fetcher
            .fetch_json(&url, Some(BITBUCKET_ACCEPT), 0, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use serde_json::json;

    fn matcher_with(transport: &MockTransport, toml: &str) -> BitbucketMatcher {
        let config = Config::from_toml_str(toml).expect("config should parse");
        BitbucketMatcher::new(&config, Arc::new(transport.clone()))
    }

    #[test]
    fn matches_workspace_slug_urls() {
        let matcher = matcher_with(&MockTransport::new(), "");

        assert_eq!(
            matcher.matches("https://bitbucket.org/genomics/caller"),
            Some(RepoId::new("genomics", "caller"))
        );
        assert_eq!(
            matcher.matches("https://www.bitbucket.org/ws/tool.git"),
            Some(RepoId::new("ws", "tool"))
        );
        assert_eq!(
            matcher.matches("https://bitbucket.org/ws/tool/src/master/"),
            Some(RepoId::new("ws", "tool"))
        );
    }

    #[test]
    fn rejects_foreign_and_malformed_urls() {
        let matcher = matcher_with(&MockTransport::new(), "");

        assert_eq!(matcher.matches("https://github.com/owner/repo"), None);
        assert_eq!(matcher.matches("https://bitbucket.org/onlyws"), None);
        assert_eq!(matcher.matches("mailto:someone@bitbucket.org"), None);
    }

    #[test]
    fn kind_names_the_config_section() {
        let matcher = matcher_with(&MockTransport::new(), "");
        assert_eq!(matcher.kind(), "bitbucket");
    }

    #[test]
    fn quota_falls_back_to_the_default_section() {
        let matcher = matcher_with(
            &MockTransport::new(),
            r#"
            [default]
            numreq = 900
            "#,
        );
        assert_eq!(matcher.fetcher().quota().requests_per_window(), 900);
    }

    #[tokio::test(start_paused = true)]
    async fn repo_metadata_hits_the_v2_repositories_endpoint() {
        let transport = MockTransport::new();
        transport.push_json_page(
            "https://api.bitbucket.org/2.0/repositories/genomics/caller",
            200,
            r#"{"slug": "caller", "scm": "git"}"#,
            None,
        );

        let matcher = matcher_with(
            &transport,
            r#"
            [bitbucket]
            user = "ws-user"
            token = "app-password"
            "#,
        );
        let outcome = matcher
            .repo_metadata(&RepoId::new("genomics", "caller"))
            .await
            .expect("metadata fetch should succeed");

        assert!(outcome.success);
        assert_eq!(outcome.items[0]["slug"], json!("caller"));

        let requests = transport.requests();
        assert!(
            requests[0]
                .request
                .headers
                .iter()
                .any(|(k, v)| k == "Authorization" && v.starts_with("Basic "))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repo_metadata_reports_http_errors_as_unsuccessful() {
        let transport = MockTransport::new();
        transport.push_json_page(
            "https://api.bitbucket.org/2.0/repositories/ws/gone",
            404,
            r#"{"type": "error"}"#,
            None,
        );

        let matcher = matcher_with(&transport, "");
        let outcome = matcher
            .repo_metadata(&RepoId::new("ws", "gone"))
            .await
            .expect("404 is not fatal");
        assert!(!outcome.success);
    }
}
