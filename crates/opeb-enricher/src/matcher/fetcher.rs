//! The rate-limited, paginated fetch loop shared by all matchers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::http::{HttpRequest, HttpTransport};

use super::errors::{FetchError, Result};
use super::quota::RateQuota;
use super::types::{Credentials, FetchOutcome};

/// Shared fetch component every matcher composes.
///
/// One instance per matcher: the transport, the resolved auth header, and the
/// quota are set up once at construction and reused across every paginated
/// call, so auth state and the throttling budget stay stable for the
/// matcher's lifetime.
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    quota: RateQuota,
    authorization: Option<String>,
}

impl PageFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        quota: RateQuota,
        credentials: &Credentials,
    ) -> Self {
        Self {
            transport,
            quota,
            authorization: credentials.authorization_header(),
        }
    }

    #[must_use]
    pub fn quota(&self) -> &RateQuota {
        &self.quota
    }

    /// Fetch a JSON resource, following `rel='next'` pagination links.
    ///
    /// Issues a GET to `start_url` (with the optional `Accept` header),
    /// accumulates the JSON body of every page (array bodies element-wise,
    /// object bodies as one item), and follows the next-page link advertised
    /// in the response `Link` header until none remains.
    ///
    /// `max_follows` bounds how many next-page links are followed beyond the
    /// first fetch; zero or negative means "run until no next link". The
    /// bound is spent one follow at a time, and the page a spent follow led
    /// to is still fetched before the loop stops: `max_follows = 1` with
    /// three linked pages fetches two pages total.
    ///
    /// Every request pays whatever remains of `period` (the quota's memoized
    /// period unless one is supplied) before the call moves on, the final
    /// page and HTTP error responses included, so back-to-back calls through
    /// the same fetcher stay under the platform's hourly budget no matter
    /// how fast the server answers.
    ///
    /// An HTTP error response stops the loop and returns
    /// `success = false` with every page accumulated so far; transport and
    /// JSON-decode failures abort the call with a fatal error instead.
    pub async fn fetch_json(
        &self,
        start_url: &str,
        accept: Option<&str>,
        max_follows: i64,
        period: Option<Duration>,
    ) -> Result<FetchOutcome> {
        let period = period.unwrap_or_else(|| self.quota.period());

        let mut items: Vec<Value> = Vec::new();
        let mut url = start_url.to_string();
        let mut follows: i64 = 0;

        loop {
            let started = tokio::time::Instant::now();

            let mut headers = Vec::new();
            if let Some(accept) = accept {
                headers.push(("Accept".to_string(), accept.to_string()));
            }
            if let Some(auth) = &self.authorization {
                headers.push(("Authorization".to_string(), auth.clone()));
            }

            let response = match self
                .transport
                .get(HttpRequest {
                    url: url.clone(),
                    headers,
                })
                .await
            {
                Ok(response) => response,
                Err(source) => return Err(FetchError::Transport { url, source }),
            };

            let kicked_out = response.status >= 400;
            let mut next = None;
            if kicked_out {
                // Show must go on: the caller gets whatever was fetched so
                // far instead of an error.
                tracing::warn!(status = response.status, %url, "kicked out of paginated fetch");
            } else {
                let body: Value = serde_json::from_slice(&response.body)
                    .map_err(|source| FetchError::Decode {
                        url: url.clone(),
                        source,
                    })?;
                match body {
                    Value::Array(page) => items.extend(page),
                    single => items.push(single),
                }

                next = response.header("link").and_then(next_page_url);
            }

            // Every request pays the full period, even the last one of the
            // call, so the budget holds across consecutive calls.
            let elapsed = started.elapsed();
            if period > elapsed {
                tokio::time::sleep(period - elapsed).await;
            }

            if kicked_out {
                return Ok(FetchOutcome {
                    success: false,
                    items,
                });
            }

            let Some(next_url) = next else { break };
            if max_follows > 0 && follows == max_follows {
                break;
            }
            follows += 1;

            tracing::debug!(%next_url, "following pagination link");
            url = next_url;
        }

        Ok(FetchOutcome {
            success: true,
            items,
        })
    }
}

/// Extract the `rel='next'` URL from a `Link` header.
///
/// The header value is a comma-separated list of `<url>; rel='relation'`
/// segments; only the `next` relation is consulted and the angle brackets
/// around the URL are stripped. Both single- and double-quoted relation
/// values are accepted.
pub(crate) fn next_page_url(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches(|c| c == '"' || c == '\''));
            }
        }

        if rel == Some("next") {
            if let Some(url) = url {
                return Some(url.to_string());
            }
        }
    }

    None
}
