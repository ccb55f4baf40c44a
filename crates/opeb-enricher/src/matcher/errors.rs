//! Error types for the rate-limited paginated fetcher.

use thiserror::Error;

use crate::http::HttpError;

/// Fatal failures of a paginated fetch call.
///
/// Ordinary HTTP error responses (4xx/5xx) are deliberately *not* represented
/// here: the fetch loop reports them through
/// [`FetchOutcome::success`](super::FetchOutcome) so that a single
/// repository's API hiccup does not abort a batch enrichment run. The
/// variants below indicate that the endpoint, network, or payload is
/// unusable and the current call must stop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, or TLS failure while talking to the platform API.
    #[error("kicked out of {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },

    /// The platform returned a body that is not valid JSON.
    #[error("JSON parsing error on {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_carries_url_and_cause() {
        let err = FetchError::Transport {
            url: "https://api.example.org/repos".to_string(),
            source: HttpError::Transport("connection refused".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://api.example.org/repos"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn decode_error_carries_url_and_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = FetchError::Decode {
            url: "https://api.example.org/repos".to_string(),
            source: cause,
        };
        assert!(err.to_string().starts_with("JSON parsing error on"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
