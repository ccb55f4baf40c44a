//! Error types for registry payload loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::HttpError;

/// Failures while obtaining or parsing the registry payload.
///
/// All of these are fatal for the extraction pass: they mean the payload as
/// a whole is unusable, unlike per-repository fetch hiccups downstream.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Could not fetch the payload over HTTP.
    #[error("could not fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: HttpError,
    },

    /// Could not read or write a local payload file.
    #[error("could not access registry payload at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not well-formed JSON.
    #[error("bad-formed registry JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_preserve_their_causes() {
        let fetch = RegistryError::Fetch {
            url: "https://registry.example.org".to_string(),
            source: HttpError::Transport("dns failure".to_string()),
        };
        assert!(std::error::Error::source(&fetch).is_some());

        let io = RegistryError::Io {
            path: PathBuf::from("/tmp/payload.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&io).is_some());

        let parse: RegistryError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(parse.to_string().starts_with("bad-formed registry JSON"));
    }
}
