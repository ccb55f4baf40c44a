//! Loading the OpenEBench registry payload and walking its entries.

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use xz2::read::XzDecoder;

use crate::config::Config;
use crate::http::{HttpRequest, HttpTransport};

use super::errors::{RegistryError, Result};
use super::extract::{FeatureSpec, extract_links};

/// Default registry endpoint.
pub const OPENEBENCH_SOURCE: &str = "https://openebench.bsc.es/monitor/rest/search";

/// Loads the registry payload and yields per-entry candidate links.
///
/// The payload comes either from a local file (transparently XZ-decompressed
/// when the name ends in `.xz`) or from an HTTP GET against the source URL.
/// The raw bytes can be persisted verbatim to a side file before parsing,
/// for later offline replay.
pub struct RegistryQueries {
    transport: Arc<dyn HttpTransport>,
    load_path: Option<PathBuf>,
    save_path: Option<PathBuf>,
    source_url: String,
    features: FeatureSpec,
}

impl RegistryQueries {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            load_path: None,
            save_path: None,
            source_url: OPENEBENCH_SOURCE.to_string(),
            features: FeatureSpec::default(),
        }
    }

    /// Build from the `[registry]` configuration section.
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let mut queries = Self::new(transport);
        if let Some(url) = &config.registry.source_url {
            queries.source_url = url.clone();
        }
        queries.load_path = config.registry.load_path.clone();
        queries.save_path = config.registry.save_path.clone();
        queries
    }

    /// Read the payload from a local file instead of the network.
    #[must_use]
    pub fn with_load_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.load_path = Some(path.into());
        self
    }

    /// Persist the raw payload bytes to `path` before parsing.
    #[must_use]
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureSpec) -> Self {
        self.features = features;
        self
    }

    /// Load, optionally persist, and parse the registry payload, yielding
    /// `(entry id, candidate links)` pairs in payload order.
    ///
    /// A payload that is a single object is treated as a one-element list.
    /// Entries are expected to carry a string `@id`; malformed entries
    /// surface with an empty id rather than being guarded here, so callers
    /// must ensure registry entries are well-formed.
    pub async fn extract_queryable_repo_ids(
        &self,
    ) -> Result<impl Iterator<Item = (String, Vec<String>)> + '_> {
        let raw = self.raw_payload().await?;

        if let Some(save_path) = &self.save_path {
            fs::write(save_path, &raw).map_err(|source| RegistryError::Io {
                path: save_path.clone(),
                source,
            })?;
        }

        let parsed: Value = serde_json::from_slice(&raw)?;
        let entries = match parsed {
            Value::Array(entries) => entries,
            single => vec![single],
        };

        Ok(entries.into_iter().map(move |entry| {
            let id = entry
                .get("@id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let links = extract_links(&entry, &self.features);
            (id, links)
        }))
    }

    async fn raw_payload(&self) -> Result<Vec<u8>> {
        match &self.load_path {
            Some(path) => read_local_payload(path),
            None => {
                tracing::debug!(url = %self.source_url, "fetching registry payload");
                // The endpoint answers in several flavours; pin it to JSON.
                let request = HttpRequest {
                    url: self.source_url.clone(),
                    headers: vec![("Accept".to_string(), "application/json".to_string())],
                };
                let response =
                    self.transport
                        .get(request)
                        .await
                        .map_err(|source| RegistryError::Fetch {
                            url: self.source_url.clone(),
                            source,
                        })?;

                if response.status >= 400 {
                    return Err(RegistryError::Fetch {
                        url: self.source_url.clone(),
                        source: crate::http::HttpError::Transport(format!(
                            "HTTP status {}",
                            response.status
                        )),
                    });
                }

                Ok(response.body)
            }
        }
    }
}

fn read_local_payload(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "xz") {
        let mut decompressed = Vec::new();
        XzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decompressed)
            .map_err(|source| RegistryError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(decompressed)
    } else {
        Ok(bytes)
    }
}
