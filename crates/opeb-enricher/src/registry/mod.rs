//! OpenEBench registry loading and candidate-link extraction.
//!
//! The registry payload is a JSON list of tool entries. For each entry a
//! declarative [`FeatureSpec`] names the fields that may hold repository
//! links; [`RegistryQueries`] loads the payload (from the network or a
//! local, possibly XZ-compressed file) and yields `(entry id, links)` pairs
//! for downstream platform matching.

mod errors;
mod extract;
mod queries;

pub use errors::{RegistryError, Result};
pub use extract::{FeatureSpec, extract_links};
pub use queries::{OPENEBENCH_SOURCE, RegistryQueries};
