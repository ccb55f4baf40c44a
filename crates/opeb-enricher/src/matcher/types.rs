use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::errors::Result;

/// A repository identified on a hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Owner, organization, or workspace.
    pub owner: String,
    /// Repository name or slug.
    pub name: String,
}

impl RepoId {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Platform credentials resolved once at matcher construction.
///
/// When both `user` and `token` are present every request through the
/// matcher's fetcher carries an HTTP Basic `Authorization` header; otherwise
/// requests go out unauthenticated. The resolution happens exactly once so
/// connection and auth state stay stable across a paginated sequence.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// The platform API endpoint the credentials apply to.
    pub endpoint: String,
    pub user: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    /// Unauthenticated access to `endpoint`.
    #[must_use]
    pub fn anonymous(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user: None,
            token: None,
        }
    }

    /// Basic-auth access to `endpoint`. Either field may still be `None`,
    /// which degrades to anonymous access.
    #[must_use]
    pub fn basic(
        endpoint: impl Into<String>,
        user: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            user,
            token,
        }
    }

    /// The `Authorization` header value to inject, if fully configured.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => Some(format!(
                "Basic {}",
                BASE64.encode(format!("{user}:{token}"))
            )),
            _ => None,
        }
    }
}

/// Outcome of one paginated fetch call.
///
/// `success == false` means an HTTP error response truncated the sequence;
/// `items` still holds every page fetched before the failure. Partial
/// results are never discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub success: bool,
    pub items: Vec<serde_json::Value>,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A platform-specific repository matcher.
///
/// Implementations recognize URLs belonging to their hosting platform and
/// retrieve repository metadata through the shared rate-limited fetch loop
/// ([`PageFetcher`](super::PageFetcher)), which they compose rather than
/// inherit. One instance per platform kind carries one throttling budget;
/// callers wanting concurrent enrichment give each worker its own instance.
#[async_trait]
pub trait RepoMatcher: Send + Sync {
    /// Platform kind, also the configuration section the matcher reads.
    fn kind(&self) -> &'static str;

    /// Recognize a candidate link; returns the repository coordinates when
    /// the URL belongs to this platform.
    fn matches(&self, url: &str) -> Option<RepoId>;

    /// The credentials resolved at construction.
    fn credentials(&self) -> &Credentials;

    /// Retrieve repository metadata from the platform API.
    async fn repo_metadata(&self, id: &RepoId) -> Result<FetchOutcome>;
}

// Language classification shared across matchers, used when shaping
// repository metadata.

pub const INTERPRETED_LANGUAGES: &[&str] = &[
    "python",
    "perl",
    "ruby",
    "r",
    "php",
    "golang",
    "javascript",
    "shell",
    "jsoniq",
];

pub const COMPILED_LANGUAGES: &[&str] = &[
    "c",
    "c++",
    "java",
    "fortran",
    "perl 6",
    "pascal",
    "objective-c",
    "component pascal",
    "scala",
];

/// Build systems recognized from the "language" a platform reports for
/// build-glue files.
pub const BUILD_SYSTEMS_BY_LANG: &[(&str, &str)] = &[("Makefile", "make"), ("CMake", "cmake")];

/// How a reported language is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    Interpreted,
    Compiled,
    Other,
}

impl LanguageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageKind::Interpreted => "interpreted",
            LanguageKind::Compiled => "compiled",
            LanguageKind::Other => "other",
        }
    }
}

/// Classify a platform-reported language name (case-insensitive).
#[must_use]
pub fn classify_language(name: &str) -> LanguageKind {
    let lowered = name.to_lowercase();
    if INTERPRETED_LANGUAGES.contains(&lowered.as_str()) {
        LanguageKind::Interpreted
    } else if COMPILED_LANGUAGES.contains(&lowered.as_str()) {
        LanguageKind::Compiled
    } else {
        LanguageKind::Other
    }
}

/// Map a build-glue "language" (e.g. `Makefile`) to its build system.
#[must_use]
pub fn build_system_for(lang: &str) -> Option<&'static str> {
    BUILD_SYSTEMS_BY_LANG
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(lang))
        .map(|(_, system)| *system)
}
