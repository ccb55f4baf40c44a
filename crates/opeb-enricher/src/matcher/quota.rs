//! Per-platform hourly request budgets.

use std::sync::OnceLock;
use std::time::Duration;

use chrono::Utc;

use crate::config::Config;

/// Length of the quota window, in seconds.
pub const WINDOW_SECONDS: u64 = 3600;

/// Requests per window when neither the platform section nor the `default`
/// section configures `numreq`.
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 3600;

/// A platform's hourly request budget, converted to a minimum inter-request
/// delay.
///
/// The period is computed lazily on the first request and cached for the
/// owning matcher's lifetime; the shared fetch loop never renegotiates it
/// from server responses. One `RateQuota` per matcher instance means every
/// call through that matcher shares one throttling budget. Instances are not
/// meant to be shared across concurrently fetching matchers.
#[derive(Debug)]
pub struct RateQuota {
    requests_per_window: u32,
    period: OnceLock<Duration>,
    window: OnceLock<(u32, i64)>,
}

impl RateQuota {
    /// Create a quota of `requests_per_window` requests per hour.
    ///
    /// A zero budget is treated as one request per window rather than a
    /// division by zero.
    #[must_use]
    pub fn new(requests_per_window: u32) -> Self {
        Self {
            requests_per_window: requests_per_window.max(1),
            period: OnceLock::new(),
            window: OnceLock::new(),
        }
    }

    /// Create a quota from the `numreq` value configured for `kind`,
    /// falling back to the `default` section and then to
    /// [`DEFAULT_REQUESTS_PER_WINDOW`].
    #[must_use]
    pub fn from_config(config: &Config, kind: &str) -> Self {
        Self::new(config.numreq_for(kind))
    }

    /// The configured hourly budget.
    #[must_use]
    pub fn requests_per_window(&self) -> u32 {
        self.requests_per_window
    }

    /// Minimum delay between request starts.
    ///
    /// Derived as `window / requests_per_window`; memoized on first use.
    #[must_use]
    pub fn period(&self) -> Duration {
        *self.period.get_or_init(|| {
            Duration::from_secs_f64(WINDOW_SECONDS as f64 / f64::from(self.requests_per_window))
        })
    }

    /// The hourly budget together with the epoch second at which the counter
    /// resets, assumed to be one hour from the first call.
    ///
    /// The snapshot is taken once and cached for the quota's lifetime.
    pub fn requests_and_reset(&self) -> (u32, i64) {
        *self.window.get_or_init(|| {
            (
                self.requests_per_window,
                Utc::now().timestamp() + WINDOW_SECONDS as i64,
            )
        })
    }
}
