// Client configuration: where the enrichment service lives and how long we
// are willing to wait for a batch. `main` starts from the defaults and
// applies CLI flags; clap reads `ENRICH_API_URL` for the base URL.

use std::time::Duration;

/// Default location of the enrichment service when nothing else is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable holding the base URL.
pub const BASE_URL_ENV: &str = "ENRICH_API_URL";

/// Fixed polling schedule: `attempts` checks, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollSchedule {
    /// 30 checks every 10 seconds, roughly five minutes in total.
    fn default() -> Self {
        PollSchedule {
            attempts: 30,
            interval: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout for the blocking HTTP client.
    pub timeout: Duration,
    pub schedule: PollSchedule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(30),
            schedule: PollSchedule::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// At least one attempt is always made.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.schedule.attempts = attempts.max(1);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.schedule.interval = interval;
        self
    }

    /// Join an absolute API path (e.g. `/api/upload`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
