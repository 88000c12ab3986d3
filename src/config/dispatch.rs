//! Dispatcher configuration structures.

use serde::{Deserialize, Serialize};

/// One worker in the static topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Stable identifier, unique within the topology.
    pub id: String,
    /// Delivery address.
    pub address: String,
}

/// Root dispatcher configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Static worker topology.
    pub workers: Vec<WorkerConfig>,
    /// Admissions allowed per worker per rolling window.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: usize,
    /// Sliding window duration in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Consecutive failures within the fail timeout that take a worker DOWN.
    #[serde(default = "default_max_fails")]
    pub max_fails: u32,
    /// Seconds a DOWN worker stays excluded before a half-open probe; also
    /// the failure-streak window.
    #[serde(default = "default_fail_timeout_secs")]
    pub fail_timeout_secs: u64,
    /// Per-attempt delivery timeout in seconds.
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    /// How often the background revival loop runs, in seconds.
    #[serde(default = "default_revive_interval_secs")]
    pub revive_interval_secs: u64,
    /// Delivery attempts allowed per event. Unset means "live worker count
    /// at attempt start".
    #[serde(default)]
    pub max_retries: Option<usize>,
}

const fn default_rate_limit() -> usize {
    500
}
const fn default_window_secs() -> u64 {
    60
}
const fn default_max_fails() -> u32 {
    3
}
const fn default_fail_timeout_secs() -> u64 {
    30
}
const fn default_delivery_timeout_secs() -> u64 {
    5
}
const fn default_revive_interval_secs() -> u64 {
    5
}

impl DispatchConfig {
    /// Start a configuration from a topology, with stock defaults for every
    /// tunable.
    #[must_use]
    pub fn new(workers: Vec<WorkerConfig>) -> Self {
        Self {
            workers,
            rate_limit: default_rate_limit(),
            window_secs: default_window_secs(),
            max_fails: default_max_fails(),
            fail_timeout_secs: default_fail_timeout_secs(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            revive_interval_secs: default_revive_interval_secs(),
            max_retries: None,
        }
    }

    /// Set the per-worker admission cap.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: usize) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Set the sliding window duration in seconds.
    #[must_use]
    pub fn with_window_secs(mut self, window_secs: u64) -> Self {
        self.window_secs = window_secs;
        self
    }

    /// Set the failure threshold.
    #[must_use]
    pub fn with_max_fails(mut self, max_fails: u32) -> Self {
        self.max_fails = max_fails;
        self
    }

    /// Set the fail timeout in seconds.
    #[must_use]
    pub fn with_fail_timeout_secs(mut self, fail_timeout_secs: u64) -> Self {
        self.fail_timeout_secs = fail_timeout_secs;
        self
    }

    /// Set the per-attempt delivery timeout in seconds.
    #[must_use]
    pub fn with_delivery_timeout_secs(mut self, delivery_timeout_secs: u64) -> Self {
        self.delivery_timeout_secs = delivery_timeout_secs;
        self
    }

    /// Cap delivery attempts per event.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers.is_empty() {
            return Err("at least one worker must be defined".into());
        }
        let mut seen = std::collections::HashSet::new();
        for w in &self.workers {
            if w.id.is_empty() {
                return Err("worker id must not be empty".into());
            }
            if !seen.insert(w.id.as_str()) {
                return Err(format!("duplicate worker id `{}`", w.id));
            }
        }
        if self.rate_limit == 0 {
            return Err("rate_limit must be greater than 0".into());
        }
        if self.window_secs == 0 {
            return Err("window_secs must be greater than 0".into());
        }
        if self.max_fails == 0 {
            return Err("max_fails must be greater than 0".into());
        }
        if self.fail_timeout_secs == 0 {
            return Err("fail_timeout_secs must be greater than 0".into());
        }
        if self.delivery_timeout_secs == 0 {
            return Err("delivery_timeout_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse dispatcher configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the path named by `CLUSTER_DISPATCH_CONFIG`,
    /// honoring a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns a description if the variable is unset, the file is
    /// unreadable, or the contents fail to parse/validate.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let path = std::env::var("CLUSTER_DISPATCH_CONFIG")
            .map_err(|_| "CLUSTER_DISPATCH_CONFIG is not set".to_string())?;
        let contents =
            std::fs::read_to_string(&path).map_err(|e| format!("cannot read `{path}`: {e}"))?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers() -> Vec<WorkerConfig> {
        vec![
            WorkerConfig {
                id: "app1".into(),
                address: "http://localhost:5000".into(),
            },
            WorkerConfig {
                id: "app2".into(),
                address: "http://localhost:5001".into(),
            },
        ]
    }

    #[test]
    fn test_stock_defaults() {
        let cfg = DispatchConfig::new(workers());
        assert_eq!(cfg.rate_limit, 500);
        assert_eq!(cfg.window_secs, 60);
        assert_eq!(cfg.max_fails, 3);
        assert_eq!(cfg.fail_timeout_secs, 30);
        assert_eq!(cfg.delivery_timeout_secs, 5);
        assert_eq!(cfg.max_retries, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(DispatchConfig::new(vec![]).validate().is_err());
        assert!(DispatchConfig::new(workers())
            .with_rate_limit(0)
            .validate()
            .is_err());
        assert!(DispatchConfig::new(workers())
            .with_window_secs(0)
            .validate()
            .is_err());

        let mut dup = workers();
        dup.push(WorkerConfig {
            id: "app1".into(),
            address: "http://localhost:5009".into(),
        });
        let err = DispatchConfig::new(dup).validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_from_json_str_applies_defaults() {
        let cfg = DispatchConfig::from_json_str(
            r#"{
                "workers": [
                    {"id": "app1", "address": "http://localhost:5000"}
                ],
                "rate_limit": 2
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.rate_limit, 2);
        assert_eq!(cfg.window_secs, 60);
    }

    #[test]
    fn test_from_json_str_rejects_invalid() {
        assert!(DispatchConfig::from_json_str("{}").is_err());
        assert!(DispatchConfig::from_json_str(r#"{"workers": []}"#).is_err());
    }
}
