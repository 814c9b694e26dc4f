//! Logging configuration for the analysis core.
//!
//! All analysis code logs through `tracing`; this module only configures how
//! those events surface. Analysis runs never fail because of logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging configuration for analysis runs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for analysis components.
    pub base_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
        }
    }
}

impl LogConfig {
    /// Verbose configuration suitable for debugging a single analysis run;
    /// surfaces the per-pair `debug!` events from the association sweep.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
        }
    }

    /// Minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
        }
    }

    /// Balanced configuration suitable for most use cases.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// The environment filter string this configuration implies, unless the
    /// process environment overrides it.
    pub fn env_filter(&self) -> String {
        let level = self.base_level.as_str().to_lowercase();
        format!("{level},lacuna_guard={level}")
    }

    /// Installs a global subscriber for this configuration.
    ///
    /// `RUST_LOG` wins over the configured level when set. Installation is
    /// best-effort: if a subscriber is already installed (common in tests),
    /// the existing one stays.
    pub fn init(&self) {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.env_filter()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init();
    }
}
