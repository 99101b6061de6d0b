//! Resolver configuration.
//!
//! All knobs are supplied at construction time; core logic never reads
//! the environment. The timeout nesting invariant (validator probe <
//! per-source budget < race budget) is checked once, up front.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ResolveError, Result};

/// How the resolver drives the source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Try sources in priority order, stop at the first validated hit.
    #[default]
    Sequential,
    /// Launch every source at once against a shared wall-clock budget.
    Race,
}

/// Construction-time configuration for [`crate::Resolver`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Budget for one source's whole extraction attempt.
    pub source_timeout_ms: u64,
    /// Wall-clock budget for the concurrent race.
    pub race_budget_ms: u64,
    /// Budget for a single validator probe (HEAD or partial GET).
    pub validator_timeout_ms: u64,
    /// How long a resolved result stays fresh in the cache.
    pub cache_ttl_secs: u64,
    pub dispatch: DispatchMode,
    /// Iframe-following depth; one level is enough for every source we
    /// know and keeps adversarial pages from looping us.
    pub max_iframe_depth: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: 15_000,
            race_budget_ms: 30_000,
            validator_timeout_ms: 8_000,
            cache_ttl_secs: 900,
            dispatch: DispatchMode::Sequential,
            max_iframe_depth: 1,
        }
    }
}

impl ResolverConfig {
    /// Check the timeout nesting invariant. Called by the resolver
    /// constructor; a violation is a startup error, never per-request.
    pub fn validate(&self) -> Result<()> {
        if self.source_timeout_ms == 0 {
            return Err(ResolveError::Config("source timeout must be non-zero".into()));
        }
        if self.validator_timeout_ms >= self.source_timeout_ms {
            return Err(ResolveError::Config(format!(
                "validator timeout ({} ms) must be below the per-source budget ({} ms)",
                self.validator_timeout_ms, self.source_timeout_ms
            )));
        }
        if self.dispatch == DispatchMode::Race && self.source_timeout_ms >= self.race_budget_ms {
            return Err(ResolveError::Config(format!(
                "per-source budget ({} ms) must be below the race budget ({} ms)",
                self.source_timeout_ms, self.race_budget_ms
            )));
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn race_budget(&self) -> Duration {
        Duration::from_millis(self.race_budget_ms)
    }

    pub fn validator_timeout(&self) -> Duration {
        Duration::from_millis(self.validator_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validator_must_be_inside_source_budget() {
        let cfg = ResolverConfig {
            validator_timeout_ms: 20_000,
            source_timeout_ms: 15_000,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_source_must_be_inside_race_budget() {
        let cfg = ResolverConfig {
            dispatch: DispatchMode::Race,
            source_timeout_ms: 30_000,
            race_budget_ms: 10_000,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: ResolverConfig =
            serde_json::from_str(r#"{"dispatch":"race","race_budget_ms":5000,"source_timeout_ms":2000}"#)
                .unwrap();
        assert_eq!(cfg.dispatch, DispatchMode::Race);
        assert_eq!(cfg.race_budget_ms, 5000);
        assert_eq!(cfg.cache_ttl_secs, 900);
    }
}
