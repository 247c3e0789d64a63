use std::fs;
use std::path::PathBuf;

use portfolio_core::PortfolioError;
use replay_engine::{SimulationConfig, SimulationSummary};
use sha2::{Digest, Sha256};

/// Disk cache for simulation results. Entries are keyed by a hash of every
/// simulation input, so a changed schedule, horizon or return distribution
/// never reuses a stale result.
#[derive(Debug, Clone)]
pub struct SimulationCache {
    dir: PathBuf,
}

impl SimulationCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// First 16 hex chars of the SHA-256 of the canonical config JSON
    pub fn key(config: &SimulationConfig) -> Result<String, PortfolioError> {
        let canonical = serde_json::to_string(config)?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(hex::encode(digest)[..16].to_string())
    }

    fn entry_path(&self, config: &SimulationConfig, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}_simulation_{}.json", config.symbol, key))
    }

    /// A hit must deserialize cleanly; unreadable or corrupt entries are
    /// logged and treated as misses.
    pub fn load(&self, config: &SimulationConfig) -> Option<SimulationSummary> {
        let key = Self::key(config).ok()?;
        let path = self.entry_path(config, &key);
        if !path.exists() {
            return None;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(PortfolioError::from)
            .and_then(|raw| Ok(serde_json::from_str(&raw)?));
        match parsed {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(
                    "Discarding corrupt simulation cache entry {}: {e}",
                    path.display()
                );
                None
            }
        }
    }

    /// Write a fresh result, overwriting whatever was there
    pub fn store(
        &self,
        config: &SimulationConfig,
        summary: &SimulationSummary,
    ) -> Result<(), PortfolioError> {
        let body = serde_json::to_string_pretty(summary)?;
        let key = Self::key(config)?;
        let path = self.entry_path(config, &key);
        fs::create_dir_all(&self.dir).map_err(|e| {
            PortfolioError::Cache(format!("cannot create {}: {e}", self.dir.display()))
        })?;
        fs::write(&path, body)
            .map_err(|e| PortfolioError::Cache(format!("cannot write {}: {e}", path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::ContributionSchedule;
    use replay_engine::DistributionStats;

    fn test_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("folioreplay-cache-{}-{}", name, std::process::id()))
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            symbol: "VTI".to_string(),
            years: 10,
            initial_investment: 1000.0,
            schedule: ContributionSchedule {
                monthly: 100.0,
                ..Default::default()
            },
            mean_return_monthly: 0.007,
            volatility_monthly: 0.04,
            iterations: 100,
            seed: Some(42),
        }
    }

    fn stats(value: f64) -> DistributionStats {
        DistributionStats {
            mean: value,
            std: 0.0,
            q25: value,
            median: value,
            q75: value,
            min: value,
            max: value,
        }
    }

    fn summary() -> SimulationSummary {
        SimulationSummary {
            symbol: "VTI".to_string(),
            iterations: 100,
            input_amount: stats(13000.0),
            final_amount: stats(21000.0),
            total_yield_amount: stats(8000.0),
            total_yield_percent: stats(38.1),
            total_dividends: stats(0.0),
            annual_return: stats(8.7),
        }
    }

    #[test]
    fn key_is_stable_and_sensitive_to_inputs() {
        let base = SimulationCache::key(&config()).unwrap();
        assert_eq!(base, SimulationCache::key(&config()).unwrap());
        assert_eq!(base.len(), 16);

        let mut changed = config();
        changed.schedule.monthly = 150.0;
        assert_ne!(base, SimulationCache::key(&changed).unwrap());

        let mut reseeded = config();
        reseeded.seed = Some(43);
        assert_ne!(base, SimulationCache::key(&reseeded).unwrap());
    }

    #[test]
    fn stores_and_loads_a_result() {
        let cache = SimulationCache::new(test_dir("roundtrip"));
        let config = config();
        assert!(cache.load(&config).is_none());

        cache.store(&config, &summary()).unwrap();
        let loaded = cache.load(&config).unwrap();
        assert_eq!(loaded.final_amount.mean, 21000.0);
        assert_eq!(loaded.iterations, 100);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let cache = SimulationCache::new(test_dir("corrupt"));
        let config = config();
        cache.store(&config, &summary()).unwrap();

        let key = SimulationCache::key(&config).unwrap();
        let path = cache.entry_path(&config, &key);
        fs::write(&path, "definitely not json").unwrap();

        assert!(cache.load(&config).is_none());
    }
}
