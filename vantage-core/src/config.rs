//! Engine configuration

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::ai::{AlphaBetaAI, SearchLimits, DEFAULT_DEPTH};
use crate::eval::Heuristics;

/// Search settings, loadable from a JSON file. Missing fields take
/// their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub depth: i32,
    pub time_limit_ms: Option<u64>,
    pub heuristics: Heuristics,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            time_limit_ms: None,
            heuristics: Heuristics::default(),
        }
    }
}

impl EngineConfig {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing engine config {}", path.display()))?;
        Ok(())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            depth: self.depth,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }

    pub fn ai(&self) -> AlphaBetaAI {
        AlphaBetaAI {
            limits: self.limits(),
            heuristics: self.heuristics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"depth": 4}"#).unwrap();
        assert_eq!(config.depth, 4);
        assert_eq!(config.time_limit_ms, None);
        assert_eq!(config.heuristics, Heuristics::default());

        let config: EngineConfig =
            serde_json::from_str(r#"{"heuristics": {"center_bonus": 10.0}}"#).unwrap();
        assert_eq!(config.depth, DEFAULT_DEPTH);
        assert_eq!(config.heuristics.center_bonus, 10.0);
        assert_eq!(config.heuristics.center_step, 6.0);
    }

    #[test]
    fn test_limits_and_ai() {
        let config = EngineConfig {
            depth: 12,
            time_limit_ms: Some(250),
            heuristics: Heuristics::default(),
        };
        let limits = config.limits();
        assert_eq!(limits.clamped_depth(), 10);
        assert_eq!(limits.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(config.ai().limits, limits);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("vantage-engine-{}.json", std::process::id()));
        let config = EngineConfig {
            depth: 3,
            time_limit_ms: Some(1500),
            ..EngineConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/vantage.json")).unwrap_err();
        assert!(err.to_string().contains("reading engine config"));
    }
}
