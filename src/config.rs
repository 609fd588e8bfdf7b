// src/config.rs
//! Engine tunables loaded from TOML, with env overrides.
//!
//! ```toml
//! [assignment]
//! fallback_threshold = 0.1
//! heading_weight = 0.6
//! opinion_weight = 0.4
//!
//! [topic]
//! max_message_chars = 0           # 0 = no cap
//! history_capacity = 2000
//! reseed_policy = "carry_forward"   # or "reset"
//! ```
//!
//! Resolution order: `$CLUSTER_CONFIG_PATH`, then `config/engine.toml`, then
//! built-in defaults. `CLUSTER_FALLBACK_THRESHOLD` and `CLUSTER_RESEED_POLICY`
//! override the file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::assignment::{
    AssignmentEngine, DEFAULT_FALLBACK_THRESHOLD, DEFAULT_HEADING_WEIGHT, DEFAULT_OPINION_WEIGHT,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_CONFIG_PATH: &str = "CLUSTER_CONFIG_PATH";
pub const ENV_FALLBACK_THRESHOLD: &str = "CLUSTER_FALLBACK_THRESHOLD";
pub const ENV_RESEED_POLICY: &str = "CLUSTER_RESEED_POLICY";

/// `0` disables the message length cap.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 0;
pub const DEFAULT_HISTORY_CAPACITY: usize = 2000;

/// What happens to assigned chat messages when the clustering pass reseeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReseedPolicy {
    /// Clusters whose id survives keep their messages.
    #[default]
    CarryForward,
    /// Every cluster of the new generation starts without messages.
    Reset,
}

impl FromStr for ReseedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carry_forward" | "carry-forward" => Ok(ReseedPolicy::CarryForward),
            "reset" => Ok(ReseedPolicy::Reset),
            other => Err(anyhow!("unknown reseed policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentSection {
    pub fallback_threshold: f64,
    pub heading_weight: f64,
    pub opinion_weight: f64,
}

impl Default for AssignmentSection {
    fn default() -> Self {
        Self {
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
            heading_weight: DEFAULT_HEADING_WEIGHT,
            opinion_weight: DEFAULT_OPINION_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSection {
    pub max_message_chars: usize,
    pub history_capacity: usize,
    pub reseed_policy: ReseedPolicy,
}

impl Default for TopicSection {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            reseed_policy: ReseedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub assignment: AssignmentSection,
    pub topic: TopicSection,
}

impl EngineConfig {
    /// Resolve path from env or default; a missing default file yields defaults.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => Self::from_path(Path::new(&p))?,
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_path(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(t) = parse_threshold_env(std::env::var(ENV_FALLBACK_THRESHOLD).ok()) {
            self.assignment.fallback_threshold = t;
        }
        if let Ok(raw) = std::env::var(ENV_RESEED_POLICY) {
            self.topic.reseed_policy = raw
                .parse()
                .with_context(|| format!("{ENV_RESEED_POLICY}={raw}"))?;
        }
        Ok(())
    }

    /// Replace non-finite or negative values with defaults.
    pub fn sanitized(mut self) -> Self {
        let d = AssignmentSection::default();
        let a = &mut self.assignment;
        if !a.fallback_threshold.is_finite() || a.fallback_threshold < 0.0 {
            a.fallback_threshold = d.fallback_threshold;
        }
        if !a.heading_weight.is_finite() || a.heading_weight < 0.0 {
            a.heading_weight = d.heading_weight;
        }
        if !a.opinion_weight.is_finite() || a.opinion_weight < 0.0 {
            a.opinion_weight = d.opinion_weight;
        }
        if self.topic.history_capacity == 0 {
            self.topic.history_capacity = DEFAULT_HISTORY_CAPACITY;
        }
        self
    }

    pub fn assignment_engine(&self) -> AssignmentEngine {
        AssignmentEngine::new(
            self.assignment.heading_weight,
            self.assignment.opinion_weight,
            self.assignment.fallback_threshold,
        )
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.assignment_engine(), AssignmentEngine::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[assignment]
fallback_threshold = 0.25

[topic]
reseed_policy = "reset"
"#,
        )
        .unwrap();
        assert_eq!(cfg.assignment.fallback_threshold, 0.25);
        assert_eq!(cfg.assignment.heading_weight, DEFAULT_HEADING_WEIGHT);
        assert_eq!(cfg.topic.reseed_policy, ReseedPolicy::Reset);
        assert_eq!(cfg.topic.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[assignment]
heading_weight = -1.0
[topic]
history_capacity = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.assignment.heading_weight, DEFAULT_HEADING_WEIGHT);
        assert_eq!(cfg.topic.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(cfg.topic.max_message_chars, 0);
    }

    #[test]
    fn threshold_env_parsing() {
        assert_eq!(parse_threshold_env(Some(" 0.3 ".into())), Some(0.3));
        assert_eq!(parse_threshold_env(Some("7".into())), Some(1.0));
        assert_eq!(parse_threshold_env(Some("NaN".into())), None);
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("Reset".parse::<ReseedPolicy>().unwrap(), ReseedPolicy::Reset);
        assert_eq!(
            "carry-forward".parse::<ReseedPolicy>().unwrap(),
            ReseedPolicy::CarryForward
        );
        assert!("sometimes".parse::<ReseedPolicy>().is_err());
    }
}
