//! Scoring pipeline: reward aggregation across episodes, then normalization
//! into a per-key `score`, ordered descending.
//!
//! Strategy choices are closed enums resolved at construction. Zero-variance
//! inputs take a documented fallback instead of dividing by zero.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rerank_core::types::{reposition, Feed, FeedItem};

/// Default base for log normalization.
pub const DEFAULT_LOG_BASE: f64 = 10.0;

/// Reducer applied to a key's reward sequence across episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Min,
    Max,
}

impl Aggregation {
    /// Reduce one key's rewards. `rewards` is non-empty: a key only exists in
    /// the aggregate because it appeared in at least one feed.
    fn reduce(self, rewards: &[f64]) -> f64 {
        match self {
            Self::Mean => rewards.iter().sum::<f64>() / rewards.len() as f64,
            Self::Sum => rewards.iter().sum(),
            Self::Min => rewards.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Reward → score transform applied after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `score = reward`.
    #[default]
    Naive,
    /// `score = (reward − min) / (max − min)`.
    MinMax,
    /// `score = sign(reward) * log_base(1 + |reward|)`.
    Log { base: f64 },
    /// `score = (reward − mean) / stddev` (population stddev).
    Standard,
}

/// Scoring configuration.
///
/// `per_episode = true` scores the latest episode's feed verbatim;
/// otherwise rewards are aggregated per key across every feed of the open
/// experiment before normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub per_episode: bool,
    pub aggregation: Aggregation,
    pub normalization: Normalization,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            per_episode: true,
            aggregation: Aggregation::Sum,
            normalization: Normalization::Naive,
        }
    }
}

/// Two-stage scorer: aggregate, then normalize.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScorerConfig,
}

impl Scorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score the open experiment's feeds.
    ///
    /// Returns one scored entry per key, descending by score. The sort is
    /// stable: ties keep their pre-sort relative order, so the result is
    /// deterministic.
    pub fn score(&self, feeds: &[Feed]) -> Feed {
        if feeds.is_empty() {
            return Feed::new();
        }
        let mut scored = self.normalize(self.aggregate(feeds));
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        reposition(&mut scored);
        scored
    }

    /// Aggregation stage: latest feed verbatim, or one entry per key reduced
    /// across all feeds. Keys come out in first-appearance order; positions
    /// are not meaningful yet and reset to 0.
    fn aggregate(&self, feeds: &[Feed]) -> Feed {
        if self.config.per_episode {
            return feeds.last().cloned().unwrap_or_default();
        }
        let mut order: Vec<String> = Vec::new();
        let mut rewards: HashMap<String, Vec<f64>> = HashMap::new();
        for feed in feeds {
            for item in feed {
                rewards
                    .entry(item.key.clone())
                    .or_insert_with(|| {
                        order.push(item.key.clone());
                        Vec::new()
                    })
                    .push(item.reward);
            }
        }
        order
            .into_iter()
            .map(|key| {
                let reward = self.config.aggregation.reduce(&rewards[&key]);
                FeedItem::new(key, reward)
            })
            .collect()
    }

    /// Normalization stage: populate `score` from `reward`.
    fn normalize(&self, mut feed: Feed) -> Feed {
        if feed.is_empty() {
            return feed;
        }
        match self.config.normalization {
            Normalization::Naive => {
                for item in &mut feed {
                    item.score = Some(item.reward);
                }
            }
            Normalization::MinMax => {
                let min = feed.iter().map(|i| i.reward).fold(f64::INFINITY, f64::min);
                let max = feed
                    .iter()
                    .map(|i| i.reward)
                    .fold(f64::NEG_INFINITY, f64::max);
                if max == min {
                    let flat = degenerate_score(min);
                    for item in &mut feed {
                        item.score = Some(flat);
                    }
                } else {
                    for item in &mut feed {
                        item.score = Some((item.reward - min) / (max - min));
                    }
                }
            }
            Normalization::Log { base } => {
                for item in &mut feed {
                    item.score = Some(item.reward.signum() * (1.0 + item.reward.abs()).log(base));
                }
            }
            Normalization::Standard => {
                let n = feed.len() as f64;
                let mean = feed.iter().map(|i| i.reward).sum::<f64>() / n;
                let variance = feed
                    .iter()
                    .map(|i| (i.reward - mean).powi(2))
                    .sum::<f64>()
                    / n;
                let stddev = variance.sqrt();
                if stddev == 0.0 {
                    let flat = degenerate_score(mean);
                    for item in &mut feed {
                        item.score = Some(flat);
                    }
                } else {
                    for item in &mut feed {
                        item.score = Some((item.reward - mean) / stddev);
                    }
                }
            }
        }
        feed
    }
}

/// Zero-variance fallback shared by min-max and standard normalization:
/// every reward is the same value. All scores become 0.0 when that common
/// value is 0, otherwise 1.0.
fn degenerate_score(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_of(entries: &[(&str, f64)]) -> Feed {
        entries.iter().map(|(k, r)| FeedItem::new(*k, *r)).collect()
    }

    fn aggregated(config: ScorerConfig, feeds: &[Feed]) -> HashMap<String, f64> {
        Scorer::new(config)
            .score(feeds)
            .into_iter()
            .map(|i| (i.key, i.reward))
            .collect()
    }

    #[test]
    fn sum_aggregation_across_episodes() {
        let feeds = vec![
            feed_of(&[("a", 1.0)]),
            feed_of(&[("a", 2.0)]),
            feed_of(&[("a", 3.0)]),
        ];
        let config = ScorerConfig {
            per_episode: false,
            aggregation: Aggregation::Sum,
            normalization: Normalization::Naive,
        };
        assert_eq!(aggregated(config, &feeds)["a"], 6.0);
    }

    #[test]
    fn mean_aggregation_across_episodes() {
        let feeds = vec![
            feed_of(&[("a", 1.0)]),
            feed_of(&[("a", 2.0)]),
            feed_of(&[("a", 3.0)]),
        ];
        let config = ScorerConfig {
            per_episode: false,
            aggregation: Aggregation::Mean,
            normalization: Normalization::Naive,
        };
        assert_eq!(aggregated(config, &feeds)["a"], 2.0);
    }

    #[test]
    fn min_and_max_aggregation() {
        let feeds = vec![feed_of(&[("a", 5.0)]), feed_of(&[("a", -1.0)])];
        let min_config = ScorerConfig {
            per_episode: false,
            aggregation: Aggregation::Min,
            normalization: Normalization::Naive,
        };
        let max_config = ScorerConfig {
            aggregation: Aggregation::Max,
            ..min_config
        };
        assert_eq!(aggregated(min_config, &feeds)["a"], -1.0);
        assert_eq!(aggregated(max_config, &feeds)["a"], 5.0);
    }

    #[test]
    fn per_episode_scores_latest_feed_only() {
        let feeds = vec![feed_of(&[("a", 9.0)]), feed_of(&[("b", 1.0)])];
        let scored = Scorer::new(ScorerConfig::default()).score(&feeds);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].key, "b");
    }

    #[test]
    fn min_max_normalization_example() {
        let feeds = vec![feed_of(&[("a", 1.0), ("b", 3.0), ("c", 5.0)])];
        let config = ScorerConfig {
            normalization: Normalization::MinMax,
            ..Default::default()
        };
        let scored = Scorer::new(config).score(&feeds);
        let by_key: HashMap<_, _> = scored.into_iter().map(|i| (i.key, i.score)).collect();
        assert_eq!(by_key["a"], Some(0.0));
        assert_eq!(by_key["b"], Some(0.5));
        assert_eq!(by_key["c"], Some(1.0));
    }

    #[test]
    fn min_max_zero_variance_fallback() {
        let config = ScorerConfig {
            normalization: Normalization::MinMax,
            ..Default::default()
        };
        let zeros = Scorer::new(config).score(&[feed_of(&[("a", 0.0), ("b", 0.0)])]);
        assert!(zeros.iter().all(|i| i.score == Some(0.0)));
        let flats = Scorer::new(config).score(&[feed_of(&[("a", 4.0), ("b", 4.0)])]);
        assert!(flats.iter().all(|i| i.score == Some(1.0)));
    }

    #[test]
    fn log_normalization_keeps_sign() {
        let config = ScorerConfig {
            normalization: Normalization::Log {
                base: DEFAULT_LOG_BASE,
            },
            ..Default::default()
        };
        let scored = Scorer::new(config).score(&[feed_of(&[("a", 9.0), ("b", -9.0)])]);
        let by_key: HashMap<_, _> = scored.into_iter().map(|i| (i.key, i.score)).collect();
        assert_eq!(by_key["a"], Some(1.0));
        assert_eq!(by_key["b"], Some(-1.0));
    }

    #[test]
    fn standard_normalization_is_mean_centered() {
        let config = ScorerConfig {
            normalization: Normalization::Standard,
            ..Default::default()
        };
        let scored = Scorer::new(config).score(&[feed_of(&[("a", 1.0), ("b", 3.0)])]);
        let by_key: HashMap<_, _> = scored.into_iter().map(|i| (i.key, i.score)).collect();
        assert_eq!(by_key["a"], Some(-1.0));
        assert_eq!(by_key["b"], Some(1.0));
    }

    #[test]
    fn standard_zero_variance_uses_min_max_fallback() {
        let config = ScorerConfig {
            normalization: Normalization::Standard,
            ..Default::default()
        };
        let scored = Scorer::new(config).score(&[feed_of(&[("a", 2.0), ("b", 2.0)])]);
        assert!(scored.iter().all(|i| i.score == Some(1.0)));
    }

    #[test]
    fn output_sorted_descending_with_stable_ties() {
        let feeds = vec![feed_of(&[("a", 1.0), ("b", 3.0), ("c", 1.0)])];
        let scored = Scorer::new(ScorerConfig::default()).score(&feeds);
        let keys: Vec<_> = scored.iter().map(|i| i.key.as_str()).collect();
        // b wins; a and c tie and keep their original relative order.
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(scored[0].pos, 0);
        assert_eq!(scored[2].pos, 2);
    }

    #[test]
    fn empty_history_scores_empty() {
        assert!(Scorer::new(ScorerConfig::default()).score(&[]).is_empty());
    }

    #[test]
    fn unknown_strategy_name_rejected_at_deserialization() {
        assert!(serde_json::from_str::<Aggregation>("\"median\"").is_err());
        assert!(serde_json::from_str::<Normalization>("\"softmax\"").is_err());
    }
}
