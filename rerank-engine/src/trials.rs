//! Trial injection: reintroduce unseen population members into the working
//! ordering so the whole population keeps getting explored.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use rerank_core::config::InsertPolicy;
use rerank_core::types::{reposition, Feed, FeedItem};

/// Samples unseen keys and merges them into an ordering without duplicating
/// existing keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrialInjector {
    /// Max items to inject per invocation.
    n: usize,
    insertion: InsertPolicy,
}

impl TrialInjector {
    pub fn new(n: usize, insertion: InsertPolicy) -> Self {
        Self { n, insertion }
    }

    /// Sample up to `n` unused keys uniformly without replacement and insert
    /// them into `feed_out` with reward 0.
    ///
    /// Keys already present in the ordering are skipped. Every item's `pos`
    /// is recomputed afterwards. Returns the injected keys and the new
    /// ordering; the output's keys are a superset of the input's, with no
    /// duplicates.
    pub fn run(
        &self,
        rng: &mut ChaCha8Rng,
        feed_out: &Feed,
        unused_items: &[String],
    ) -> (Vec<String>, Feed) {
        let k = self.n.min(unused_items.len());
        if k == 0 {
            return (Vec::new(), feed_out.clone());
        }
        let picks: Vec<&String> = rand::seq::index::sample(rng, unused_items.len(), k)
            .into_iter()
            .map(|ix| &unused_items[ix])
            .collect();
        let indices = self.target_indices(rng, k, feed_out.len());

        let mut out = feed_out.clone();
        let mut present: HashSet<String> = out.iter().map(|item| item.key.clone()).collect();
        let mut injected = Vec::new();
        for (key, target) in picks.into_iter().zip(indices) {
            if !present.insert(key.clone()) {
                continue;
            }
            let at = target.min(out.len());
            out.insert(at, FeedItem::new(key.clone(), 0.0));
            injected.push(key.clone());
        }
        reposition(&mut out);
        (injected, out)
    }

    /// Target insertion indices for `k` items into a sequence of `length`.
    fn target_indices(&self, rng: &mut ChaCha8Rng, k: usize, length: usize) -> Vec<usize> {
        match self.insertion {
            InsertPolicy::Append => (0..k).map(|i| length + i).collect(),
            InsertPolicy::Prepend => (0..k).collect(),
            InsertPolicy::Middle => {
                let mid = (length as f64 / 2.0).round() as usize;
                (0..k).map(|i| mid + i).collect()
            }
            // Offsets are bounded by the number of inserts, not the sequence
            // length. Matches upstream behavior; see DESIGN.md.
            InsertPolicy::Random => (0..k).map(|_| rng.gen_range(0..=k)).collect(),
        }
    }
}
