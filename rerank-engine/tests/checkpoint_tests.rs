//! Checkpoint round-trips: a restored engine continues bit-for-bit where the
//! original left off, RNG state included.

use rerank_core::config::{EngineConfig, InsertPolicy};
use rerank_core::types::{Feed, FeedItem};
use rerank_engine::{checkpoint, RerankEngine, ScorerConfig};

fn feed_of(entries: &[(&str, f64)]) -> Feed {
    entries.iter().map(|(k, r)| FeedItem::new(*k, *r)).collect()
}

fn exploring_engine(seed: u64) -> RerankEngine {
    let config = EngineConfig {
        n_try: 2,
        insertion: InsertPolicy::Random,
        population: Some(
            ["a", "b", "c", "d", "e", "f"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        ..Default::default()
    };
    RerankEngine::with_seed(config, ScorerConfig::default(), seed).unwrap()
}

#[test]
fn round_trip_preserves_the_full_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.ckpt");

    let mut engine = exploring_engine(42);
    engine.step(feed_of(&[("a", 3.0), ("b", 1.0)])).unwrap();
    checkpoint::save(&engine, &path).unwrap();

    let restored = checkpoint::load(&path).unwrap();
    let original_json = serde_json::to_string(&engine.snapshot()).unwrap();
    let restored_json = serde_json::to_string(&restored.snapshot()).unwrap();
    assert_eq!(original_json, restored_json);
}

#[test]
fn restored_engine_steps_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.ckpt");

    let mut engine = exploring_engine(7);
    engine.step(feed_of(&[("a", 3.0), ("b", 1.0)])).unwrap();
    checkpoint::save(&engine, &path).unwrap();
    let mut restored = checkpoint::load(&path).unwrap();

    // Same next feed, same RNG state: outputs must match exactly.
    let next = feed_of(&[("b", 5.0), ("c", 2.0)]);
    let out_original = engine.step(next.clone()).unwrap();
    let out_restored = restored.step(next).unwrap();
    assert_eq!(out_original, out_restored);
}

#[test]
fn load_from_missing_path_propagates_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = checkpoint::load(dir.path().join("nope.ckpt")).unwrap_err();
    assert!(err.to_string().contains("checkpoint I/O failed"));
}

#[test]
fn load_from_corrupt_blob_propagates_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.ckpt");
    std::fs::write(&path, b"not json").unwrap();
    let err = checkpoint::load(&path).unwrap_err();
    assert!(err.to_string().contains("serialization failed"));
}
