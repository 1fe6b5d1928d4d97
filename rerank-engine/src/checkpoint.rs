//! Engine checkpointing: one opaque snapshot to a named location,
//! all-or-nothing. I/O and serialization failures propagate unchanged.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rerank_core::errors::RerankResult;
use rerank_core::traits::{ScoreOrdered, Selector};

use crate::engine::{EngineSnapshot, RerankEngine};

/// Write the engine's full state to `path` as one JSON blob.
pub fn save(engine: &RerankEngine, path: impl AsRef<Path>) -> RerankResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &engine.snapshot())?;
    writer.flush()?;
    Ok(())
}

/// Rebuild an engine from a snapshot written by [`save`], using the default
/// selector.
pub fn load(path: impl AsRef<Path>) -> RerankResult<RerankEngine> {
    load_with_selector(path, Box::new(ScoreOrdered))
}

/// Rebuild an engine from a snapshot written by [`save`].
///
/// Selectors are strategy objects, not state, so the caller supplies one;
/// everything else — config, ledger, experiment history, monitor state, and
/// the RNG — comes back exactly as saved.
pub fn load_with_selector(
    path: impl AsRef<Path>,
    selector: Box<dyn Selector>,
) -> RerankResult<RerankEngine> {
    let file = File::open(path)?;
    let snapshot: EngineSnapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(RerankEngine::from_snapshot(snapshot, selector))
}
