use crate::types::ScreenRecord;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Load every screen record from a configuration file.
///
/// The encoding follows the extension: `.yaml`/`.yml`, `.json`, otherwise a
/// Python pickle (the historic `screenProps*.dat` files).
pub fn load_screen_records(path: impl AsRef<Path>) -> anyhow::Result<Vec<ScreenRecord>> {
    let path = path.as_ref();
    let raw = fs::read(path).with_context(|| format!("reading config: {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let records: Vec<ScreenRecord> = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_slice(&raw)
            .with_context(|| format!("parsing yaml: {}", path.display()))?,
        Some("json") => serde_json::from_slice(&raw)
            .with_context(|| format!("parsing json: {}", path.display()))?,
        _ => serde_pickle::from_slice(&raw, serde_pickle::DeOptions::new())
            .with_context(|| format!("decoding pickle: {}", path.display()))?,
    };
    tracing::info!(path = %path.display(), records = records.len(), "loaded screen config");
    Ok(records)
}
