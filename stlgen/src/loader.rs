use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use stldata::{CachedProperties, PropertySet, Quotas, fingerprint_sources, load_properties};

/// Reads the script files in the given order.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(stltxt::decode(&bytes))
        })
        .collect()
}

/// Extracts the property set, going through the cache file when one is given.
pub fn load(sources: &[String], quotas: &Quotas, cache: Option<&Path>) -> Result<PropertySet> {
    // quotas shape the ethic exclusions, so they are part of the fingerprint
    let mut keyed: Vec<&str> = sources.iter().map(String::as_str).collect();
    let quota_key = serde_json::to_string(quotas)?;
    keyed.push(&quota_key);
    let fingerprint = fingerprint_sources(&keyed);

    if let Some(path) = cache.filter(|p| p.exists()) {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache {}", path.display()))?;
        match CachedProperties::load(&json, Some(&fingerprint)) {
            Ok(properties) => {
                log::info!("Loaded {} properties from {}", properties.len(), path.display());
                return Ok(properties);
            }
            Err(e) => log::warn!("Ignoring cache {}: {}", path.display(), e),
        }
    }

    let loaded = load_properties(sources, quotas);
    if !loaded.failures.is_empty() {
        log::warn!("{} of {} files failed to parse", loaded.failures.len(), sources.len());
    }
    for diagnostic in &loaded.diagnostics {
        log::debug!("{}", diagnostic);
    }

    if let Some(path) = cache {
        let json = CachedProperties::new(loaded.properties.clone(), fingerprint)?.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write cache {}", path.display()))?;
        log::info!("Wrote property cache to {}", path.display());
    }
    Ok(loaded.properties)
}
