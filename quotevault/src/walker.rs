use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use quotevault_core::{DEFAULT_EXTENSION, DeltaFileName, HistoryFileName, VaultError};

fn ensure_root(root: &Path) -> Result<(), VaultError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(VaultError::invalid_arg(format!(
            "not a directory: {}",
            root.display()
        )))
    }
}

/// Enumerate history files under `root`, sorted by path.
///
/// Only names following the `<SYMBOL>[_<freq>].csv` convention qualify;
/// delta-named files and foreign files are ignored.
pub fn history_files(root: &Path) -> Result<Vec<PathBuf>, VaultError> {
    ensure_root(root)?;
    let mut out = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| VaultError::Io(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(parsed) = HistoryFileName::parse(name)
            && parsed.extension == DEFAULT_EXTENSION
        {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

/// Enumerate delta files under `root` with their parsed names, sorted by
/// path.
pub fn delta_files(root: &Path) -> Result<Vec<(PathBuf, DeltaFileName)>, VaultError> {
    ensure_root(root)?;
    let mut out = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| VaultError::Io(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(parsed) = DeltaFileName::parse(name)
            && parsed.extension == DEFAULT_EXTENSION
        {
            out.push((entry.into_path(), parsed));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
