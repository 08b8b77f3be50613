use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corpus_core::ModelDeclaration;
use walkdir::WalkDir;

pub fn load_manifest(path: impl AsRef<Path>) -> Result<ModelDeclaration> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading model manifest: {}", path.display()))?;

    serde_json::from_str::<ModelDeclaration>(&raw)
        .with_context(|| format!("invalid model manifest: {}", path.display()))
}

pub fn discover_manifests(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        anyhow::bail!("manifest directory does not exist: {}", root.display());
    }

    let mut manifests = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("json"))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    manifests.sort();
    Ok(manifests)
}

pub fn load_manifests(root: impl AsRef<Path>) -> Result<Vec<(PathBuf, ModelDeclaration)>> {
    discover_manifests(root)?
        .into_iter()
        .map(|path| load_manifest(&path).map(|model| (path, model)))
        .collect()
}
