//! General utility functions for scs-models tools
//!
//! Path and filter helpers shared by [`crate::asset_utils`] and the CLI.

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// The kind of asset a path names, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    PrefabDescriptor,
    ModelMetadata,
    ModelGeometry,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ppd" => Some(AssetKind::PrefabDescriptor),
            "pmd" => Some(AssetKind::ModelMetadata),
            "pmg" => Some(AssetKind::ModelGeometry),
            _ => None,
        }
    }
}

/// Format a file size in human-readable form (B, KB, MB)
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Create a glob matcher from a pattern string
///
/// - `*.ext` becomes `**/*.ext` (match in any directory)
/// - Plain text without wildcards becomes `**/*text*` (substring search)
pub fn create_glob_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = if pattern.starts_with("*.") {
        format!("**/{}", pattern)
    } else if !pattern.contains('*') && !pattern.contains('?') {
        format!("**/*{}*", pattern)
    } else {
        pattern.to_string()
    };

    let glob = Glob::new(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// Check if a name matches the optional filter
pub fn matches_filter(name: &str, matcher: Option<&GlobMatcher>) -> bool {
    match matcher {
        Some(m) => m.is_match(name),
        None => true,
    }
}

/// Recursively collect `.ppd` and `.pmd` files under `dir`.
///
/// Geometry files are skipped; they are picked up through their `.pmd`.
/// The result is sorted so runs are reproducible.
pub fn collect_assets(dir: &Path, matcher: Option<&GlobMatcher>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_recursive(dir, &mut files)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut assets: Vec<PathBuf> = files
        .into_iter()
        .filter(|p| {
            matches!(
                AssetKind::from_path(p),
                Some(AssetKind::PrefabDescriptor | AssetKind::ModelMetadata)
            )
        })
        .filter(|p| matches_filter(&p.to_string_lossy().replace('\\', "/"), matcher))
        .collect();
    assets.sort();
    Ok(assets)
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                collect_recursive(&path, files)?;
            } else {
                files.push(path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_glob_patterns() {
        let m = create_glob_matcher("*.ppd").unwrap();
        assert!(m.is_match("prefab/cross/cross.ppd"));
        assert!(!m.is_match("prefab/cross/cross.pmd"));

        let m = create_glob_matcher("cross").unwrap();
        assert!(m.is_match("prefab/cross_2/x.ppd"));
        assert!(matches_filter("anything", None));
    }

    #[test]
    fn test_asset_kind() {
        assert_eq!(
            AssetKind::from_path(Path::new("a/b.PPD")),
            Some(AssetKind::PrefabDescriptor)
        );
        assert_eq!(
            AssetKind::from_path(Path::new("b.pmg")),
            Some(AssetKind::ModelGeometry)
        );
        assert_eq!(AssetKind::from_path(Path::new("b.tobj")), None);
    }

    #[test]
    fn test_collect_assets() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("prefab").join("cross");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("cross.ppd"), b"").unwrap();
        fs::write(nested.join("cross.pmd"), b"").unwrap();
        fs::write(nested.join("cross.pmg"), b"").unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let all = collect_assets(dir.path(), None).unwrap();
        assert_eq!(all.len(), 2);

        let m = create_glob_matcher("*.ppd").unwrap();
        let ppds = collect_assets(dir.path(), Some(&m)).unwrap();
        assert_eq!(ppds, vec![nested.join("cross.ppd")]);
    }
}
