//! Asset utility functions
//!
//! Command-level operations used by the CLI: printing a summary of a
//! file, round-trip verification of a directory tree, and upgrading
//! prefab descriptors to the latest revision.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::{Model, PMG_EXTENSION};
use crate::ppd::{PpdVersion, PrefabDescriptor};
use crate::utils::{collect_assets, create_glob_matcher, format_size, AssetKind};

/// Result of round-tripping one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Re-serialized bytes equal the input
    Identical,
    /// The asset was upgraded on write, so only a second round trip is
    /// compared
    Upgraded,
    /// Bytes differ; the file and offset of the first difference
    Mismatch { file: PathBuf, offset: usize },
}

/// Totals for a directory verification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub identical: u64,
    pub upgraded: u64,
    pub mismatched: u64,
    pub failed: u64,
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

/// Print a summary of a `.ppd`, `.pmd` or `.pmg` file
pub fn show_info(path: &Path) -> Result<()> {
    let kind = AssetKind::from_path(path)
        .with_context(|| format!("Unknown asset type: {}", path.display()))?;
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    println!("File: {}", path.display());
    println!("Size: {}", format_size(size));

    match kind {
        AssetKind::PrefabDescriptor => {
            let ppd = PrefabDescriptor::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let terrain_points: usize = ppd
                .nodes
                .iter()
                .map(|n| n.terrain_points.point_count())
                .sum();

            println!("Format: prefab descriptor, version {:#x}", ppd.version.to_u32());
            println!("Control nodes: {}", ppd.nodes.len());
            println!("Terrain points: {}", terrain_points);
            println!("Nav curves: {}", ppd.nav_curves.len());
            println!("Nav nodes: {}", ppd.nav_nodes.len());
            println!("Signs: {}", ppd.signs.len());
            println!("Semaphores: {}", ppd.semaphores.len());
            println!("Spawn points: {}", ppd.spawn_points.len());
            println!("Map points: {}", ppd.map_points.len());
            println!("Trigger points: {}", ppd.trigger_points.len());
            println!("Intersections: {}", ppd.intersections.len());
        }
        AssetKind::ModelMetadata | AssetKind::ModelGeometry => {
            let model = open_model(path)?;
            let vertices: usize = model.pieces.iter().map(|p| p.vertices.len()).sum();
            let triangles: usize = model.pieces.iter().map(|p| p.triangles.len()).sum();

            println!("Format: model");
            println!("Looks: {}", model.looks.len());
            for look in &model.looks {
                println!("  {} ({} materials)", look.name, look.materials.len());
            }
            println!("Variants: {}", model.variants.len());
            println!("Bones: {}", model.skeleton.len());
            println!("Parts: {}", model.parts.len());
            for part in &model.parts {
                println!(
                    "  {} ({} pieces, {} locators)",
                    part.name,
                    part.pieces.len(),
                    part.locators.len()
                );
            }
            println!("Pieces: {} ({} vertices, {} triangles)", model.pieces.len(), vertices, triangles);
            println!("Locators: {}", model.locators.len());
        }
    }

    Ok(())
}

/// Open a model from either of its two files. A missing half is treated
/// as empty.
fn open_model(path: &Path) -> Result<Model> {
    let pmd_path = path.with_extension("pmd");
    let pmg_path = path.with_extension(PMG_EXTENSION);
    let read_or_empty = |p: &Path| -> Result<Vec<u8>> {
        if p.exists() {
            fs::read(p).with_context(|| format!("Failed to read {}", p.display()))
        } else {
            Ok(Vec::new())
        }
    };
    let pmd = read_or_empty(&pmd_path)?;
    let pmg = read_or_empty(&pmg_path)?;
    Model::load(&pmd, &pmg).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load an asset and write it back, comparing against the input
pub fn verify_asset(path: &Path) -> Result<VerifyOutcome> {
    match AssetKind::from_path(path) {
        Some(AssetKind::PrefabDescriptor) => {
            let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let mut ppd = PrefabDescriptor::load(&data)?;
            let written = ppd.to_bytes()?;

            if ppd.version == PpdVersion::LATEST {
                return Ok(match first_difference(&data, &written) {
                    None => VerifyOutcome::Identical,
                    Some(offset) => VerifyOutcome::Mismatch {
                        file: path.to_path_buf(),
                        offset,
                    },
                });
            }

            // older revisions are upgraded; the upgraded form must be stable
            let rewritten = PrefabDescriptor::load(&written)?.to_bytes()?;
            Ok(match first_difference(&written, &rewritten) {
                None => VerifyOutcome::Upgraded,
                Some(offset) => VerifyOutcome::Mismatch {
                    file: path.to_path_buf(),
                    offset,
                },
            })
        }
        Some(AssetKind::ModelMetadata) => {
            let pmd = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let pmg_path = path.with_extension(PMG_EXTENSION);
            let pmg = if pmg_path.exists() {
                fs::read(&pmg_path)
                    .with_context(|| format!("Failed to read {}", pmg_path.display()))?
            } else {
                Vec::new()
            };

            let model = Model::load(&pmd, &pmg)?;
            let (pmd_out, pmg_out) = model.to_bytes()?;
            if let Some(offset) = first_difference(&pmd, &pmd_out) {
                return Ok(VerifyOutcome::Mismatch {
                    file: path.to_path_buf(),
                    offset,
                });
            }
            if !pmg.is_empty() {
                if let Some(offset) = first_difference(&pmg, &pmg_out) {
                    return Ok(VerifyOutcome::Mismatch {
                        file: pmg_path,
                        offset,
                    });
                }
            }
            Ok(VerifyOutcome::Identical)
        }
        _ => bail!("Not a verifiable asset: {}", path.display()),
    }
}

/// Round-trip every matching asset under `dir`
pub fn verify_directory(dir: &Path, filter: Option<&str>) -> Result<VerifyReport> {
    let matcher = filter.map(create_glob_matcher).transpose()?;
    let assets = collect_assets(dir, matcher.as_ref())?;

    let mut report = VerifyReport::default();
    if assets.is_empty() {
        println!("No assets match the filter");
        return Ok(report);
    }

    info!("Verifying {} assets under {}", assets.len(), dir.display());

    let pb = ProgressBar::new(assets.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )?);

    for path in &assets {
        pb.set_message(path.display().to_string());

        match verify_asset(path) {
            Ok(VerifyOutcome::Identical) => report.identical += 1,
            Ok(VerifyOutcome::Upgraded) => report.upgraded += 1,
            Ok(VerifyOutcome::Mismatch { file, offset }) => {
                pb.println(format!(
                    "Mismatch in {} at byte {:#x}",
                    file.display(),
                    offset
                ));
                report.mismatched += 1;
            }
            Err(e) => {
                pb.println(format!("Error verifying {}: {:#}", path.display(), e));
                report.failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!();
    println!("Identical: {}", report.identical);
    if report.upgraded > 0 {
        println!("Upgraded: {}", report.upgraded);
    }
    if report.mismatched > 0 {
        println!("Mismatched: {}", report.mismatched);
    }
    if report.failed > 0 {
        println!("Failed: {}", report.failed);
    }

    Ok(report)
}

/// Rewrite a prefab descriptor in the latest revision
///
/// Writes next to the input as `<name>.ppd` in `output`, or over the
/// input when no output is given.
pub fn upgrade_ppd(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let mut ppd = PrefabDescriptor::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let from = ppd.version;

    let target = output.map_or_else(|| input.to_path_buf(), Path::to_path_buf);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    ppd.save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    debug!(from = from.to_u32(), "Upgraded prefab descriptor");
    println!(
        "{}: {:#x} -> {:#x}",
        target.display(),
        from.to_u32(),
        PpdVersion::LATEST.to_u32()
    );
    Ok(target)
}
