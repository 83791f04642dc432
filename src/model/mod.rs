//! Model reader and writer (`.pmd` + `.pmg`)
//!
//! A model is stored as two files with the same name:
//!
//! - `.pmd`: metadata. Looks with their material paths, variants with
//!   their attribute values.
//! - `.pmg`: geometry. Skeleton, parts, pieces, locators and the vertex
//!   and index pools.
//!
//! Both are loaded into one [`Model`]. Pieces and locators live in flat
//! pools on the model; each [`Part`] refers to a contiguous range of
//! them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scs_models::model::Model;
//!
//! let model = Model::open("vehicle/truck/cabin.pmd")?;
//! for part in &model.parts {
//!     println!("{}: {} pieces", part.name, model.part_pieces(part).len());
//! }
//! model.save("out", "cabin")?;
//! # Ok::<(), scs_models::Error>(())
//! ```

mod bone;
mod locator;
mod look;
mod piece;
mod pmd;
mod pmg;

pub use bone::Bone;
pub use locator::Locator;
pub use look::{Look, Part, PartAttribute, Variant};
pub use piece::{Color, Piece, Triangle, Vertex};

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::{DiskFileSystem, FileSystem};
use crate::io::stream_len;
use crate::math::{AxisAlignedBox, Vector3};
use crate::token::Token;

/// Extension of the metadata file
pub const PMD_EXTENSION: &str = "pmd";
/// Extension of the geometry file
pub const PMG_EXTENSION: &str = "pmg";

/// Metadata and geometry of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub looks: Vec<Look>,
    pub variants: Vec<Variant>,
    pub bounding_box: AxisAlignedBox,
    pub bounding_box_center: Vector3,
    pub bounding_box_diagonal: f32,
    pub skeleton: Vec<Bone>,
    pub parts: Vec<Part>,
    /// Piece pool; parts refer into it by range
    pub pieces: Vec<Piece>,
    /// Locator pool; parts refer into it by range
    pub locators: Vec<Locator>,
    /// Geometry header field of unknown meaning, kept as read
    pub weight_width: i32,
    /// Kept as read; not recomputed
    pub skeleton_hash: u64,
    /// Raw geometry string pool
    pub string_pool: Vec<u8>,
    /// Piece count field of the metadata header, kept as read
    pub pmd_piece_count: u32,
    /// Opaque index pairs from the metadata file, one per part
    part_attribs: Vec<(i32, i32)>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// An empty model with a `default` look and a `default` variant.
    pub fn new() -> Self {
        let default = Token::new("default").unwrap_or(Token::EMPTY);
        Self {
            looks: vec![Look::new(default)],
            variants: vec![Variant::new(default)],
            bounding_box: AxisAlignedBox::default(),
            bounding_box_center: Vector3::ZERO,
            bounding_box_diagonal: 0.0,
            skeleton: Vec::new(),
            parts: Vec::new(),
            pieces: Vec::new(),
            locators: Vec::new(),
            weight_width: 0,
            skeleton_hash: 0,
            string_pool: Vec::new(),
            pmd_piece_count: 0,
            part_attribs: Vec::new(),
        }
    }

    /// Open a model from disk. `pmd_path` names the `.pmd` file; the
    /// `.pmg` next to it is opened as well.
    pub fn open<P: AsRef<Path>>(pmd_path: P) -> Result<Self> {
        Self::open_with(&DiskFileSystem, pmd_path.as_ref())
    }

    /// Open a model through a [`FileSystem`].
    pub fn open_with(fs: &dyn FileSystem, pmd_path: &Path) -> Result<Self> {
        let pmg_path = pmd_path.with_extension(PMG_EXTENSION);
        let mut pmd = fs.open(pmd_path)?;
        let mut pmg = fs.open(&pmg_path)?;
        Self::read(&mut pmd, &mut pmg)
    }

    /// Parse a model held in memory.
    pub fn load(pmd: &[u8], pmg: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(pmd), &mut Cursor::new(pmg))
    }

    /// Parse a model from a metadata and a geometry stream.
    ///
    /// A zero-length stream is treated as "no data" for that half.
    pub fn read<R1, R2>(pmd: &mut R1, pmg: &mut R2) -> Result<Self>
    where
        R1: Read + Seek,
        R2: Read + Seek,
    {
        let mut model = Model::new();
        if stream_len(pmd)? > 0 {
            model.read_pmd(pmd)?;
        }
        if stream_len(pmg)? > 0 {
            model.read_pmg(pmg)?;
        }
        Ok(model)
    }

    /// Write `<name>.pmd` and `<name>.pmg` into `directory`.
    pub fn save<P: AsRef<Path>>(&self, directory: P, name: &str) -> Result<()> {
        let pmd_path = directory
            .as_ref()
            .join(format!("{}.{}", name, PMD_EXTENSION));
        let mut pmd = BufWriter::new(File::create(&pmd_path)?);
        self.serialize_pmd(&mut pmd)?;
        pmd.flush()?;

        let mut pmg = BufWriter::new(File::create(pmd_path.with_extension(PMG_EXTENSION))?);
        self.serialize_pmg(&mut pmg)?;
        pmg.flush()?;
        Ok(())
    }

    /// Serialize both halves into new buffers.
    pub fn to_bytes(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut pmd = Cursor::new(Vec::new());
        self.serialize_pmd(&mut pmd)?;
        let mut pmg = Cursor::new(Vec::new());
        self.serialize_pmg(&mut pmg)?;
        Ok((pmd.into_inner(), pmg.into_inner()))
    }

    /// The pieces of a part
    pub fn part_pieces(&self, part: &Part) -> &[Piece] {
        self.pieces.get(part.pieces.clone()).unwrap_or(&[])
    }

    /// The locators of a part
    pub fn part_locators(&self, part: &Part) -> &[Locator] {
        self.locators.get(part.locators.clone()).unwrap_or(&[])
    }

    /// Append a part that owns the given pieces and locators.
    pub fn add_part(&mut self, name: Token, pieces: Vec<Piece>, locators: Vec<Locator>) {
        let piece_start = self.pieces.len();
        self.pieces.extend(pieces);
        let locator_start = self.locators.len();
        self.locators.extend(locators);
        self.parts.push(Part {
            name,
            pieces: piece_start..self.pieces.len(),
            locators: locator_start..self.locators.len(),
        });
    }

    /// Check every part range against the pools.
    pub(crate) fn check_part_ranges(&self) -> Result<()> {
        for part in &self.parts {
            if part.pieces.start > part.pieces.end || part.pieces.end > self.pieces.len() {
                return Err(Error::MalformedData(format!(
                    "part {} pieces {:?} outside pool of {}",
                    part.name,
                    part.pieces,
                    self.pieces.len()
                )));
            }
            if part.locators.start > part.locators.end || part.locators.end > self.locators.len() {
                return Err(Error::MalformedData(format!(
                    "part {} locators {:?} outside pool of {}",
                    part.name,
                    part.locators,
                    self.locators.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::math::{Quaternion, Vector2};

    /// A small model touching every section of both files
    pub(crate) fn sample() -> Model {
        let mut model = Model::new();
        model.looks[0].materials = vec![
            "/material/body.mat".to_string(),
            "/material/glass.mat".to_string(),
        ];
        let mut dirty = Look::new(Token::new("dirty").unwrap());
        dirty.materials = vec![
            "/material/body_dirty.mat".to_string(),
            "/material/glass.mat".to_string(),
        ];
        model.looks.push(dirty);

        let visible = Token::new("visible").unwrap();
        model.variants[0].attributes = vec![
            PartAttribute {
                tag: visible,
                attribute_type: 0,
                value: 1,
            },
            PartAttribute {
                tag: visible,
                attribute_type: 0,
                value: 0,
            },
        ];
        let mut closed = Variant::new(Token::new("closed").unwrap());
        closed.attributes = vec![
            PartAttribute {
                tag: visible,
                attribute_type: 0,
                value: 0,
            },
            PartAttribute {
                tag: visible,
                attribute_type: 0,
                value: 1,
            },
        ];
        model.variants.push(closed);

        model.bounding_box_center = Vector3::new(0.0, 1.0, 0.0);
        model.bounding_box_diagonal = 2.5;
        model.bounding_box = AxisAlignedBox {
            start: Vector3::new(-1.0, 0.0, -1.0),
            end: Vector3::new(1.0, 2.0, 1.0),
        };
        model.weight_width = 4;
        model.skeleton_hash = 0x1234_5678_9ABC_DEF0;
        model.pmd_piece_count = 2;
        model.skeleton.push(Bone {
            name: Token::new("root").unwrap(),
            ..Default::default()
        });
        model.string_pool = b"hookup.wheel\0".to_vec();

        let mut body = Piece {
            material: 0,
            ..Default::default()
        };
        for i in 0..3 {
            let mut v = Vertex::new(Vector3::new(i as f32, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
            v.texture_coordinates = vec![Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0)];
            v.bone_indices = Some([0, 0, 0, 0]);
            v.bone_weights = Some([255, 0, 0, 0]);
            body.vertices.push(v);
        }
        body.triangles.push(Triangle::new(0, 1, 2));

        let mut glass = Piece {
            material: 1,
            ..Default::default()
        };
        for i in 0..4 {
            let mut v = Vertex::new(Vector3::new(0.0, i as f32, 0.0), Vector3::new(1.0, 0.0, 0.0));
            v.secondary_color = Some(Color::new(1, 2, 3, 4));
            glass.vertices.push(v);
        }
        glass.triangles = vec![Triangle::new(0, 1, 2), Triangle::new(2, 3, 0)];

        let wheel = Locator {
            name: Token::new("wheel").unwrap(),
            position: Vector3::new(1.0, 0.0, 1.0),
            rotation: Quaternion::new(0.0, 0.707, 0.0, 0.707),
            hookup_offset: 0,
            ..Default::default()
        };

        model.add_part(Token::new("body").unwrap(), vec![body], vec![wheel]);
        model.add_part(Token::new("glass").unwrap(), vec![glass], Vec::new());
        model
    }

    #[test]
    fn test_new_model_defaults() {
        let model = Model::new();
        assert_eq!(model.looks[0].name.as_string(), "default");
        assert_eq!(model.variants[0].name.as_string(), "default");
        assert!(model.parts.is_empty());
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let model = sample();
        let (pmd, pmg) = model.to_bytes().unwrap();

        let loaded = Model::load(&pmd, &pmg).unwrap();
        let (pmd2, pmg2) = loaded.to_bytes().unwrap();
        assert_eq!(pmd2, pmd);
        assert_eq!(pmg2, pmg);

        assert_eq!(loaded.looks, model.looks);
        assert_eq!(loaded.variants, model.variants);
        assert_eq!(loaded.pieces, model.pieces);
        assert_eq!(loaded.locators, model.locators);
        assert_eq!(loaded.parts, model.parts);
        assert_eq!(loaded.skeleton, model.skeleton);
        assert_eq!(loaded.weight_width, 4);
        assert_eq!(loaded.skeleton_hash, model.skeleton_hash);
        assert_eq!(loaded.string_pool, model.string_pool);
    }

    #[test]
    fn test_part_ranges_cover_pools() {
        let (pmd, pmg) = sample().to_bytes().unwrap();
        let model = Model::load(&pmd, &pmg).unwrap();

        let mut next_piece = 0;
        let mut next_locator = 0;
        for part in &model.parts {
            assert_eq!(part.pieces.start, next_piece);
            assert_eq!(part.locators.start, next_locator);
            next_piece = part.pieces.end;
            next_locator = part.locators.end;
        }
        assert_eq!(next_piece, model.pieces.len());
        assert_eq!(next_locator, model.locators.len());
        assert_eq!(model.part_pieces(&model.parts[1])[0].material, 1);
        assert_eq!(model.part_locators(&model.parts[0])[0].name.as_string(), "wheel");
    }

    #[test]
    fn test_empty_streams() {
        let model = Model::load(&[], &[]).unwrap();
        assert_eq!(model, Model::new());

        let (pmd, _) = sample().to_bytes().unwrap();
        let model = Model::load(&pmd, &[]).unwrap();
        assert_eq!(model.looks.len(), 2);
        assert!(model.parts.is_empty());
    }

    #[test]
    fn test_open_with_memory_fs() {
        let (pmd, pmg) = sample().to_bytes().unwrap();
        let mut fs = MemoryFileSystem::new();
        fs.insert("model/cabin.pmd", pmd);
        fs.insert("model/cabin.pmg", pmg);

        let model = Model::open_with(&fs, Path::new("model/cabin.pmd")).unwrap();
        assert_eq!(model.parts.len(), 2);

        let mut fs = MemoryFileSystem::new();
        fs.insert("model/cabin.pmd", Vec::new());
        assert!(Model::open_with(&fs, Path::new("model/cabin.pmd")).is_err());
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample();
        model.save(dir.path(), "cabin").unwrap();

        assert!(dir.path().join("cabin.pmg").exists());
        let opened = Model::open(dir.path().join("cabin.pmd")).unwrap();
        assert_eq!(opened.pieces, model.pieces);
        assert_eq!(opened.looks, model.looks);
    }
}
