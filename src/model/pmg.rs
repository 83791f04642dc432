//! Model geometry (`.pmg`)
//!
//! Unlike the metadata file, the section offsets in the geometry header
//! are followed on read. On write every section is first built in its
//! own buffer so all offsets are known before the header is written.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::io::{
    read_count, read_records, write_count, write_offset, write_records, ReadTokenExt, Record,
    WriteTokenExt,
};
use crate::math::{AxisAlignedBox, Vector3};
use crate::model::piece::PIECE_HEADER_SIZE;
use crate::model::pmd::{PMD_VERSION, PMG_SIGNATURE};
use crate::model::{Bone, Locator, Model, Part, Piece};

pub(crate) const PMG_VERSION: u8 = 0x15;

/// Size of the 10-field offset table that precedes the skeleton
const OFFSET_TABLE_SIZE: u64 = 10 * 4;

fn claim(index: u32, count: u32, pool: usize, what: &str) -> Result<std::ops::Range<usize>> {
    let start = index as usize;
    let end = start
        .checked_add(count as usize)
        .filter(|&end| end <= pool)
        .ok_or_else(|| {
            Error::MalformedData(format!(
                "part {} range {}+{} is outside the pool of {}",
                what, index, count, pool
            ))
        })?;
    Ok(start..end)
}

impl Model {
    pub(crate) fn read_pmg<R: Read + Seek>(&mut self, r: &mut R) -> Result<()> {
        let mut head = [0u8; 4];
        r.read_exact(&mut head)?;
        if &head[1..4] != PMG_SIGNATURE {
            if u32::from_le_bytes(head) == PMD_VERSION {
                return Err(Error::WrongFormat(
                    "this is a .pmd file, not a .pmg file".to_string(),
                ));
            }
            return Err(Error::MalformedData("missing .pmg signature".to_string()));
        }
        if head[0] != PMG_VERSION {
            return Err(Error::UnsupportedVersion {
                format: ".pmg",
                version: u32::from(head[0]),
            });
        }

        let piece_count = read_count(r)?;
        let part_count = read_count(r)?;
        let bone_count = read_count(r)?;
        let weight_width = r.read_i32::<LittleEndian>()?;
        let locator_count = read_count(r)?;
        let skeleton_hash = r.read_u64::<LittleEndian>()?;

        let bounding_box_center = Vector3::read(r, ())?;
        let bounding_box_diagonal = r.read_f32::<LittleEndian>()?;
        let bounding_box = AxisAlignedBox::read(r, ())?;

        let skeleton_offset = r.read_u32::<LittleEndian>()?;
        let parts_offset = r.read_u32::<LittleEndian>()?;
        let locators_offset = r.read_u32::<LittleEndian>()?;
        let pieces_offset = r.read_u32::<LittleEndian>()?;
        let string_pool_offset = r.read_u32::<LittleEndian>()?;
        let string_pool_size = r.read_u32::<LittleEndian>()?;
        let _vertex_pool_offset = r.read_u32::<LittleEndian>()?;
        let _vertex_pool_size = r.read_u32::<LittleEndian>()?;
        let _index_pool_offset = r.read_u32::<LittleEndian>()?;
        let _index_pool_size = r.read_u32::<LittleEndian>()?;

        debug!(
            piece_count,
            part_count, bone_count, locator_count, "Reading pmg"
        );

        r.seek(SeekFrom::Start(u64::from(skeleton_offset)))?;
        let skeleton: Vec<Bone> = read_records(r, bone_count, ())?;

        // locators and pieces first, so parts can claim ranges of them
        r.seek(SeekFrom::Start(u64::from(locators_offset)))?;
        let locators: Vec<Locator> = read_records(r, locator_count, ())?;
        let position = r.stream_position()?;
        if position != u64::from(pieces_offset) {
            trace!(
                expected = pieces_offset,
                actual = position,
                "Piece headers do not follow locators"
            );
        }
        let mut pieces = Vec::with_capacity(piece_count.min(0x1_0000));
        for _ in 0..piece_count {
            pieces.push(Piece::read(r)?);
        }

        r.seek(SeekFrom::Start(u64::from(parts_offset)))?;
        let mut parts = Vec::with_capacity(part_count.min(0x1_0000));
        for _ in 0..part_count {
            let name = r.read_token()?;
            let part_piece_count = r.read_u32::<LittleEndian>()?;
            let part_piece_index = r.read_u32::<LittleEndian>()?;
            let part_locator_count = r.read_u32::<LittleEndian>()?;
            let part_locator_index = r.read_u32::<LittleEndian>()?;
            parts.push(Part {
                name,
                pieces: claim(part_piece_index, part_piece_count, pieces.len(), "piece")?,
                locators: claim(
                    part_locator_index,
                    part_locator_count,
                    locators.len(),
                    "locator",
                )?,
            });
        }

        // size comes from the header, so never allocate more than the stream holds
        let mut string_pool = Vec::new();
        if string_pool_size > 0 {
            r.seek(SeekFrom::Start(u64::from(string_pool_offset)))?;
            r.by_ref()
                .take(u64::from(string_pool_size))
                .read_to_end(&mut string_pool)?;
            if string_pool.len() != string_pool_size as usize {
                return Err(Error::MalformedData(format!(
                    "string pool of {} bytes ends after {}",
                    string_pool_size,
                    string_pool.len()
                )));
            }
        }

        self.weight_width = weight_width;
        self.skeleton_hash = skeleton_hash;
        self.bounding_box_center = bounding_box_center;
        self.bounding_box_diagonal = bounding_box_diagonal;
        self.bounding_box = bounding_box;
        self.skeleton = skeleton;
        self.locators = locators;
        self.pieces = pieces;
        self.parts = parts;
        self.string_pool = string_pool;
        Ok(())
    }

    /// Write the geometry half of the model.
    ///
    /// Pieces and locators are emitted part by part, in part order.
    pub fn serialize_pmg<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        self.check_part_ranges()?;

        let pieces: Vec<&Piece> = self.parts.iter().flat_map(|p| self.part_pieces(p)).collect();
        let locators: Vec<&Locator> = self
            .parts
            .iter()
            .flat_map(|p| self.part_locators(p))
            .collect();

        let mut skeleton = Vec::new();
        write_records(&mut skeleton, &self.skeleton)?;

        let mut parts = Vec::new();
        let mut piece_index = 0;
        let mut locator_index = 0;
        for part in &self.parts {
            parts.write_token(part.name)?;
            write_count(&mut parts, part.pieces.len())?;
            write_count(&mut parts, piece_index)?;
            piece_index += part.pieces.len();
            write_count(&mut parts, part.locators.len())?;
            write_count(&mut parts, locator_index)?;
            locator_index += part.locators.len();
        }

        let mut locator_block = Vec::new();
        write_records(&mut locator_block, locators.iter().copied())?;

        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for piece in &pieces {
            piece.write_vertices(&mut vertices)?;
            piece.write_triangles(&mut triangles)?;
        }

        let start = w.stream_position()?;
        w.write_u8(PMG_VERSION)?;
        w.write_all(PMG_SIGNATURE)?;
        write_count(w, pieces.len())?;
        write_count(w, self.parts.len())?;
        write_count(w, self.skeleton.len())?;
        w.write_i32::<LittleEndian>(self.weight_width)?;
        write_count(w, locators.len())?;
        w.write_u64::<LittleEndian>(self.skeleton_hash)?;
        self.bounding_box_center.write(w)?;
        w.write_f32::<LittleEndian>(self.bounding_box_diagonal)?;
        self.bounding_box.write(w)?;

        let skeleton_offset = w.stream_position()? + OFFSET_TABLE_SIZE;
        let parts_offset = skeleton_offset + skeleton.len() as u64;
        let locators_offset = parts_offset + parts.len() as u64;
        let pieces_offset = locators_offset + locator_block.len() as u64;
        let string_pool_offset = pieces_offset + (pieces.len() * PIECE_HEADER_SIZE) as u64;
        let vertex_pool_offset = string_pool_offset + self.string_pool.len() as u64;
        let index_pool_offset = vertex_pool_offset + vertices.len() as u64;

        let mut piece_headers = Vec::with_capacity(pieces.len() * PIECE_HEADER_SIZE);
        let mut vertex_offset = vertex_pool_offset;
        let mut index_offset = index_pool_offset;
        for piece in &pieces {
            piece.write_header(&mut piece_headers, vertex_offset as u32, index_offset as u32)?;
            vertex_offset += piece.vertex_block_len() as u64;
            index_offset += piece.index_block_len() as u64;
        }

        write_offset(w, skeleton_offset)?;
        write_offset(w, parts_offset)?;
        write_offset(w, locators_offset)?;
        write_offset(w, pieces_offset)?;
        write_offset(w, string_pool_offset)?;
        write_count(w, self.string_pool.len())?;
        write_offset(w, vertex_pool_offset)?;
        write_count(w, vertices.len())?;
        write_offset(w, index_pool_offset)?;
        write_count(w, triangles.len())?;

        w.write_all(&skeleton)?;
        w.write_all(&parts)?;
        w.write_all(&locator_block)?;
        w.write_all(&piece_headers)?;
        w.write_all(&self.string_pool)?;
        w.write_all(&vertices)?;
        w.write_all(&triangles)?;

        let end = w.stream_position()?;
        debug!(bytes = end - start, pieces = pieces.len(), "Wrote pmg");
        Ok(())
    }
}
