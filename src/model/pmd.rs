//! Model metadata (`.pmd`)

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{
    read_count, split_cstrings, write_count, write_offset, ReadTokenExt, WriteTokenExt,
};
use crate::model::{Look, Model, PartAttribute, Variant};

pub(crate) const PMD_VERSION: u32 = 4;

/// Geometry file signature, found at byte 1
pub(crate) const PMG_SIGNATURE: &[u8; 3] = b"gmP";

/// Position of the first size/offset field in the header
const SIZES_POS: u64 = 28;

impl Model {
    /// Part attribute pairs for the metadata file.
    ///
    /// Pairs read from a file are kept while they still match the parts.
    /// A model without geometry keeps them as well, so metadata loaded on
    /// its own writes back unchanged. Otherwise one `(i, i + 1)` pair is
    /// generated per part.
    fn part_attribs_to_write(&self) -> Vec<(i32, i32)> {
        if self.part_attribs.len() == self.parts.len() || self.parts.is_empty() {
            return self.part_attribs.clone();
        }
        (0..self.parts.len() as i32).map(|i| (i, i + 1)).collect()
    }

    pub(crate) fn read_pmd<R: Read + Seek>(&mut self, r: &mut R) -> Result<()> {
        let start = r.stream_position()?;

        // a geometry file has its signature right after the version byte
        let mut head = [0u8; 4];
        r.read_exact(&mut head)?;
        if &head[1..4] == PMG_SIGNATURE {
            return Err(Error::WrongFormat(
                "this is a .pmg file, not a .pmd file".to_string(),
            ));
        }
        r.seek(SeekFrom::Start(start))?;

        let version = r.read_u32::<LittleEndian>()?;
        if version != PMD_VERSION {
            return Err(Error::UnsupportedVersion {
                format: ".pmd",
                version,
            });
        }

        let material_count = read_count(r)?;
        let look_count = read_count(r)?;
        let piece_count = r.read_u32::<LittleEndian>()?;
        let variant_count = read_count(r)?;
        let part_count = read_count(r)?;
        let attribs_count = read_count(r)?;

        // sizes and offsets; sections are read sequentially instead
        let mut sizes = [0u32; 9];
        r.read_u32_into::<LittleEndian>(&mut sizes)?;

        debug!(
            material_count,
            look_count, variant_count, part_count, attribs_count, "Reading pmd"
        );

        let mut looks = Vec::with_capacity(look_count.min(0x1000));
        for _ in 0..look_count {
            looks.push(Look::new(r.read_token()?));
        }

        let mut variants = Vec::with_capacity(variant_count.min(0x1000));
        for _ in 0..variant_count {
            variants.push(Variant::new(r.read_token()?));
        }

        let mut part_attribs = Vec::with_capacity(part_count.min(0x1000));
        for _ in 0..part_count {
            let from = r.read_i32::<LittleEndian>()?;
            let to = r.read_i32::<LittleEndian>()?;
            part_attribs.push((from, to));
        }

        // every variant has the same attributes
        for _ in 0..attribs_count {
            let tag = r.read_token()?;
            let attribute_type = r.read_i32::<LittleEndian>()?;
            let _offset = r.read_i32::<LittleEndian>()?;
            for variant in variants.iter_mut() {
                variant.attributes.push(PartAttribute {
                    tag,
                    attribute_type,
                    value: 0,
                });
            }
        }

        for variant in variants.iter_mut() {
            for attribute in variant.attributes.iter_mut() {
                attribute.value = r.read_u32::<LittleEndian>()?;
            }
        }

        // material path offsets, recomputed on write
        let offset_table_len = (look_count as u64) * (material_count as u64) * 4;
        r.seek(SeekFrom::Current(offset_table_len as i64))?;

        // material block size is unreliable, so read to the end
        let mut blob = Vec::new();
        r.read_to_end(&mut blob)?;
        let materials = split_cstrings(&blob)?;
        if materials.len() < look_count * material_count {
            return Err(Error::MalformedData(format!(
                "expected {} material paths, found {}",
                look_count * material_count,
                materials.len()
            )));
        }
        for (look, chunk) in looks.iter_mut().zip(materials.chunks(material_count.max(1))) {
            if material_count > 0 {
                look.materials = chunk.to_vec();
            }
        }

        self.looks = looks;
        self.variants = variants;
        self.part_attribs = part_attribs;
        self.pmd_piece_count = piece_count;
        Ok(())
    }

    /// Write the metadata half of the model.
    pub fn serialize_pmd<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        let start = w.stream_position()?;
        let material_count = self.looks.first().map_or(0, |l| l.materials.len());
        if let Some(look) = self
            .looks
            .iter()
            .find(|l| l.materials.len() != material_count)
        {
            return Err(Error::MalformedData(format!(
                "look {} has {} materials, expected {}",
                look.name,
                look.materials.len(),
                material_count
            )));
        }
        let attributes = self.variants.first().map_or(&[][..], |v| &v.attributes[..]);
        let part_attribs = self.part_attribs_to_write();

        w.write_u32::<LittleEndian>(PMD_VERSION)?;
        write_count(w, material_count)?;
        write_count(w, self.looks.len())?;
        w.write_u32::<LittleEndian>(self.pmd_piece_count)?;
        write_count(w, self.variants.len())?;
        write_count(w, part_attribs.len())?;
        write_count(w, attributes.len())?;

        // sizes and offsets; filled in at the end
        for _ in 0..9 {
            w.write_u32::<LittleEndian>(0)?;
        }

        let look_offset = w.stream_position()?;
        for look in &self.looks {
            w.write_token(look.name)?;
        }

        let variant_offset = w.stream_position()?;
        for variant in &self.variants {
            w.write_token(variant.name)?;
        }

        let part_attribs_offset = w.stream_position()?;
        for &(from, to) in &part_attribs {
            w.write_i32::<LittleEndian>(from)?;
            w.write_i32::<LittleEndian>(to)?;
        }

        let attribs_header_offset = w.stream_position()?;
        for (i, attribute) in attributes.iter().enumerate() {
            w.write_token(attribute.tag)?;
            w.write_i32::<LittleEndian>(attribute.attribute_type)?;
            w.write_i32::<LittleEndian>((i * 4) as i32)?;
        }

        let attribs_values_offset = w.stream_position()?;
        for variant in &self.variants {
            if variant.attributes.len() != attributes.len() {
                return Err(Error::MalformedData(format!(
                    "variant {} has {} attributes, expected {}",
                    variant.name,
                    variant.attributes.len(),
                    attributes.len()
                )));
            }
            for attribute in &variant.attributes {
                w.write_u32::<LittleEndian>(attribute.value)?;
            }
        }

        let material_offsets_offset = w.stream_position()?;
        let materials: Vec<&str> = self
            .looks
            .iter()
            .flat_map(|l| l.materials.iter().map(String::as_str))
            .collect();
        let mut material_offset = material_offsets_offset + materials.len() as u64 * 4;
        for material in &materials {
            write_offset(w, material_offset)?;
            material_offset += material.len() as u64 + 1;
        }

        let material_paths_offset = w.stream_position()?;
        for material in &materials {
            w.write_all(material.as_bytes())?;
            w.write_u8(0)?;
        }
        let end = w.stream_position()?;

        let attribs_values_size = match self.variants.len() as u64 {
            0 => 0,
            n => (material_offsets_offset - attribs_values_offset) / n,
        };

        w.seek(SeekFrom::Start(start + SIZES_POS))?;
        write_offset(w, attribs_values_size)?;
        write_offset(w, end - material_paths_offset)?;
        write_offset(w, look_offset)?;
        write_offset(w, variant_offset)?;
        write_offset(w, part_attribs_offset)?;
        write_offset(w, attribs_values_offset)?;
        write_offset(w, attribs_header_offset)?;
        write_offset(w, material_offsets_offset)?;
        write_offset(w, material_paths_offset)?;
        w.seek(SeekFrom::Start(end))?;

        debug!(bytes = end - start, "Wrote pmd");
        Ok(())
    }
}
