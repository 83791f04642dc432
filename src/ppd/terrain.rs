//! Terrain points and the per-node variant remapper
//!
//! On disk all terrain point positions and normals of a prefab are two
//! flat arrays. Each control node owns a range of them, and optionally a
//! range of [`TerrainPointVariant`] descriptors which split that range
//! into per-model-variant sub-ranges. In memory a node keeps a
//! [`TerrainPointMap`] from variant key to its points instead.
//!
//! A node with exactly one variant is stored without descriptors and
//! always reads back under key `0`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};
use std::ops::Range;

use tracing::trace;

use crate::error::{Error, Result};
use crate::io::Record;
use crate::math::Vector3;
use crate::ppd::ControlNode;

/// A position/normal pair used to extrude terrain at a prefab edge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainPoint {
    pub position: Vector3,
    pub normal: Vector3,
}

impl TerrainPoint {
    pub const fn new(position: Vector3, normal: Vector3) -> Self {
        Self { position, normal }
    }
}

/// A `(start, length)` sub-range of one node's terrain points.
///
/// `start` is relative to the node's own range, not to the flat pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainPointVariant {
    pub start: u32,
    pub length: u32,
}

impl Record for TerrainPointVariant {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        Ok(TerrainPointVariant {
            start: r.read_u32::<LittleEndian>()?,
            length: r.read_u32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.start)?;
        w.write_u32::<LittleEndian>(self.length)?;
        Ok(())
    }
}

/// Terrain points of one node keyed by model variant, in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerrainPointMap {
    entries: Vec<(u32, Vec<TerrainPoint>)>,
}

impl TerrainPointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: u32) -> Option<&Vec<TerrainPoint>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: u32) -> Option<&mut Vec<TerrainPoint>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Insert or replace the points of a variant.
    ///
    /// A new key goes to the end; replacing keeps the existing position.
    /// Returns the previous points, if any.
    pub fn insert(&mut self, key: u32, points: Vec<TerrainPoint>) -> Option<Vec<TerrainPoint>> {
        match self.get_mut(key) {
            Some(existing) => Some(std::mem::replace(existing, points)),
            None => {
                self.entries.push((key, points));
                None
            }
        }
    }

    pub fn remove(&mut self, key: u32) -> Option<Vec<TerrainPoint>> {
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[TerrainPoint])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Total number of points over all variants
    pub fn point_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

/// The three flat terrain pools as stored in a prefab descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct FlatTerrain {
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub variants: Vec<TerrainPointVariant>,
}

fn pool_range(start: u32, count: u32, pool_len: usize, what: &str) -> Result<Range<usize>> {
    let start = start as usize;
    let end = start
        .checked_add(count as usize)
        .filter(|&end| end <= pool_len)
        .ok_or_else(|| {
            Error::MalformedData(format!(
                "{} range {}+{} is outside the pool of {}",
                what, start, count, pool_len
            ))
        })?;
    Ok(start..end)
}

/// Rebuild every node's [`TerrainPointMap`] from the flat pools, using
/// the range fields read from disk.
pub(crate) fn assemble(nodes: &mut [ControlNode], flat: &FlatTerrain) -> Result<()> {
    let point_pool = flat.positions.len().min(flat.normals.len());

    for (node_index, node) in nodes.iter_mut().enumerate() {
        let points = pool_range(
            node.terrain_point_index,
            node.terrain_point_count,
            point_pool,
            "terrain point",
        )?;
        let own: Vec<TerrainPoint> = flat.positions[points.clone()]
            .iter()
            .zip(&flat.normals[points])
            .map(|(&position, &normal)| TerrainPoint::new(position, normal))
            .collect();

        let mut map = TerrainPointMap::new();
        if node.terrain_variant_count == 0 {
            map.insert(0, own);
        } else {
            let descriptors = pool_range(
                node.terrain_variant_index,
                node.terrain_variant_count,
                flat.variants.len(),
                "terrain variant",
            )?;
            for (key, variant) in flat.variants[descriptors].iter().enumerate() {
                let sub = pool_range(variant.start, variant.length, own.len(), "variant point")?;
                map.insert(key as u32, own[sub].to_vec());
            }
        }

        trace!(
            node = node_index,
            points = node.terrain_point_count,
            variants = map.len(),
            "Assembled terrain points"
        );
        node.terrain_points = map;
    }
    Ok(())
}

/// Flatten every node's terrain points into shared pools and refresh the
/// nodes' range fields to match.
pub(crate) fn flatten(nodes: &mut [ControlNode]) -> FlatTerrain {
    let mut flat = FlatTerrain::default();

    for node in nodes.iter_mut() {
        let point_start = flat.positions.len();
        let variant_start = flat.variants.len();
        let describe = node.terrain_points.len() > 1;
        let mut running_start = 0u32;

        for (_, points) in node.terrain_points.iter() {
            for point in points {
                flat.positions.push(point.position);
                flat.normals.push(point.normal);
            }
            let length = points.len() as u32;
            if describe {
                flat.variants.push(TerrainPointVariant {
                    start: running_start,
                    length,
                });
            }
            running_start += length;
        }

        node.terrain_point_index = point_start as u32;
        node.terrain_point_count = (flat.positions.len() - point_start) as u32;
        node.terrain_variant_index = variant_start as u32;
        node.terrain_variant_count = (flat.variants.len() - variant_start) as u32;
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: u32) -> TerrainPoint {
        let f = i as f32;
        TerrainPoint::new(Vector3::new(f, 0.0, -f), Vector3::new(0.0, 1.0, 0.0))
    }

    fn points(range: Range<u32>) -> Vec<TerrainPoint> {
        range.map(point).collect()
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let mut map = TerrainPointMap::new();
        map.insert(5, points(0..1));
        map.insert(1, points(1..3));
        map.insert(5, points(3..4));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![5, 1]);
        assert_eq!(map.get(5).unwrap()[0], point(3));
        assert_eq!(map.point_count(), 3);
        assert!(map.remove(1).is_some());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_flatten_multiple_variants() {
        let mut a = ControlNode::default();
        a.terrain_points.insert(0, points(0..2));
        a.terrain_points.insert(1, points(2..5));
        let mut b = ControlNode::default();
        b.terrain_points.insert(0, points(5..6));
        let mut nodes = vec![a, b];

        let flat = flatten(&mut nodes);
        assert_eq!(flat.positions.len(), 6);
        assert_eq!(
            flat.variants,
            vec![
                TerrainPointVariant { start: 0, length: 2 },
                TerrainPointVariant { start: 2, length: 3 },
            ]
        );
        assert_eq!(nodes[0].terrain_variant_count, 2);
        assert_eq!(
            (nodes[1].terrain_point_index, nodes[1].terrain_point_count),
            (5, 1)
        );
        assert_eq!(nodes[1].terrain_variant_index, 2);
        assert_eq!(nodes[1].terrain_variant_count, 0);
    }

    #[test]
    fn test_inverse_law() {
        let mut a = ControlNode::default();
        a.terrain_points.insert(0, points(0..3));
        a.terrain_points.insert(1, points(3..4));
        a.terrain_points.insert(2, Vec::new());
        let mut b = ControlNode::default();
        b.terrain_points.insert(0, points(4..8));
        let c = ControlNode::default();
        let mut nodes = vec![a, b, c];
        let original: Vec<TerrainPointMap> =
            nodes.iter().map(|n| n.terrain_points.clone()).collect();

        let flat = flatten(&mut nodes);
        for node in nodes.iter_mut() {
            node.terrain_points = TerrainPointMap::new();
        }
        assemble(&mut nodes, &flat).unwrap();

        assert_eq!(nodes[0].terrain_points, original[0]);
        assert_eq!(nodes[1].terrain_points, original[1]);
        // a node without points reads back as one empty implicit variant
        assert_eq!(nodes[2].terrain_points.get(0), Some(&Vec::new()));

        assert_eq!(flatten(&mut nodes), flat);
    }

    #[test]
    fn test_single_variant_is_rekeyed() {
        let mut node = ControlNode::default();
        node.terrain_points.insert(7, points(0..2));
        let mut nodes = vec![node];

        let flat = flatten(&mut nodes);
        assert!(flat.variants.is_empty());
        assemble(&mut nodes, &flat).unwrap();
        assert_eq!(nodes[0].terrain_points.keys().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_out_of_range_variant() {
        let mut node = ControlNode::default();
        node.terrain_point_count = 2;
        node.terrain_variant_count = 1;
        let flat = FlatTerrain {
            positions: vec![Vector3::ZERO; 2],
            normals: vec![Vector3::ZERO; 2],
            variants: vec![TerrainPointVariant { start: 1, length: 2 }],
        };
        assert!(matches!(
            assemble(&mut [node], &flat),
            Err(Error::MalformedData(_))
        ));
    }
}
