use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::io::Record;
use crate::math::Vector3;
use crate::ppd::terrain::TerrainPointMap;

/// Number of input and output line slots of a control node
pub const LINE_SLOTS: usize = 8;

/// An anchor point on the outer boundary of a prefab.
///
/// Roads attach to control nodes. Each node also carries the terrain
/// points used to extrude ground at that edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlNode {
    pub position: Vector3,
    pub direction: Vector3,
    /// Curves entering the prefab at this node; `-1` for an empty slot
    pub input_lines: [i32; LINE_SLOTS],
    /// Curves leaving the prefab at this node; `-1` for an empty slot
    pub output_lines: [i32; LINE_SLOTS],
    pub terrain_points: TerrainPointMap,

    // Ranges into the flat terrain pools. Only meaningful right after a
    // load or a flatten pass.
    pub(crate) terrain_point_index: u32,
    pub(crate) terrain_point_count: u32,
    pub(crate) terrain_variant_index: u32,
    pub(crate) terrain_variant_count: u32,
}

impl Default for ControlNode {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            direction: Vector3::ZERO,
            input_lines: [-1; LINE_SLOTS],
            output_lines: [-1; LINE_SLOTS],
            terrain_points: TerrainPointMap::new(),
            terrain_point_index: 0,
            terrain_point_count: 0,
            terrain_variant_index: 0,
            terrain_variant_count: 0,
        }
    }
}

impl ControlNode {
    /// `(start, count)` of this node in the flat terrain point pool as of
    /// the last load or save
    pub fn terrain_point_range(&self) -> (u32, u32) {
        (self.terrain_point_index, self.terrain_point_count)
    }

    /// `(start, count)` of this node in the flat variant pool as of the
    /// last load or save
    pub fn terrain_variant_range(&self) -> (u32, u32) {
        (self.terrain_variant_index, self.terrain_variant_count)
    }
}

impl Record for ControlNode {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let terrain_point_index = r.read_u32::<LittleEndian>()?;
        let terrain_point_count = r.read_u32::<LittleEndian>()?;
        let terrain_variant_index = r.read_u32::<LittleEndian>()?;
        let terrain_variant_count = r.read_u32::<LittleEndian>()?;

        let position = Vector3::read(r, ())?;
        let direction = Vector3::read(r, ())?;

        let mut input_lines = [0i32; LINE_SLOTS];
        r.read_i32_into::<LittleEndian>(&mut input_lines)?;
        let mut output_lines = [0i32; LINE_SLOTS];
        r.read_i32_into::<LittleEndian>(&mut output_lines)?;

        Ok(ControlNode {
            position,
            direction,
            input_lines,
            output_lines,
            terrain_points: TerrainPointMap::new(),
            terrain_point_index,
            terrain_point_count,
            terrain_variant_index,
            terrain_variant_count,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.terrain_point_index)?;
        w.write_u32::<LittleEndian>(self.terrain_point_count)?;
        w.write_u32::<LittleEndian>(self.terrain_variant_index)?;
        w.write_u32::<LittleEndian>(self.terrain_variant_count)?;

        self.position.write(w)?;
        self.direction.write(w)?;

        for line in self.input_lines.iter().chain(&self.output_lines) {
            w.write_i32::<LittleEndian>(*line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_record_size() {
        let mut node = ControlNode::default();
        node.input_lines[0] = 3;
        node.position = Vector3::new(1.0, 2.0, 3.0);

        let mut buf = Vec::new();
        node.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 16 + 24 + 64);

        let read = ControlNode::read(&mut Cursor::new(&buf), ()).unwrap();
        assert_eq!(read.input_lines, node.input_lines);
        assert_eq!(read.output_lines, [-1; LINE_SLOTS]);
        assert_eq!(read.position, node.position);
    }
}
