use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::fs::{DiskFileSystem, FileSystem};
use crate::io::{read_count, read_records, write_count, write_offset, write_records};
use crate::math::Vector3;
use crate::ppd::terrain::{self, FlatTerrain, TerrainPointVariant};
use crate::ppd::{
    ControlNode, Intersection, MapPoint, NavCurve, NavNode, PpdVersion, Semaphore, Sign,
    SpawnPoint, TriggerPoint,
};

/// Number of offset table entries in the layout that is written
const OFFSET_TABLE_LEN: usize = 12;

/// Names of the sections, in file order. The offset table follows the
/// same order.
const SECTIONS: [&str; OFFSET_TABLE_LEN] = [
    "control nodes",
    "nav curves",
    "signs",
    "semaphores",
    "spawn points",
    "terrain point positions",
    "terrain point normals",
    "terrain point variants",
    "map points",
    "trigger points",
    "intersections",
    "nav nodes",
];

/// Section counts as stored in the header
#[derive(Debug, Default)]
struct Counts {
    nodes: usize,
    nav_curves: usize,
    signs: usize,
    semaphores: usize,
    spawn_points: usize,
    terrain_points: usize,
    terrain_variants: usize,
    map_points: usize,
    trigger_points: usize,
    intersections: usize,
    nav_nodes: usize,
}

impl Counts {
    fn read<R: Read>(r: &mut R, fields: usize) -> Result<Self> {
        let mut counts = Counts {
            nodes: read_count(r)?,
            nav_curves: read_count(r)?,
            signs: read_count(r)?,
            semaphores: read_count(r)?,
            spawn_points: read_count(r)?,
            terrain_points: read_count(r)?,
            terrain_variants: read_count(r)?,
            map_points: read_count(r)?,
            trigger_points: read_count(r)?,
            intersections: read_count(r)?,
            nav_nodes: 0,
        };
        if fields > 10 {
            counts.nav_nodes = read_count(r)?;
        }
        Ok(counts)
    }
}

/// A prefab descriptor (`.ppd`): the topology of a road junction or
/// other prefab
#[derive(Debug, Clone, PartialEq)]
pub struct PrefabDescriptor {
    /// Revision the descriptor was loaded from. Saving always writes
    /// [`PpdVersion::LATEST`].
    pub version: PpdVersion,
    pub nodes: Vec<ControlNode>,
    pub nav_curves: Vec<NavCurve>,
    pub signs: Vec<Sign>,
    pub semaphores: Vec<Semaphore>,
    pub spawn_points: Vec<SpawnPoint>,
    pub map_points: Vec<MapPoint>,
    pub trigger_points: Vec<TriggerPoint>,
    pub intersections: Vec<Intersection>,
    pub nav_nodes: Vec<NavNode>,
}

impl Default for PrefabDescriptor {
    fn default() -> Self {
        Self {
            version: PpdVersion::LATEST,
            nodes: Vec::new(),
            nav_curves: Vec::new(),
            signs: Vec::new(),
            semaphores: Vec::new(),
            spawn_points: Vec::new(),
            map_points: Vec::new(),
            trigger_points: Vec::new(),
            intersections: Vec::new(),
            nav_nodes: Vec::new(),
        }
    }
}

/// Log when the stream position disagrees with the stored offset table.
///
/// The table is unreliable in shipped files, so it is never used to
/// seek.
fn check_offset<S: Seek>(s: &mut S, offsets: &[u32], section: usize) -> Result<()> {
    if let Some(&expected) = offsets.get(section) {
        let actual = s.stream_position()?;
        if actual != u64::from(expected) {
            debug!(
                section = SECTIONS[section],
                expected, actual, "Offset table disagrees with section position"
            );
        }
    }
    Ok(())
}

impl PrefabDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a `.ppd` file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(&DiskFileSystem, path.as_ref())
    }

    /// Open a `.ppd` file through a [`FileSystem`].
    pub fn open_with(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let mut stream = fs.open(path)?;
        Self::read(&mut stream)
    }

    /// Parse a descriptor held in memory.
    pub fn load(data: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(data))
    }

    /// Parse a descriptor starting at the current position of `r`.
    ///
    /// Section offsets in the header are ignored; sections are read back
    /// to back using the counts.
    pub fn read<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let version = PpdVersion::from_u32(r.read_u32::<LittleEndian>()?)?;
        let layout = version.layout();

        let counts = Counts::read(r, layout.count_fields)?;
        let mut offsets = vec![0u32; layout.offset_fields];
        r.read_u32_into::<LittleEndian>(&mut offsets)?;
        debug!(version = version.to_u32(), ?counts, "Reading prefab descriptor");

        check_offset(r, &offsets, 0)?;
        let mut nodes: Vec<ControlNode> = read_records(r, counts.nodes, ())?;
        check_offset(r, &offsets, 1)?;
        let nav_curves = read_records(r, counts.nav_curves, version)?;
        check_offset(r, &offsets, 2)?;
        let signs = read_records(r, counts.signs, ())?;
        check_offset(r, &offsets, 3)?;
        let semaphores = read_records(r, counts.semaphores, version)?;
        check_offset(r, &offsets, 4)?;
        let spawn_points = read_records(r, counts.spawn_points, version)?;

        check_offset(r, &offsets, 5)?;
        let positions: Vec<Vector3> = read_records(r, counts.terrain_points, ())?;
        check_offset(r, &offsets, 6)?;
        let normals: Vec<Vector3> = read_records(r, counts.terrain_points, ())?;
        check_offset(r, &offsets, 7)?;
        let variants: Vec<TerrainPointVariant> = read_records(r, counts.terrain_variants, ())?;

        let map_points = if layout.has_map_points {
            check_offset(r, &offsets, 8)?;
            read_records(r, counts.map_points, ())?
        } else {
            if counts.map_points > 0 {
                debug!(
                    count = counts.map_points,
                    "Skipping map points absent from this revision"
                );
            }
            Vec::new()
        };

        check_offset(r, &offsets, 9)?;
        let trigger_points = read_records(r, counts.trigger_points, ())?;
        check_offset(r, &offsets, 10)?;
        let intersections = read_records(r, counts.intersections, ())?;

        let nav_nodes = if layout.has_nav_nodes {
            check_offset(r, &offsets, 11)?;
            read_records(r, counts.nav_nodes, ())?
        } else {
            Vec::new()
        };

        let flat = FlatTerrain {
            positions,
            normals,
            variants,
        };
        terrain::assemble(&mut nodes, &flat)?;

        Ok(PrefabDescriptor {
            version,
            nodes,
            nav_curves,
            signs,
            semaphores,
            spawn_points,
            map_points,
            trigger_points,
            intersections,
            nav_nodes,
        })
    }

    /// Write the descriptor in the latest layout.
    ///
    /// The control nodes' terrain ranges are recomputed as part of this.
    /// Offsets in the header are absolute positions in `w`.
    pub fn serialize<W: Write + Seek>(&mut self, w: &mut W) -> Result<()> {
        let flat = terrain::flatten(&mut self.nodes);

        w.write_u32::<LittleEndian>(PpdVersion::LATEST.to_u32())?;
        write_count(w, self.nodes.len())?;
        write_count(w, self.nav_curves.len())?;
        write_count(w, self.signs.len())?;
        write_count(w, self.semaphores.len())?;
        write_count(w, self.spawn_points.len())?;
        write_count(w, flat.positions.len())?;
        write_count(w, flat.variants.len())?;
        write_count(w, self.map_points.len())?;
        write_count(w, self.trigger_points.len())?;
        write_count(w, self.intersections.len())?;
        write_count(w, self.nav_nodes.len())?;

        // filled in once the sections are written
        let table_pos = w.stream_position()?;
        for _ in 0..OFFSET_TABLE_LEN {
            w.write_u32::<LittleEndian>(0)?;
        }

        let mut offsets = Vec::with_capacity(OFFSET_TABLE_LEN);
        offsets.push(w.stream_position()?);
        write_records(w, &self.nodes)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.nav_curves)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.signs)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.semaphores)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.spawn_points)?;
        offsets.push(w.stream_position()?);
        write_records(w, &flat.positions)?;
        offsets.push(w.stream_position()?);
        write_records(w, &flat.normals)?;
        offsets.push(w.stream_position()?);
        write_records(w, &flat.variants)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.map_points)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.trigger_points)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.intersections)?;
        offsets.push(w.stream_position()?);
        write_records(w, &self.nav_nodes)?;

        let end = w.stream_position()?;
        w.seek(SeekFrom::Start(table_pos))?;
        for offset in &offsets {
            write_offset(w, *offset)?;
        }
        w.seek(SeekFrom::Start(end))?;

        debug!(bytes = end, "Wrote prefab descriptor");
        Ok(())
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.serialize(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the descriptor to a file, replacing it if it exists.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.serialize(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fs::MemoryFileSystem;
    use crate::io::Record;
    use crate::ppd::{
        BlinkerType, NavNodeConnection, NavNodeType, SemaphoreType, SpawnPointType, TerrainPoint,
    };
    use crate::token::Token;

    const HEADER_SIZE: usize = 4 + 11 * 4 + OFFSET_TABLE_LEN * 4;
    const CONTROL_NODE_SIZE: usize = 104;

    fn u32_at(buf: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    fn sample() -> PrefabDescriptor {
        let mut ppd = PrefabDescriptor::new();

        let mut a = ControlNode {
            position: Vector3::new(-10.0, 0.0, 0.0),
            direction: Vector3::new(-1.0, 0.0, 0.0),
            ..Default::default()
        };
        a.input_lines[0] = 1;
        a.output_lines[0] = 0;
        a.terrain_points.insert(
            0,
            vec![
                TerrainPoint::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 0.0)),
                TerrainPoint::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 1.0, 0.0)),
            ],
        );
        a.terrain_points.insert(
            1,
            vec![TerrainPoint::new(
                Vector3::new(1.0, 0.0, 1.0),
                Vector3::new(0.0, 1.0, 0.0),
            )],
        );
        let mut b = ControlNode {
            position: Vector3::new(10.0, 0.0, 0.0),
            ..Default::default()
        };
        b.terrain_points.insert(
            0,
            vec![TerrainPoint::new(
                Vector3::new(9.0, 0.0, 1.0),
                Vector3::new(0.0, 1.0, 0.0),
            )],
        );
        ppd.nodes = vec![a, b];

        let mut curve = NavCurve {
            name: Token::new("lane_r").unwrap(),
            length: 20.0,
            nav_node_index: 0,
            ..Default::default()
        };
        curve.set_blinker(BlinkerType::Right);
        curve.next_lines.push(1).unwrap();
        let mut back = curve.clone();
        back.name = Token::new("lane_l").unwrap();
        back.previous_lines.push(0).unwrap();
        ppd.nav_curves = vec![curve, back];

        ppd.signs.push(Sign {
            name: Token::new("stop").unwrap(),
            ..Default::default()
        });
        ppd.semaphores.push(Semaphore {
            id: 1,
            unknown2: [0, 0, 0, 7],
            ..Default::default()
        });
        ppd.spawn_points.push(SpawnPoint::default());
        ppd.map_points.push(MapPoint::default());
        ppd.trigger_points.push(TriggerPoint::default());
        ppd.intersections.push(Intersection {
            curve_id: 1,
            position: 4.5,
            ..Default::default()
        });

        let mut connection = NavNodeConnection {
            target: 1,
            length: 20.0,
            ..Default::default()
        };
        connection.curves.push(0).unwrap();
        let mut nav_node = NavNode::default();
        nav_node.connections.push(connection).unwrap();
        ppd.nav_nodes.push(nav_node);
        ppd.nav_nodes.push(NavNode {
            node_type: NavNodeType::ControlNode,
            index: 1,
            ..Default::default()
        });
        ppd
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let mut ppd = sample();
        let bytes = ppd.to_bytes().unwrap();

        let mut loaded = PrefabDescriptor::load(&bytes).unwrap();
        assert_eq!(loaded, ppd);
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_header_and_offsets() {
        let mut ppd = sample();
        let bytes = ppd.to_bytes().unwrap();

        assert_eq!(u32_at(&bytes, 0), 0x19);
        assert_eq!(u32_at(&bytes, 4), 2);
        // 4 terrain points, 2 variant descriptors
        assert_eq!(u32_at(&bytes, 24), 4);
        assert_eq!(u32_at(&bytes, 28), 2);
        assert_eq!(u32_at(&bytes, 44), 2);

        assert_eq!(u32_at(&bytes, 48) as usize, HEADER_SIZE);
        assert_eq!(u32_at(&bytes, 52) as usize, HEADER_SIZE + 2 * CONTROL_NODE_SIZE);
        // normals follow positions directly
        assert_eq!(u32_at(&bytes, 48 + 6 * 4) - u32_at(&bytes, 48 + 5 * 4), 4 * 12);

        let nav_nodes = u32_at(&bytes, 48 + 11 * 4) as usize;
        assert_eq!(bytes.len() - nav_nodes, 2 * 188);
    }

    #[test]
    fn test_terrain_ranges_refreshed_on_save() {
        let mut ppd = sample();
        ppd.nodes[0].terrain_point_count = 99;
        ppd.to_bytes().unwrap();
        assert_eq!(ppd.nodes[0].terrain_point_range(), (0, 3));
        assert_eq!(ppd.nodes[0].terrain_variant_range(), (0, 2));
        assert_eq!(ppd.nodes[1].terrain_point_range(), (3, 1));
        assert_eq!(ppd.nodes[1].terrain_variant_range(), (2, 0));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0..4].copy_from_slice(&0x14u32.to_le_bytes());
        assert!(matches!(
            PrefabDescriptor::load(&bytes),
            Err(Error::UnsupportedVersion { version: 0x14, .. })
        ));
    }

    /// Header with the given counts and a zeroed offset table
    fn old_header(version: u32, counts: &[u32], offsets: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&version.to_le_bytes());
        for c in counts {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        buf.extend(std::iter::repeat(0u8).take(offsets * 4));
        buf
    }

    fn node_bytes(point_count: u32) -> Vec<u8> {
        let node = ControlNode {
            terrain_point_count: point_count,
            ..Default::default()
        };
        let mut buf = Vec::new();
        node.write(&mut buf).unwrap();
        buf
    }

    fn vec3_bytes(v: Vector3) -> Vec<u8> {
        let mut buf = Vec::new();
        v.write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_load_v15() {
        // one node with one terrain point, one intersection
        let mut buf = old_header(0x15, &[1, 0, 0, 0, 0, 1, 0, 0, 0, 1], 11);
        buf.extend(node_bytes(1));
        buf.extend(vec3_bytes(Vector3::new(1.0, 2.0, 3.0)));
        buf.extend(vec3_bytes(Vector3::new(0.0, 1.0, 0.0)));
        let mut intersection = Vec::new();
        Intersection {
            curve_id: 3,
            ..Default::default()
        }
        .write(&mut intersection)
        .unwrap();
        buf.extend(intersection);

        let mut ppd = PrefabDescriptor::load(&buf).unwrap();
        assert_eq!(ppd.version, PpdVersion::V15);
        assert_eq!(ppd.intersections[0].curve_id, 3);
        assert!(ppd.nav_nodes.is_empty());
        let points = ppd.nodes[0].terrain_points.get(0).unwrap();
        assert_eq!(points[0].position, Vector3::new(1.0, 2.0, 3.0));

        // upgraded on save
        let bytes = ppd.to_bytes().unwrap();
        let upgraded = PrefabDescriptor::load(&bytes).unwrap();
        assert_eq!(upgraded.version, PpdVersion::V19);
        assert_eq!(upgraded.intersections, ppd.intersections);
        assert_eq!(upgraded.nodes, ppd.nodes);
    }

    #[test]
    fn test_load_v16_skips_map_points() {
        // map point count is set but the section is absent
        let mut buf = old_header(0x16, &[0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 1], 12);
        NavNode {
            index: 2,
            ..Default::default()
        }
        .write(&mut buf)
        .unwrap();

        let ppd = PrefabDescriptor::load(&buf).unwrap();
        assert!(ppd.map_points.is_empty());
        assert_eq!(ppd.nav_nodes.len(), 1);
        assert_eq!(ppd.nav_nodes[0].index, 2);
    }

    fn put_u32(buf: &mut Vec<u8>, v: u32) {
        buf.write_u32::<LittleEndian>(v).unwrap();
    }

    fn put_f32s(buf: &mut Vec<u8>, values: &[f32]) {
        for &v in values {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }
    }

    /// Control node laid out field by field, all lines unused
    fn put_node(buf: &mut Vec<u8>, terrain: [u32; 4], position: [f32; 3]) {
        for v in terrain {
            put_u32(buf, v);
        }
        put_f32s(buf, &position);
        put_f32s(buf, &[1.0, 0.0, 0.0]);
        for _ in 0..16 {
            buf.write_i32::<LittleEndian>(-1).unwrap();
        }
    }

    #[test]
    fn test_load_v18_crossing() {
        // node 0: six points in variants of 2, 1 and 3
        // node 1: two points in variants of 1 and 1
        let mut buf = old_header(0x18, &[2, 0, 0, 0, 2, 8, 5, 0, 0, 1, 0], 12);
        put_node(&mut buf, [0, 6, 0, 3], [-18.0, 0.0, 0.0]);
        put_node(&mut buf, [6, 2, 3, 2], [18.0, 0.0, 0.0]);

        // spawn points carry a trailing reserved word from 0x18
        put_f32s(&mut buf, &[5.0, 0.0, 7.0, 1.0, 0.0, 0.0, 0.0]);
        put_u32(&mut buf, 3);
        put_u32(&mut buf, 0x2A);
        put_f32s(&mut buf, &[6.0, 0.0, 7.0, 1.0, 0.0, 0.0, 0.0]);
        put_u32(&mut buf, 10);
        put_u32(&mut buf, 0);

        for i in 0..8 {
            put_f32s(&mut buf, &[i as f32, 0.0, 0.0]);
        }
        for _ in 0..8 {
            put_f32s(&mut buf, &[0.0, 1.0, 0.0]);
        }
        for (start, length) in [(0, 2), (2, 1), (3, 3), (0, 1), (1, 1)] {
            put_u32(&mut buf, start);
            put_u32(&mut buf, length);
        }

        put_u32(&mut buf, 7);
        put_f32s(&mut buf, &[2.5, 1.5]);
        put_u32(&mut buf, 0);

        let ppd = PrefabDescriptor::load(&buf).unwrap();
        assert_eq!(ppd.version, PpdVersion::V18);
        assert_eq!(ppd.nodes.len(), 2);
        assert_eq!(ppd.nodes[0].position, Vector3::new(-18.0, 0.0, 0.0));
        assert_eq!(ppd.nodes[0].direction, Vector3::new(1.0, 0.0, 0.0));

        let first = &ppd.nodes[0].terrain_points;
        assert_eq!(first.keys().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(first.get(0).unwrap().len(), 2);
        assert_eq!(first.get(1).unwrap().len(), 1);
        assert_eq!(first.get(1).unwrap()[0].position, Vector3::new(2.0, 0.0, 0.0));
        let third = first.get(2).unwrap();
        assert_eq!(third.len(), 3);
        assert_eq!(third[2].position, Vector3::new(5.0, 0.0, 0.0));

        let second = &ppd.nodes[1].terrain_points;
        assert_eq!(second.keys().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(second.get(0).unwrap()[0].position, Vector3::new(6.0, 0.0, 0.0));
        assert_eq!(second.get(1).unwrap()[0].position, Vector3::new(7.0, 0.0, 0.0));
        assert_eq!(second.get(1).unwrap()[0].normal, Vector3::new(0.0, 1.0, 0.0));

        assert_eq!(ppd.spawn_points.len(), 2);
        assert_eq!(ppd.spawn_points[0].spawn_type, SpawnPointType::GasStation);
        assert_eq!(ppd.spawn_points[0].reserved, 0x2A);
        assert_eq!(ppd.spawn_points[0].rotation.w, 1.0);
        assert_eq!(ppd.spawn_points[1].position, Vector3::new(6.0, 0.0, 7.0));
        assert_eq!(ppd.spawn_points[1].spawn_type, SpawnPointType::Parking);

        // the section after them is still aligned
        assert_eq!(ppd.intersections[0].curve_id, 7);
        assert_eq!(ppd.intersections[0].position, 2.5);
        assert_eq!(ppd.intersections[0].radius, 1.5);
    }

    #[test]
    fn test_load_v17_semaphore_and_spawn_point() {
        let mut buf = old_header(0x17, &[0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 0], 12);

        // semaphore without the trailing reserved words of 0x19
        put_f32s(&mut buf, &[1.0, 2.0, 3.0]);
        put_f32s(&mut buf, &[0.5, 0.0, 0.5, 0.0]);
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 4);
        put_f32s(&mut buf, &[10.0, 3.0, 10.0, 2.0, 0.5]);
        let profile = Token::new("city").unwrap();
        buf.write_u64::<LittleEndian>(profile.raw()).unwrap();
        put_u32(&mut buf, 9);

        // spawn point without the reserved word of 0x18
        put_f32s(&mut buf, &[4.0, 0.0, 4.0, 1.0, 0.0, 0.0, 0.0]);
        put_u32(&mut buf, 8);

        put_u32(&mut buf, 2);
        put_f32s(&mut buf, &[1.0, 3.0]);
        put_u32(&mut buf, 0);

        let ppd = PrefabDescriptor::load(&buf).unwrap();
        assert_eq!(ppd.version, PpdVersion::V17);

        let semaphore = &ppd.semaphores[0];
        assert_eq!(semaphore.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(semaphore.rotation.w, 0.5);
        assert_eq!(semaphore.rotation.y, 0.5);
        assert_eq!(semaphore.semaphore_type, SemaphoreType::TrafficLight);
        assert_eq!(semaphore.id, 4);
        assert_eq!(semaphore.intervals.x, 10.0);
        assert_eq!(semaphore.intervals.w, 2.0);
        assert_eq!(semaphore.cycle_delay, 0.5);
        assert_eq!(semaphore.profile.as_string(), "city");
        assert_eq!(semaphore.unknown1, 9);
        assert_eq!(semaphore.unknown2, [0; 4]);

        assert_eq!(ppd.spawn_points[0].position, Vector3::new(4.0, 0.0, 4.0));
        assert_eq!(ppd.spawn_points[0].spawn_type, SpawnPointType::Hotel);
        assert_eq!(ppd.spawn_points[0].reserved, 0);

        assert_eq!(ppd.intersections[0].curve_id, 2);
        assert_eq!(ppd.intersections[0].radius, 3.0);
    }

    #[test]
    fn test_truncated_section() {
        let mut buf = old_header(0x17, &[2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], 12);
        buf.extend(node_bytes(0));
        assert!(matches!(PrefabDescriptor::load(&buf), Err(Error::Io(_))));
    }

    #[test]
    fn test_open_with_memory_fs() {
        let bytes = sample().to_bytes().unwrap();
        let mut fs = MemoryFileSystem::new();
        fs.insert("prefab/cross.ppd", bytes);

        let ppd = PrefabDescriptor::open_with(&fs, Path::new("prefab/cross.ppd")).unwrap();
        assert_eq!(ppd.nodes.len(), 2);
        assert_eq!(ppd.nav_curves[0].blinker(), BlinkerType::Right);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junction.ppd");

        let mut ppd = sample();
        ppd.save(&path).unwrap();
        let opened = PrefabDescriptor::open(&path).unwrap();
        assert_eq!(opened, ppd);
    }
}
