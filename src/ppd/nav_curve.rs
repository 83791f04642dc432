//! Navigation curves: AI traffic and GPS paths inside a prefab

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::flags::{FlagField, Nibble};
use crate::io::{slots_to_list, write_padded, ReadTokenExt, Record, WriteTokenExt};
use crate::limited_list::LimitedList;
use crate::math::{Quaternion, Vector3};
use crate::ppd::PpdVersion;
use crate::token::Token;

/// Slot count of the next/previous curve arrays
pub const LINE_SLOTS: usize = 4;

const BLINKER_BITS: (u32, u32) = (2, 2);
const ALLOWED_VEHICLES_BITS: (u32, u32) = (5, 2);
const LOW_PROBABILITY_BIT: u32 = 13;
const LIMIT_DISPLACEMENT_BIT: u32 = 14;
const ADDITIVE_PRIORITY_BIT: u32 = 15;
const PRIORITY_MODIFIER_BITS: (u32, u32) = (16, 4);

/// Blinker used by AI vehicles on the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkerType {
    None,
    Right,
    Left,
    Unknown(u32),
}

impl From<u32> for BlinkerType {
    fn from(value: u32) -> Self {
        match value {
            0 => BlinkerType::None,
            1 => BlinkerType::Right,
            2 => BlinkerType::Left,
            other => BlinkerType::Unknown(other),
        }
    }
}

impl From<BlinkerType> for u32 {
    fn from(value: BlinkerType) -> u32 {
        match value {
            BlinkerType::None => 0,
            BlinkerType::Right => 1,
            BlinkerType::Left => 2,
            BlinkerType::Unknown(v) => v,
        }
    }
}

/// Which AI vehicles prefer the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedVehicles {
    All,
    SmallVehicles,
    LargeVehicles,
    Unknown(u32),
}

impl From<u32> for AllowedVehicles {
    fn from(value: u32) -> Self {
        match value {
            0 => AllowedVehicles::All,
            1 => AllowedVehicles::SmallVehicles,
            2 => AllowedVehicles::LargeVehicles,
            other => AllowedVehicles::Unknown(other),
        }
    }
}

impl From<AllowedVehicles> for u32 {
    fn from(value: AllowedVehicles) -> u32 {
        match value {
            AllowedVehicles::All => 0,
            AllowedVehicles::SmallVehicles => 1,
            AllowedVehicles::LargeVehicles => 2,
            AllowedVehicles::Unknown(v) => v,
        }
    }
}

/// A control node and one of its lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeLane {
    pub node: u8,
    pub lane: u8,
}

/// A directed path segment between two node lanes
#[derive(Debug, Clone, PartialEq)]
pub struct NavCurve {
    pub name: Token,
    pub(crate) flags: FlagField,
    /// Node and lane the curve leads to
    pub end: NodeLane,
    /// Node and lane the curve starts from
    pub start: NodeLane,
    pub start_position: Vector3,
    pub end_position: Vector3,
    pub start_rotation: Quaternion,
    pub end_rotation: Quaternion,
    pub length: f32,
    /// Indices of curves that follow this one
    pub next_lines: LimitedList<i32>,
    /// Indices of curves that lead into this one
    pub previous_lines: LimitedList<i32>,
    pub semaphore_id: i32,
    pub traffic_rule: Token,
    /// Not present before 0x16; defaults to `u32::MAX`
    pub nav_node_index: u32,
}

impl Default for NavCurve {
    fn default() -> Self {
        Self {
            name: Token::EMPTY,
            flags: FlagField::default(),
            end: NodeLane::default(),
            start: NodeLane::default(),
            start_position: Vector3::ZERO,
            end_position: Vector3::ZERO,
            start_rotation: Quaternion::IDENTITY,
            end_rotation: Quaternion::IDENTITY,
            length: 0.0,
            next_lines: LimitedList::new(LINE_SLOTS),
            previous_lines: LimitedList::new(LINE_SLOTS),
            semaphore_id: -1,
            traffic_rule: Token::EMPTY,
            nav_node_index: u32::MAX,
        }
    }
}

impl NavCurve {
    /// The packed flag word as stored on disk
    pub fn flags(&self) -> FlagField {
        self.flags
    }

    pub fn set_flags(&mut self, flags: FlagField) {
        self.flags = flags;
    }

    pub fn blinker(&self) -> BlinkerType {
        let (start, width) = BLINKER_BITS;
        self.flags.bits(start, width).into()
    }

    pub fn set_blinker(&mut self, value: BlinkerType) {
        let (start, width) = BLINKER_BITS;
        self.flags.set_bits(start, width, value.into());
    }

    /// AI vehicles try the most suitable curve first but fall back to
    /// any curve if none allows them.
    pub fn allowed_vehicles(&self) -> AllowedVehicles {
        let (start, width) = ALLOWED_VEHICLES_BITS;
        self.flags.bits(start, width).into()
    }

    pub fn set_allowed_vehicles(&mut self, value: AllowedVehicles) {
        let (start, width) = ALLOWED_VEHICLES_BITS;
        self.flags.set_bits(start, width, value.into());
    }

    /// Lowers the probability of AI vehicles entering the curve.
    pub fn low_probability(&self) -> bool {
        self.flags.bit(LOW_PROBABILITY_BIT)
    }

    pub fn set_low_probability(&mut self, value: bool) {
        self.flags.set_bit(LOW_PROBABILITY_BIT, value);
    }

    /// Extra limited displacement for AI vehicles.
    pub fn limit_displacement(&self) -> bool {
        self.flags.bit(LIMIT_DISPLACEMENT_BIT)
    }

    pub fn set_limit_displacement(&mut self, value: bool) {
        self.flags.set_bit(LIMIT_DISPLACEMENT_BIT, value);
    }

    /// If set, the priority modifier is added to the lane's existing
    /// priority instead of replacing it.
    pub fn additive_priority(&self) -> bool {
        self.flags.bit(ADDITIVE_PRIORITY_BIT)
    }

    pub fn set_additive_priority(&mut self, value: bool) {
        self.flags.set_bit(ADDITIVE_PRIORITY_BIT, value);
    }

    pub fn priority_modifier(&self) -> Nibble {
        let (start, width) = PRIORITY_MODIFIER_BITS;
        Nibble::truncate(self.flags.bits(start, width))
    }

    pub fn set_priority_modifier(&mut self, value: Nibble) {
        let (start, width) = PRIORITY_MODIFIER_BITS;
        self.flags.set_bits(start, width, value.into());
    }

    /// Fields shared by every revision, up to and including the
    /// traffic rule.
    fn read_common<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let name = r.read_token()?;
        let flags = FlagField::new(r.read_u32::<LittleEndian>()?);

        let end = NodeLane {
            node: r.read_u8()?,
            lane: r.read_u8()?,
        };
        let start = NodeLane {
            node: r.read_u8()?,
            lane: r.read_u8()?,
        };

        let start_position = Vector3::read(r, ())?;
        let end_position = Vector3::read(r, ())?;
        let start_rotation = Quaternion::read(r, ())?;
        let end_rotation = Quaternion::read(r, ())?;
        let length = r.read_f32::<LittleEndian>()?;

        let mut next = [0i32; LINE_SLOTS];
        r.read_i32_into::<LittleEndian>(&mut next)?;
        let mut previous = [0i32; LINE_SLOTS];
        r.read_i32_into::<LittleEndian>(&mut previous)?;

        let next_used = r.read_u32::<LittleEndian>()? as usize;
        let previous_used = r.read_u32::<LittleEndian>()? as usize;

        let semaphore_id = r.read_i32::<LittleEndian>()?;
        let traffic_rule = r.read_token()?;

        Ok(NavCurve {
            name,
            flags,
            end,
            start,
            start_position,
            end_position,
            start_rotation,
            end_rotation,
            length,
            next_lines: slots_to_list(&next, next_used)?,
            previous_lines: slots_to_list(&previous, previous_used)?,
            semaphore_id,
            traffic_rule,
            nav_node_index: u32::MAX,
        })
    }
}

impl Record for NavCurve {
    type Version = PpdVersion;

    fn read<R: Read + Seek>(r: &mut R, version: PpdVersion) -> Result<Self> {
        match version {
            PpdVersion::V15 => NavCurve::read_common(r),
            PpdVersion::V16 | PpdVersion::V17 | PpdVersion::V18 | PpdVersion::V19 => {
                let mut curve = NavCurve::read_common(r)?;
                curve.nav_node_index = r.read_u32::<LittleEndian>()?;
                Ok(curve)
            }
        }
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_token(self.name)?;
        w.write_u32::<LittleEndian>(self.flags.value())?;

        w.write_u8(self.end.node)?;
        w.write_u8(self.end.lane)?;
        w.write_u8(self.start.node)?;
        w.write_u8(self.start.lane)?;

        self.start_position.write(w)?;
        self.end_position.write(w)?;
        self.start_rotation.write(w)?;
        self.end_rotation.write(w)?;
        w.write_f32::<LittleEndian>(self.length)?;

        write_padded(w, &self.next_lines, LINE_SLOTS, &-1, |w, &v| {
            w.write_i32::<LittleEndian>(v)?;
            Ok(())
        })?;
        write_padded(w, &self.previous_lines, LINE_SLOTS, &-1, |w, &v| {
            w.write_i32::<LittleEndian>(v)?;
            Ok(())
        })?;
        w.write_u32::<LittleEndian>(self.next_lines.len() as u32)?;
        w.write_u32::<LittleEndian>(self.previous_lines.len() as u32)?;

        w.write_i32::<LittleEndian>(self.semaphore_id)?;
        w.write_token(self.traffic_rule)?;
        w.write_u32::<LittleEndian>(self.nav_node_index)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Cursor;

    /// Byte offset of the `next` slot array within a curve
    const NEXT_SLOTS_OFFSET: usize = 8 + 4 + 4 + 12 + 12 + 16 + 16 + 4;
    const CURVE_SIZE_V19: usize = NEXT_SLOTS_OFFSET + 32 + 8 + 4 + 8 + 4;

    fn i32_at(buf: &[u8], offset: usize) -> i32 {
        i32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_next_lines_are_padded() {
        let mut curve = NavCurve::default();
        curve.next_lines.push(3).unwrap();
        curve.next_lines.push(7).unwrap();

        let mut buf = Vec::new();
        curve.write(&mut buf).unwrap();
        assert_eq!(buf.len(), CURVE_SIZE_V19);

        let next: Vec<i32> = (0..4).map(|i| i32_at(&buf, NEXT_SLOTS_OFFSET + i * 4)).collect();
        assert_eq!(next, vec![3, 7, -1, -1]);
        // previous list is empty: all four slots padded
        let previous: Vec<i32> = (4..8).map(|i| i32_at(&buf, NEXT_SLOTS_OFFSET + i * 4)).collect();
        assert_eq!(previous, vec![-1; 4]);
        assert_eq!(i32_at(&buf, NEXT_SLOTS_OFFSET + 32), 2);
        assert_eq!(i32_at(&buf, NEXT_SLOTS_OFFSET + 36), 0);
    }

    #[test]
    fn test_line_capacity() {
        let mut curve = NavCurve::default();
        for i in 0..4 {
            curve.previous_lines.push(i).unwrap();
        }
        assert!(matches!(
            curve.previous_lines.push(4),
            Err(Error::CapacityExceeded { capacity: 4 })
        ));
    }

    #[test]
    fn test_oversized_line_list_is_rejected_on_write() {
        let mut curve = NavCurve::default();
        curve.next_lines = LimitedList::from_slice(8, &[1, 2, 3, 4, 5]).unwrap();
        let mut buf = Vec::new();
        assert!(matches!(
            curve.write(&mut buf),
            Err(Error::CapacityExceeded { capacity: 4 })
        ));

        // a wider list that still fits writes the fixed four slots
        curve.next_lines = LimitedList::from_slice(8, &[1, 2]).unwrap();
        let mut buf = Vec::new();
        curve.write(&mut buf).unwrap();
        assert_eq!(buf.len(), CURVE_SIZE_V19);
        let read = NavCurve::read(&mut Cursor::new(&buf), PpdVersion::V19).unwrap();
        assert_eq!(read.next_lines.as_slice(), &[1, 2]);
        assert_eq!(read.next_lines.capacity(), LINE_SLOTS);
    }

    #[test]
    fn test_v15_has_no_nav_node_index() {
        let mut curve = NavCurve::default();
        curve.name = Token::new("lane_0").unwrap();
        curve.nav_node_index = 5;
        curve.length = 12.5;

        let mut buf = Vec::new();
        curve.write(&mut buf).unwrap();

        let v15 = &buf[..CURVE_SIZE_V19 - 4];
        let mut cursor = Cursor::new(v15);
        let read = NavCurve::read(&mut cursor, PpdVersion::V15).unwrap();
        assert_eq!(cursor.position() as usize, v15.len());
        assert_eq!(read.nav_node_index, u32::MAX);
        assert_eq!(read.name, curve.name);
        assert_eq!(read.length, 12.5);

        let read = NavCurve::read(&mut Cursor::new(&buf), PpdVersion::V18).unwrap();
        assert_eq!(read, curve);
    }

    #[test]
    fn test_flag_accessors_are_independent() {
        let mut curve = NavCurve::default();
        curve.set_flags(FlagField::new(0xFFF0_FFFF));
        let before = curve.flags().value();

        curve.set_priority_modifier(Nibble::new(0b1010).unwrap());
        let after = curve.flags().value();
        assert_eq!(before & !0x000F_0000, after & !0x000F_0000);
        assert_eq!(curve.priority_modifier().get(), 0b1010);

        curve.set_blinker(BlinkerType::Left);
        curve.set_allowed_vehicles(AllowedVehicles::LargeVehicles);
        curve.set_low_probability(false);
        assert_eq!(curve.priority_modifier().get(), 0b1010);
        assert_eq!(curve.blinker(), BlinkerType::Left);
        assert_eq!(curve.allowed_vehicles(), AllowedVehicles::LargeVehicles);
        assert!(!curve.low_probability());
        assert!(curve.limit_displacement());
        assert!(curve.additive_priority());
    }

    #[test]
    fn test_corrupt_used_count() {
        let curve = NavCurve::default();
        let mut buf = Vec::new();
        curve.write(&mut buf).unwrap();
        buf[NEXT_SLOTS_OFFSET + 32..NEXT_SLOTS_OFFSET + 36].copy_from_slice(&9u32.to_le_bytes());

        assert!(matches!(
            NavCurve::read(&mut Cursor::new(&buf), PpdVersion::V19),
            Err(Error::MalformedData(_))
        ));
    }
}
