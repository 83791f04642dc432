//! Fixed-layout prefab records: signs, spawn points, map points,
//! trigger points and intersections

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::flags::FlagField;
use crate::io::{ReadTokenExt, Record, WriteTokenExt};
use crate::math::{Quaternion, Vector3};
use crate::ppd::PpdVersion;
use crate::token::Token;

/// Neighbour slots of a map point
pub const MAP_POINT_NEIGHBOURS: usize = 6;

/// A sign placed by the prefab
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sign {
    pub name: Token,
    pub position: Vector3,
    pub rotation: Quaternion,
    pub model: Token,
    pub part: Token,
}

impl Record for Sign {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        Ok(Sign {
            name: r.read_token()?,
            position: Vector3::read(r, ())?,
            rotation: Quaternion::read(r, ())?,
            model: r.read_token()?,
            part: r.read_token()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_token(self.name)?;
        self.position.write(w)?;
        self.rotation.write(w)?;
        w.write_token(self.model)?;
        w.write_token(self.part)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPointType {
    None,
    TrailerPosition,
    UnloadEasy,
    GasStation,
    ServiceStation,
    TruckStop,
    WeightStation,
    TruckDealer,
    Hotel,
    Custom,
    Parking,
    Task,
    MeetPosition,
    CompanyPosition,
    GaragePosition,
    BuyPosition,
    RecruitmentPosition,
    CameraPoint,
    BusStation,
    UnloadMedium,
    UnloadHard,
    UnloadRigid,
    WeightStationCat,
    CompanyUnloadPosition,
    TrailerSpawn,
    LongTrailerPosition,
    Unknown(u32),
}

const SPAWN_POINT_TYPES: [SpawnPointType; 26] = [
    SpawnPointType::None,
    SpawnPointType::TrailerPosition,
    SpawnPointType::UnloadEasy,
    SpawnPointType::GasStation,
    SpawnPointType::ServiceStation,
    SpawnPointType::TruckStop,
    SpawnPointType::WeightStation,
    SpawnPointType::TruckDealer,
    SpawnPointType::Hotel,
    SpawnPointType::Custom,
    SpawnPointType::Parking,
    SpawnPointType::Task,
    SpawnPointType::MeetPosition,
    SpawnPointType::CompanyPosition,
    SpawnPointType::GaragePosition,
    SpawnPointType::BuyPosition,
    SpawnPointType::RecruitmentPosition,
    SpawnPointType::CameraPoint,
    SpawnPointType::BusStation,
    SpawnPointType::UnloadMedium,
    SpawnPointType::UnloadHard,
    SpawnPointType::UnloadRigid,
    SpawnPointType::WeightStationCat,
    SpawnPointType::CompanyUnloadPosition,
    SpawnPointType::TrailerSpawn,
    SpawnPointType::LongTrailerPosition,
];

impl From<u32> for SpawnPointType {
    fn from(value: u32) -> Self {
        SPAWN_POINT_TYPES
            .get(value as usize)
            .copied()
            .unwrap_or(SpawnPointType::Unknown(value))
    }
}

impl From<SpawnPointType> for u32 {
    fn from(value: SpawnPointType) -> u32 {
        match value {
            SpawnPointType::Unknown(v) => v,
            known => SPAWN_POINT_TYPES
                .iter()
                .position(|&t| t == known)
                .map_or(0, |i| i as u32),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vector3,
    pub rotation: Quaternion,
    pub spawn_type: SpawnPointType,
    /// Present on disk from 0x18; zero otherwise
    pub reserved: u32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            spawn_type: SpawnPointType::None,
            reserved: 0,
        }
    }
}

impl SpawnPoint {
    fn read_common<R: Read + Seek>(r: &mut R) -> Result<Self> {
        Ok(SpawnPoint {
            position: Vector3::read(r, ())?,
            rotation: Quaternion::read(r, ())?,
            spawn_type: SpawnPointType::from(r.read_u32::<LittleEndian>()?),
            reserved: 0,
        })
    }
}

impl Record for SpawnPoint {
    type Version = PpdVersion;

    fn read<R: Read + Seek>(r: &mut R, version: PpdVersion) -> Result<Self> {
        match version {
            PpdVersion::V15 | PpdVersion::V16 | PpdVersion::V17 => SpawnPoint::read_common(r),
            PpdVersion::V18 | PpdVersion::V19 => {
                let mut point = SpawnPoint::read_common(r)?;
                point.reserved = r.read_u32::<LittleEndian>()?;
                Ok(point)
            }
        }
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        self.position.write(w)?;
        self.rotation.write(w)?;
        w.write_u32::<LittleEndian>(self.spawn_type.into())?;
        w.write_u32::<LittleEndian>(self.reserved)?;
        Ok(())
    }
}

/// A point of the prefab's map (UI) overlay
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub visual_flags: FlagField,
    pub nav_flags: FlagField,
    pub position: Vector3,
    /// Indices of connected map points; unused slots are `-1`
    pub neighbours: [i32; MAP_POINT_NEIGHBOURS],
    pub neighbour_count: u32,
}

impl Default for MapPoint {
    fn default() -> Self {
        Self {
            visual_flags: FlagField::default(),
            nav_flags: FlagField::default(),
            position: Vector3::ZERO,
            neighbours: [-1; MAP_POINT_NEIGHBOURS],
            neighbour_count: 0,
        }
    }
}

impl Record for MapPoint {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let visual_flags = FlagField::new(r.read_u32::<LittleEndian>()?);
        let nav_flags = FlagField::new(r.read_u32::<LittleEndian>()?);
        let position = Vector3::read(r, ())?;
        let mut neighbours = [0i32; MAP_POINT_NEIGHBOURS];
        r.read_i32_into::<LittleEndian>(&mut neighbours)?;
        let neighbour_count = r.read_u32::<LittleEndian>()?;
        Ok(MapPoint {
            visual_flags,
            nav_flags,
            position,
            neighbours,
            neighbour_count,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.visual_flags.value())?;
        w.write_u32::<LittleEndian>(self.nav_flags.value())?;
        self.position.write(w)?;
        for n in self.neighbours {
            w.write_i32::<LittleEndian>(n)?;
        }
        w.write_u32::<LittleEndian>(self.neighbour_count)?;
        Ok(())
    }
}

/// A point that fires an action when a vehicle comes in range
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerPoint {
    pub id: u32,
    pub action: Token,
    pub range: f32,
    pub reset_delay: f32,
    pub reset_distance: f32,
    pub flags: FlagField,
    pub position: Vector3,
    pub neighbours: [i32; 2],
}

impl Default for TriggerPoint {
    fn default() -> Self {
        Self {
            id: 0,
            action: Token::EMPTY,
            range: 0.0,
            reset_delay: 0.0,
            reset_distance: 0.0,
            flags: FlagField::default(),
            position: Vector3::ZERO,
            neighbours: [-1; 2],
        }
    }
}

impl Record for TriggerPoint {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let id = r.read_u32::<LittleEndian>()?;
        let action = r.read_token()?;
        let range = r.read_f32::<LittleEndian>()?;
        let reset_delay = r.read_f32::<LittleEndian>()?;
        let reset_distance = r.read_f32::<LittleEndian>()?;
        let flags = FlagField::new(r.read_u32::<LittleEndian>()?);
        let position = Vector3::read(r, ())?;
        let mut neighbours = [0i32; 2];
        r.read_i32_into::<LittleEndian>(&mut neighbours)?;
        Ok(TriggerPoint {
            id,
            action,
            range,
            reset_delay,
            reset_distance,
            flags,
            position,
            neighbours,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.id)?;
        w.write_token(self.action)?;
        w.write_f32::<LittleEndian>(self.range)?;
        w.write_f32::<LittleEndian>(self.reset_delay)?;
        w.write_f32::<LittleEndian>(self.reset_distance)?;
        w.write_u32::<LittleEndian>(self.flags.value())?;
        self.position.write(w)?;
        for n in self.neighbours {
            w.write_i32::<LittleEndian>(n)?;
        }
        Ok(())
    }
}

/// Where a curve crosses another curve
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intersection {
    pub curve_id: u32,
    /// Distance along the curve
    pub position: f32,
    pub radius: f32,
    pub flags: FlagField,
}

impl Record for Intersection {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        Ok(Intersection {
            curve_id: r.read_u32::<LittleEndian>()?,
            position: r.read_f32::<LittleEndian>()?,
            radius: r.read_f32::<LittleEndian>()?,
            flags: FlagField::new(r.read_u32::<LittleEndian>()?),
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.curve_id)?;
        w.write_f32::<LittleEndian>(self.position)?;
        w.write_f32::<LittleEndian>(self.radius)?;
        w.write_u32::<LittleEndian>(self.flags.value())?;
        Ok(())
    }
}
