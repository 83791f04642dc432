use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::io::{ReadTokenExt, Record, WriteTokenExt};
use crate::math::{Quaternion, Vector3, Vector4};
use crate::ppd::PpdVersion;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreType {
    ModelOnly,
    TrafficLight,
    TrafficLightMinor,
    TrafficLightMajor,
    BarrierManualTimed,
    BarrierDistance,
    TrafficLightBlockable,
    BarrierGas,
    TrafficLightVirtual,
    UseProfile,
    Unknown(u32),
}

impl From<u32> for SemaphoreType {
    fn from(value: u32) -> Self {
        match value {
            0 => SemaphoreType::ModelOnly,
            1 => SemaphoreType::TrafficLight,
            2 => SemaphoreType::TrafficLightMinor,
            3 => SemaphoreType::TrafficLightMajor,
            4 => SemaphoreType::BarrierManualTimed,
            5 => SemaphoreType::BarrierDistance,
            6 => SemaphoreType::TrafficLightBlockable,
            7 => SemaphoreType::BarrierGas,
            8 => SemaphoreType::TrafficLightVirtual,
            9 => SemaphoreType::UseProfile,
            other => SemaphoreType::Unknown(other),
        }
    }
}

impl From<SemaphoreType> for u32 {
    fn from(value: SemaphoreType) -> u32 {
        match value {
            SemaphoreType::ModelOnly => 0,
            SemaphoreType::TrafficLight => 1,
            SemaphoreType::TrafficLightMinor => 2,
            SemaphoreType::TrafficLightMajor => 3,
            SemaphoreType::BarrierManualTimed => 4,
            SemaphoreType::BarrierDistance => 5,
            SemaphoreType::TrafficLightBlockable => 6,
            SemaphoreType::BarrierGas => 7,
            SemaphoreType::TrafficLightVirtual => 8,
            SemaphoreType::UseProfile => 9,
            SemaphoreType::Unknown(v) => v,
        }
    }
}

/// A traffic light or barrier
#[derive(Debug, Clone, PartialEq)]
pub struct Semaphore {
    pub position: Vector3,
    pub rotation: Quaternion,
    pub semaphore_type: SemaphoreType,
    pub id: u32,
    /// Duration of each light state
    pub intervals: Vector4,
    pub cycle_delay: f32,
    /// Only used when the type is [`SemaphoreType::UseProfile`]
    pub profile: Token,
    pub unknown1: u32,
    /// Present on disk from 0x19 only; zero otherwise
    pub unknown2: [u32; 4],
}

impl Default for Semaphore {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            semaphore_type: SemaphoreType::ModelOnly,
            id: 0,
            intervals: Vector4::default(),
            cycle_delay: 0.0,
            profile: Token::EMPTY,
            unknown1: 0,
            unknown2: [0; 4],
        }
    }
}

impl Semaphore {
    fn read_common<R: Read + Seek>(r: &mut R) -> Result<Self> {
        Ok(Semaphore {
            position: Vector3::read(r, ())?,
            rotation: Quaternion::read(r, ())?,
            semaphore_type: SemaphoreType::from(r.read_u32::<LittleEndian>()?),
            id: r.read_u32::<LittleEndian>()?,
            intervals: Vector4::read(r, ())?,
            cycle_delay: r.read_f32::<LittleEndian>()?,
            profile: r.read_token()?,
            unknown1: r.read_u32::<LittleEndian>()?,
            unknown2: [0; 4],
        })
    }
}

impl Record for Semaphore {
    type Version = PpdVersion;

    fn read<R: Read + Seek>(r: &mut R, version: PpdVersion) -> Result<Self> {
        match version {
            PpdVersion::V15 | PpdVersion::V16 | PpdVersion::V17 | PpdVersion::V18 => {
                Semaphore::read_common(r)
            }
            PpdVersion::V19 => {
                let mut semaphore = Semaphore::read_common(r)?;
                r.read_u32_into::<LittleEndian>(&mut semaphore.unknown2)?;
                Ok(semaphore)
            }
        }
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        self.position.write(w)?;
        self.rotation.write(w)?;
        w.write_u32::<LittleEndian>(self.semaphore_type.into())?;
        w.write_u32::<LittleEndian>(self.id)?;
        self.intervals.write(w)?;
        w.write_f32::<LittleEndian>(self.cycle_delay)?;
        w.write_token(self.profile)?;
        w.write_u32::<LittleEndian>(self.unknown1)?;
        for v in self.unknown2 {
            w.write_u32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}
