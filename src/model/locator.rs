use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::io::{ReadTokenExt, Record, WriteTokenExt};
use crate::math::{Quaternion, Vector3};
use crate::token::Token;

/// A named attachment point on a model
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    pub name: Token,
    pub position: Vector3,
    pub scale: f32,
    pub rotation: Quaternion,
    /// Offset of the hookup string in the string pool, `-1` for none
    pub hookup_offset: i32,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            name: Token::EMPTY,
            position: Vector3::ZERO,
            scale: 1.0,
            rotation: Quaternion::IDENTITY,
            hookup_offset: -1,
        }
    }
}

impl Record for Locator {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        Ok(Locator {
            name: r.read_token()?,
            position: Vector3::read(r, ())?,
            scale: r.read_f32::<LittleEndian>()?,
            rotation: Quaternion::read(r, ())?,
            hookup_offset: r.read_i32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_token(self.name)?;
        self.position.write(w)?;
        w.write_f32::<LittleEndian>(self.scale)?;
        self.rotation.write(w)?;
        w.write_i32::<LittleEndian>(self.hookup_offset)?;
        Ok(())
    }
}
