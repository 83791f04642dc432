use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::io::{ReadTokenExt, Record, WriteTokenExt};
use crate::math::{Quaternion, Vector3};
use crate::token::Token;

/// A skeleton bone
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: Token,
    /// Row-major 4x4 matrix
    pub transformation: [f32; 16],
    pub transformation_reversed: [f32; 16],
    pub stretch: Quaternion,
    pub rotation: Quaternion,
    pub translation: Vector3,
    pub scale: Vector3,
    pub sign_factor: f32,
    /// Index of the parent bone, `-1` for a root
    pub parent: i8,
    /// Trailing alignment bytes, kept as read
    pub padding: [u8; 3],
}

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: Token::EMPTY,
            transformation: IDENTITY,
            transformation_reversed: IDENTITY,
            stretch: Quaternion::IDENTITY,
            rotation: Quaternion::IDENTITY,
            translation: Vector3::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
            sign_factor: 1.0,
            parent: -1,
            padding: [0; 3],
        }
    }
}

impl Record for Bone {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let name = r.read_token()?;
        let mut transformation = [0f32; 16];
        r.read_f32_into::<LittleEndian>(&mut transformation)?;
        let mut transformation_reversed = [0f32; 16];
        r.read_f32_into::<LittleEndian>(&mut transformation_reversed)?;
        let stretch = Quaternion::read(r, ())?;
        let rotation = Quaternion::read(r, ())?;
        let translation = Vector3::read(r, ())?;
        let scale = Vector3::read(r, ())?;
        let sign_factor = r.read_f32::<LittleEndian>()?;
        let parent = r.read_i8()?;
        let mut padding = [0u8; 3];
        r.read_exact(&mut padding)?;

        Ok(Bone {
            name,
            transformation,
            transformation_reversed,
            stretch,
            rotation,
            translation,
            scale,
            sign_factor,
            parent,
            padding,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_token(self.name)?;
        for v in self.transformation.iter().chain(&self.transformation_reversed) {
            w.write_f32::<LittleEndian>(*v)?;
        }
        self.stretch.write(w)?;
        self.rotation.write(w)?;
        self.translation.write(w)?;
        self.scale.write(w)?;
        w.write_f32::<LittleEndian>(self.sign_factor)?;
        w.write_i8(self.parent)?;
        w.write_all(&self.padding)?;
        Ok(())
    }
}
