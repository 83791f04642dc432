//! Navigation graph nodes used by route finding

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::Result;
use crate::io::{read_records, slots_to_list, write_padded, Record};
use crate::limited_list::LimitedList;

/// Connection slots per node
pub const CONNECTION_SLOTS: usize = 8;
/// Curve slots per connection
pub const CURVE_SLOTS: usize = 8;

const UNUSED_INDEX: u16 = 0xFFFF;

/// What a navigation node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavNodeType {
    /// The node is a control node of the prefab
    ControlNode,
    /// The node is an AI curve inside the prefab
    NavCurve,
    Unknown(u8),
}

impl From<u8> for NavNodeType {
    fn from(value: u8) -> Self {
        match value {
            0 => NavNodeType::ControlNode,
            1 => NavNodeType::NavCurve,
            other => NavNodeType::Unknown(other),
        }
    }
}

impl From<NavNodeType> for u8 {
    fn from(value: NavNodeType) -> u8 {
        match value {
            NavNodeType::ControlNode => 0,
            NavNodeType::NavCurve => 1,
            NavNodeType::Unknown(v) => v,
        }
    }
}

/// An edge of the navigation graph
#[derive(Debug, Clone, PartialEq)]
pub struct NavNodeConnection {
    /// Index of the target nav node
    pub target: u16,
    pub length: f32,
    /// Curves making up the connection
    pub curves: LimitedList<u16>,
}

impl Default for NavNodeConnection {
    fn default() -> Self {
        Self {
            target: 0,
            length: 0.0,
            curves: LimitedList::new(CURVE_SLOTS),
        }
    }
}

impl NavNodeConnection {
    /// Slot filler for unused connections
    fn padding() -> Self {
        Self {
            target: UNUSED_INDEX,
            length: f32::MAX,
            curves: LimitedList::new(CURVE_SLOTS),
        }
    }
}

impl Record for NavNodeConnection {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let target = r.read_u16::<LittleEndian>()?;
        let length = r.read_f32::<LittleEndian>()?;
        let used = r.read_u8()? as usize;
        let mut slots = [0u16; CURVE_SLOTS];
        r.read_u16_into::<LittleEndian>(&mut slots)?;

        Ok(NavNodeConnection {
            target,
            length,
            curves: slots_to_list(&slots, used)?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<LittleEndian>(self.target)?;
        w.write_f32::<LittleEndian>(self.length)?;
        w.write_u8(self.curves.len() as u8)?;
        write_padded(w, &self.curves, CURVE_SLOTS, &UNUSED_INDEX, |w, &v| {
            w.write_u16::<LittleEndian>(v)?;
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavNode {
    pub node_type: NavNodeType,
    /// Index of the control node or curve, depending on `node_type`
    pub index: u16,
    pub connections: LimitedList<NavNodeConnection>,
}

impl Default for NavNode {
    fn default() -> Self {
        Self {
            node_type: NavNodeType::ControlNode,
            index: 0,
            connections: LimitedList::new(CONNECTION_SLOTS),
        }
    }
}

impl Record for NavNode {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        let node_type = NavNodeType::from(r.read_u8()?);
        let index = r.read_u16::<LittleEndian>()?;
        let used = r.read_u8()? as usize;
        let slots: Vec<NavNodeConnection> = read_records(r, CONNECTION_SLOTS, ())?;

        Ok(NavNode {
            node_type,
            index,
            connections: slots_to_list(&slots, used)?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.node_type.into())?;
        w.write_u16::<LittleEndian>(self.index)?;
        w.write_u8(self.connections.len() as u8)?;
        write_padded(
            w,
            &self.connections,
            CONNECTION_SLOTS,
            &NavNodeConnection::padding(),
            |w, c| c.write(w),
        )
    }
}
