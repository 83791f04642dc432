//! Prefab descriptor format revisions

use crate::error::{Error, Result};

/// Supported `.ppd` revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PpdVersion {
    V15,
    V16,
    V17,
    V18,
    V19,
}

/// Which sections a revision carries and how big its header is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SectionLayout {
    /// Number of `u32` count fields after the version
    pub count_fields: usize,
    /// Number of `u32` entries in the offset table
    pub offset_fields: usize,
    pub has_map_points: bool,
    pub has_nav_nodes: bool,
}

impl PpdVersion {
    /// The revision written by [`crate::ppd::PrefabDescriptor::serialize`]
    pub const LATEST: PpdVersion = PpdVersion::V19;

    pub fn from_u32(version: u32) -> Result<Self> {
        match version {
            0x15 => Ok(PpdVersion::V15),
            0x16 => Ok(PpdVersion::V16),
            0x17 => Ok(PpdVersion::V17),
            0x18 => Ok(PpdVersion::V18),
            0x19 => Ok(PpdVersion::V19),
            other => Err(Error::UnsupportedVersion {
                format: ".ppd",
                version: other,
            }),
        }
    }

    pub const fn to_u32(self) -> u32 {
        match self {
            PpdVersion::V15 => 0x15,
            PpdVersion::V16 => 0x16,
            PpdVersion::V17 => 0x17,
            PpdVersion::V18 => 0x18,
            PpdVersion::V19 => 0x19,
        }
    }

    pub(crate) const fn layout(self) -> SectionLayout {
        match self {
            PpdVersion::V15 => SectionLayout {
                count_fields: 10,
                offset_fields: 11,
                has_map_points: true,
                has_nav_nodes: false,
            },
            // 0x16 has a map point count but no map point section
            PpdVersion::V16 => SectionLayout {
                count_fields: 11,
                offset_fields: 12,
                has_map_points: false,
                has_nav_nodes: true,
            },
            PpdVersion::V17 | PpdVersion::V18 | PpdVersion::V19 => SectionLayout {
                count_fields: 11,
                offset_fields: 12,
                has_map_points: true,
                has_nav_nodes: true,
            },
        }
    }
}

impl TryFrom<u32> for PpdVersion {
    type Error = Error;

    fn try_from(version: u32) -> Result<Self> {
        PpdVersion::from_u32(version)
    }
}

impl From<PpdVersion> for u32 {
    fn from(version: PpdVersion) -> u32 {
        version.to_u32()
    }
}
