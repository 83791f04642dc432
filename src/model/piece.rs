//! Mesh pieces: interleaved vertices plus a triangle list
//!
//! A piece header stores, for each vertex attribute, the absolute offset
//! of that attribute in the first vertex, or `-1` if the attribute is
//! absent. Attributes are interleaved, so every vertex occupies the
//! same stride. Which optional attributes exist is decided per piece.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};
use crate::io::{read_records, Record};
use crate::math::{AxisAlignedBox, Vector2, Vector3, Vector4};

/// Size of one piece header in bytes
pub const PIECE_HEADER_SIZE: usize = 6 * 4 + 12 + 4 + 24 + 4 + 9 * 4;

const ABSENT: i32 = -1;

/// One triangle as three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Triangle {
    pub a: u16,
    pub b: u16,
    pub c: u16,
}

impl Triangle {
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        Self { a, b, c }
    }

    /// Flip the winding order.
    pub fn invert_order(&mut self) {
        std::mem::swap(&mut self.a, &mut self.c);
    }
}

impl Record for Triangle {
    type Version = ();

    fn read<R: Read + Seek>(r: &mut R, _: ()) -> Result<Self> {
        Ok(Triangle {
            a: r.read_u16::<LittleEndian>()?,
            b: r.read_u16::<LittleEndian>()?,
            c: r.read_u16::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<LittleEndian>(self.a)?;
        w.write_u16::<LittleEndian>(self.b)?;
        w.write_u16::<LittleEndian>(self.c)?;
        Ok(())
    }
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut rgba = [0u8; 4];
        r.read_exact(&mut rgba)?;
        Ok(Color::new(rgba[0], rgba[1], rgba[2], rgba[3]))
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[self.r, self.g, self.b, self.a])?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub tangent: Option<Vector4>,
    pub color: Color,
    pub secondary_color: Option<Color>,
    pub texture_coordinates: Vec<Vector2>,
    pub bone_indices: Option<[u8; 4]>,
    pub bone_weights: Option<[u8; 4]>,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            normal: Vector3::ZERO,
            tangent: None,
            color: Color::WHITE,
            secondary_color: None,
            texture_coordinates: Vec::new(),
            bone_indices: None,
            bone_weights: None,
        }
    }
}

impl Vertex {
    pub fn new(position: Vector3, normal: Vector3) -> Self {
        Self {
            position,
            normal,
            ..Default::default()
        }
    }
}

/// Which optional attributes the vertices of a piece carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct VertexLayout {
    tangent: bool,
    secondary_color: bool,
    uv_channels: usize,
    bone_indices: bool,
    bone_weights: bool,
}

/// Attribute offsets relative to the start of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttributeOffsets {
    position: i32,
    normal: i32,
    uv: i32,
    color: i32,
    secondary_color: i32,
    tangent: i32,
    bone_indices: i32,
    bone_weights: i32,
}

impl VertexLayout {
    fn of(vertex: &Vertex) -> Self {
        VertexLayout {
            tangent: vertex.tangent.is_some(),
            secondary_color: vertex.secondary_color.is_some(),
            uv_channels: vertex.texture_coordinates.len(),
            bone_indices: vertex.bone_indices.is_some(),
            bone_weights: vertex.bone_weights.is_some(),
        }
    }

    fn matches(&self, vertex: &Vertex) -> bool {
        *self == VertexLayout::of(vertex)
    }

    /// Offsets in stride order: position, normal, tangent, color,
    /// secondary color, uvs, bone indices, bone weights.
    fn offsets(&self) -> (AttributeOffsets, usize) {
        let mut at = 0usize;
        let mut take = |present: bool, size: usize| {
            if present {
                let offset = at as i32;
                at += size;
                offset
            } else {
                ABSENT
            }
        };
        let position = take(true, 12);
        let normal = take(true, 12);
        let tangent = take(self.tangent, 16);
        let color = take(true, 4);
        let secondary_color = take(self.secondary_color, 4);
        let uv = take(self.uv_channels > 0, 8 * self.uv_channels);
        let bone_indices = take(self.bone_indices, 4);
        let bone_weights = take(self.bone_weights, 4);
        (
            AttributeOffsets {
                position,
                normal,
                uv,
                color,
                secondary_color,
                tangent,
                bone_indices,
                bone_weights,
            },
            at,
        )
    }

    fn stride(&self) -> usize {
        self.offsets().1
    }
}

/// A mesh with a single material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Piece {
    pub material: i32,
    pub bone_count: i32,
    /// Raw UV channel mask, kept as read
    pub uv_mask: u32,
    pub bounding_box_center: Vector3,
    pub bounding_box_diagonal: f32,
    pub bounding_box: AxisAlignedBox,
    /// Raw skeleton offset, kept as read
    pub skeleton_offset: i32,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Piece {
    fn layout(&self) -> Result<VertexLayout> {
        let layout = self
            .vertices
            .first()
            .map(VertexLayout::of)
            .unwrap_or_default();
        if let Some(i) = self.vertices.iter().position(|v| !layout.matches(v)) {
            return Err(Error::MalformedData(format!(
                "vertex {} does not share the attribute layout of vertex 0",
                i
            )));
        }
        Ok(layout)
    }

    /// Read a piece header and follow its offsets to the vertex and
    /// index data. The stream is left right after the header.
    pub(crate) fn read<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let edge_count = r.read_u32::<LittleEndian>()? as usize;
        let vertex_count = r.read_u32::<LittleEndian>()? as usize;
        let uv_mask = r.read_u32::<LittleEndian>()?;
        let uv_channels = r.read_u32::<LittleEndian>()? as usize;
        let bone_count = r.read_i32::<LittleEndian>()?;
        let material = r.read_i32::<LittleEndian>()?;
        let bounding_box_center = Vector3::read(r, ())?;
        let bounding_box_diagonal = r.read_f32::<LittleEndian>()?;
        let bounding_box = AxisAlignedBox::read(r, ())?;
        let skeleton_offset = r.read_i32::<LittleEndian>()?;

        let mut offsets = [0i32; 8];
        r.read_i32_into::<LittleEndian>(&mut offsets)?;
        let [position, _normal, _uv, _color, secondary_color, tangent, bone_indices, bone_weights] =
            offsets;
        let index_offset = r.read_i32::<LittleEndian>()?;

        if edge_count % 3 != 0 {
            return Err(Error::MalformedData(format!(
                "piece edge count {} is not a multiple of 3",
                edge_count
            )));
        }

        let layout = VertexLayout {
            tangent: tangent != ABSENT,
            secondary_color: secondary_color != ABSENT,
            uv_channels,
            bone_indices: bone_indices != ABSENT,
            bone_weights: bone_weights != ABSENT,
        };

        let end_of_header = r.stream_position()?;

        let mut vertices = Vec::with_capacity(vertex_count.min(0x1_0000));
        if vertex_count > 0 {
            r.seek(SeekFrom::Start(u64::from(position as u32)))?;
            for _ in 0..vertex_count {
                vertices.push(read_vertex(r, &layout)?);
            }
        }

        let triangles = if edge_count > 0 {
            r.seek(SeekFrom::Start(u64::from(index_offset as u32)))?;
            read_records(r, edge_count / 3, ())?
        } else {
            Vec::new()
        };

        r.seek(SeekFrom::Start(end_of_header))?;

        Ok(Piece {
            material,
            bone_count,
            uv_mask,
            bounding_box_center,
            bounding_box_diagonal,
            bounding_box,
            skeleton_offset,
            vertices,
            triangles,
        })
    }

    /// Write the piece header, with vertex data at `vertex_offset` and
    /// triangles at `index_offset`.
    pub(crate) fn write_header<W: Write>(
        &self,
        w: &mut W,
        vertex_offset: u32,
        index_offset: u32,
    ) -> Result<()> {
        let layout = self.layout()?;
        let (offsets, _) = layout.offsets();
        let absolute = |relative: i32| {
            if relative == ABSENT {
                ABSENT
            } else {
                (vertex_offset as i32).wrapping_add(relative)
            }
        };

        w.write_u32::<LittleEndian>((self.triangles.len() * 3) as u32)?;
        w.write_u32::<LittleEndian>(self.vertices.len() as u32)?;
        w.write_u32::<LittleEndian>(self.uv_mask)?;
        w.write_u32::<LittleEndian>(layout.uv_channels as u32)?;
        w.write_i32::<LittleEndian>(self.bone_count)?;
        w.write_i32::<LittleEndian>(self.material)?;
        self.bounding_box_center.write(w)?;
        w.write_f32::<LittleEndian>(self.bounding_box_diagonal)?;
        self.bounding_box.write(w)?;
        w.write_i32::<LittleEndian>(self.skeleton_offset)?;

        for relative in [
            offsets.position,
            offsets.normal,
            offsets.uv,
            offsets.color,
            offsets.secondary_color,
            offsets.tangent,
            offsets.bone_indices,
            offsets.bone_weights,
        ] {
            w.write_i32::<LittleEndian>(absolute(relative))?;
        }
        w.write_i32::<LittleEndian>(index_offset as i32)?;
        Ok(())
    }

    /// Write the interleaved vertex block.
    pub(crate) fn write_vertices<W: Write>(&self, w: &mut W) -> Result<()> {
        self.layout()?;
        for vertex in &self.vertices {
            write_vertex(w, vertex)?;
        }
        Ok(())
    }

    /// Write the index block.
    pub(crate) fn write_triangles<W: Write>(&self, w: &mut W) -> Result<()> {
        for triangle in &self.triangles {
            triangle.write(w)?;
        }
        Ok(())
    }

    /// Length in bytes of the vertex block
    pub(crate) fn vertex_block_len(&self) -> usize {
        self.vertices
            .first()
            .map_or(0, |v| VertexLayout::of(v).stride() * self.vertices.len())
    }

    /// Length in bytes of the index block
    pub(crate) fn index_block_len(&self) -> usize {
        self.triangles.len() * 6
    }
}

fn read_vertex<R: Read + Seek>(r: &mut R, layout: &VertexLayout) -> Result<Vertex> {
    let position = Vector3::read(r, ())?;
    let normal = Vector3::read(r, ())?;
    let tangent = if layout.tangent {
        Some(Vector4::read(r, ())?)
    } else {
        None
    };
    let color = Color::read(r)?;
    let secondary_color = if layout.secondary_color {
        Some(Color::read(r)?)
    } else {
        None
    };
    let texture_coordinates = read_records(r, layout.uv_channels, ())?;
    let bone_indices = if layout.bone_indices {
        let mut b = [0u8; 4];
        r.read_exact(&mut b)?;
        Some(b)
    } else {
        None
    };
    let bone_weights = if layout.bone_weights {
        let mut b = [0u8; 4];
        r.read_exact(&mut b)?;
        Some(b)
    } else {
        None
    };

    Ok(Vertex {
        position,
        normal,
        tangent,
        color,
        secondary_color,
        texture_coordinates,
        bone_indices,
        bone_weights,
    })
}

fn write_vertex<W: Write>(w: &mut W, vertex: &Vertex) -> Result<()> {
    vertex.position.write(w)?;
    vertex.normal.write(w)?;
    if let Some(tangent) = &vertex.tangent {
        tangent.write(w)?;
    }
    vertex.color.write(w)?;
    if let Some(color) = &vertex.secondary_color {
        color.write(w)?;
    }
    for uv in &vertex.texture_coordinates {
        uv.write(w)?;
    }
    if let Some(indices) = &vertex.bone_indices {
        w.write_all(indices)?;
    }
    if let Some(weights) = &vertex.bone_weights {
        w.write_all(weights)?;
    }
    Ok(())
}
