use crate::errors::InkError;
use crate::mesh::{normalize_triangles, Mesh, TextureInfo};
use crate::packed::{calc_transform_for_format, PackedVertList, VertFormat};
use crate::{Bounds, Color, Transform};
use log::{error, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderType {
    ColoredVert,
    SingleColor,
    Erase,
    TexturedVert,
}

/// Index storage sized to the vertex count.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(idx) => idx.len(),
            IndexBuffer::U32(idx) => idx.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, n: usize) -> u32 {
        match self {
            IndexBuffer::U16(idx) => idx[n] as u32,
            IndexBuffer::U32(idx) => idx[n],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(idx) => bytemuck::cast_slice(idx),
            IndexBuffer::U32(idx) => bytemuck::cast_slice(idx),
        }
    }
}

/// A mesh quantized into the vertex layout its shader expects.
///
/// Positions are stored in packed space; `object_matrix` maps packed space to
/// world space, so world placement matches the source mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedMesh {
    pub shader_type: ShaderType,
    verts: PackedVertList,
    idx: IndexBuffer,
    vertex_count: usize,
    mbr: Bounds,
    pub object_matrix: Transform,
    pub texture: Option<TextureInfo>,
    pub color: Color,
    pub mul_color_modifier: Color,
    pub add_color_modifier: Color,
}

impl OptimizedMesh {
    /// The layout each shader reads.
    pub fn vertex_format(shader_type: ShaderType) -> VertFormat {
        match shader_type {
            ShaderType::ColoredVert => VertFormat::X11A7R6Y11G7B6,
            ShaderType::SingleColor | ShaderType::Erase => VertFormat::X12Y12,
            ShaderType::TexturedVert => VertFormat::X11A7R6Y11G7B6U12V12,
        }
    }

    /// # Panics
    ///
    /// Panics if `mesh` has no vertices or its indices do not form triangles.
    pub fn new(shader_type: ShaderType, mesh: &Mesh) -> OptimizedMesh {
        let envelope = mesh
            .envelope()
            .unwrap_or_else(|| panic!("cannot optimize a mesh without vertices"));
        OptimizedMesh::with_envelope(shader_type, mesh, envelope)
    }

    /// Packs `mesh` relative to `envelope`, which must contain the mesh.
    /// Sharing one envelope between meshes gives them the same quantization.
    ///
    /// # Panics
    ///
    /// Panics if `mesh` has no vertices, its indices do not form triangles,
    /// `envelope` does not contain it, or the packing transform cannot be
    /// inverted.
    pub fn with_envelope(shader_type: ShaderType, mesh: &Mesh, envelope: Bounds) -> OptimizedMesh {
        let mesh_envelope = mesh
            .envelope()
            .unwrap_or_else(|| panic!("cannot optimize a mesh without vertices"));
        assert!(
            !mesh.idx.is_empty() && mesh.idx.len() % 3 == 0,
            "optimized meshes need whole indexed triangles, got {} indices",
            mesh.idx.len()
        );
        assert!(
            envelope.contains(&mesh_envelope),
            "envelope {:?} does not contain mesh {:?}",
            envelope,
            mesh_envelope
        );

        let fmt = OptimizedMesh::vertex_format(shader_type);
        let m = calc_transform_for_format(&envelope, fmt);
        let verts = PackedVertList::pack_verts(&mesh.verts, &m, fmt);
        let mbr = mesh_envelope.transform(&m);
        let packed_to_mesh = match m.inverse() {
            Some(inv) => inv,
            None => panic!("cannot invert packing transform {:?} for envelope {:?}", m, envelope),
        };

        // Rounding while packing can flip a triangle, so winding is derived
        // from the packed positions rather than the source mesh.
        let position = |i: u32| verts.unpack_vertex(i as usize).position;
        let idx = if mesh.verts.len() <= u16::MAX as usize {
            let mut idx: Vec<u16> = mesh.idx.iter().map(|&i| i as u16).collect();
            normalize_triangles(&mut idx, position);
            IndexBuffer::U16(idx)
        } else {
            warn!("{} vertices, packing with 32-bit indices", mesh.verts.len());
            let mut idx = mesh.idx.clone();
            normalize_triangles(&mut idx, position);
            IndexBuffer::U32(idx)
        };

        let optimized = OptimizedMesh {
            shader_type,
            texture: mesh.texture.clone(),
            color: mesh.verts[0].color,
            mul_color_modifier: Color::WHITE,
            add_color_modifier: Color::TRANSPARENT,
            // m maps mesh space to packed space; object_matrix must map
            // packed space to world space.
            object_matrix: packed_to_mesh * mesh.object_matrix,
            vertex_count: mesh.verts.len(),
            verts,
            idx,
            mbr,
        };
        optimized.validate();
        optimized
    }

    /// Drops the cpu copy of the packed vertices. Type, colors, texture,
    /// transform, bounds and indices are kept. Irreversible.
    pub fn clear_cpu_memory_verts(&mut self) {
        self.verts.clear();
    }

    pub fn has_cpu_verts(&self) -> bool {
        !self.verts.is_empty()
    }

    /// Unpacks into a [`Mesh`] with color modifiers applied. Positions carry
    /// the quantization error of the packed format.
    pub fn to_mesh(&self) -> Result<Mesh, InkError> {
        if self.verts.is_empty() {
            return Err(InkError::VerticesCleared);
        }
        let verts = (0..self.verts.len())
            .map(|i| {
                let mut v = self.verts.unpack_vertex(i);
                if self.shader_type == ShaderType::SingleColor {
                    v.color = self.color;
                }
                v.color = v.color * self.mul_color_modifier + self.add_color_modifier;
                v
            })
            .collect();
        let idx = match &self.idx {
            IndexBuffer::U16(idx) => idx.iter().map(|&i| i as u32).collect(),
            IndexBuffer::U32(idx) => idx.clone(),
        };
        Ok(Mesh {
            verts,
            idx,
            object_matrix: self.object_matrix,
            texture: self.texture.clone(),
            ..Default::default()
        })
    }

    pub fn verts(&self) -> &PackedVertList {
        &self.verts
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.idx
    }

    pub fn index_size(&self) -> usize {
        self.idx.len()
    }

    /// Vertices packed at construction, still known after the cpu copy is cleared.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_at(&self, n: usize) -> u32 {
        self.idx.at(n)
    }

    /// The 16-bit index buffer. Meshes packed with 32-bit indices fail
    /// rather than truncate.
    pub fn index16(&self) -> Result<&[u16], InkError> {
        match &self.idx {
            IndexBuffer::U16(idx) => Ok(idx),
            IndexBuffer::U32(_) => {
                error!("cannot represent this optimized mesh's index in 16 bits");
                Err(InkError::IndexOverflow {
                    vertex_count: self.vertex_count,
                })
            }
        }
    }

    /// Bounds of the vertices in packed space.
    pub fn mesh_bounds(&self) -> Bounds {
        self.mbr
    }

    pub fn world_bounds(&self) -> Bounds {
        self.mbr.transform(&self.object_matrix)
    }

    pub fn set_color_modifiers(&mut self, mul: Color, add: Color) {
        self.mul_color_modifier = mul;
        self.add_color_modifier = add;
    }

    pub fn validate(&self) {
        if self.idx.is_empty() {
            return;
        }
        assert!(
            self.idx.len() % 3 == 0,
            "index count {} is not a multiple of 3",
            self.idx.len()
        );
    }
}
