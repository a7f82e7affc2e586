use crate::errors::InkError;
use crate::vertex::{InputTime, Vertex};
use crate::{signed_area, Bounds, Point, Transform};
use log::error;

bitflags! {
    #[derive(Default)]
    pub struct ShaderFlags: u32 {
        const PARTICLE = 0x1;
        const ANIMATED = 0x2;
        const CYCLING = 0x4;
        const ERASER = 0x8;
    }
}

/// How a mesh should be shaded. Carried alongside the geometry, never
/// interpreted by it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ShaderMetadata {
    pub flags: ShaderFlags,
    pub init_time: InputTime,
}

impl ShaderMetadata {
    pub fn animated(init_time: InputTime) -> ShaderMetadata {
        ShaderMetadata {
            flags: ShaderFlags::ANIMATED,
            init_time,
        }
    }

    pub fn eraser() -> ShaderMetadata {
        ShaderMetadata {
            flags: ShaderFlags::ERASER,
            init_time: 0.0,
        }
    }

    pub fn particle(init_time: InputTime, cycling: bool) -> ShaderMetadata {
        let mut flags = ShaderFlags::PARTICLE;
        flags.set(ShaderFlags::CYCLING, cycling);
        ShaderMetadata { flags, init_time }
    }

    pub fn is_animated(&self) -> bool {
        self.flags.contains(ShaderFlags::ANIMATED)
    }

    pub fn is_particle(&self) -> bool {
        self.flags.contains(ShaderFlags::PARTICLE)
    }

    pub fn is_cycling(&self) -> bool {
        self.flags.contains(ShaderFlags::CYCLING)
    }

    pub fn is_eraser(&self) -> bool {
        self.flags.contains(ShaderFlags::ERASER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub uri: String,
}

impl TextureInfo {
    pub fn new<S: Into<String>>(uri: S) -> TextureInfo {
        TextureInfo { uri: uri.into() }
    }
}

/// Triangles are consecutive index triples. Each one whose signed area is
/// negative gets its second and third index swapped.
pub(crate) fn normalize_triangles<I, F>(indices: &mut [I], position: F)
where
    I: Copy + Into<u32>,
    F: Fn(u32) -> Point,
{
    assert!(
        indices.len() % 3 == 0,
        "index count {} is not a multiple of 3",
        indices.len()
    );
    for tri in indices.chunks_exact_mut(3) {
        let area = signed_area(
            position(tri[0].into()),
            position(tri[1].into()),
            position(tri[2].into()),
        );
        if area < 0.0 {
            tri.swap(1, 2);
        }
    }
}

/// Unpacked triangle mesh. Vertices live in object space; `object_matrix`
/// maps them to world space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub idx: Vec<u32>,
    pub object_matrix: Transform,
    pub texture: Option<TextureInfo>,
    pub shader_metadata: ShaderMetadata,
}

impl Mesh {
    pub fn new() -> Mesh {
        Default::default()
    }

    pub fn from_verts(verts: Vec<Vertex>) -> Mesh {
        Mesh {
            verts,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.verts.clear();
        self.idx.clear();
    }

    /// Appends `other`, moving its vertices into this mesh's object space.
    ///
    /// # Panics
    ///
    /// Panics when one mesh is indexed and the other is not, or when this
    /// mesh's object matrix is singular.
    pub fn append(&mut self, other: &Mesh) {
        assert!(
            other.verts.is_empty() || self.verts.is_empty() || other.idx.is_empty() == self.idx.is_empty(),
            "cannot append an indexed mesh to an unindexed one"
        );
        let world_to_object = match self.object_matrix.inverse() {
            Some(inv) => inv,
            None => panic!("cannot append into a mesh with singular transform {:?}", self.object_matrix),
        };

        let start_idx = self.verts.len() as u32;
        let t = other.object_matrix * world_to_object;
        self.verts.extend(other.verts.iter().map(|v| Vertex {
            position: t.transform_point(v.position),
            ..*v
        }));
        self.idx.extend(other.idx.iter().map(|i| i + start_idx));
    }

    /// Expands to one vertex per index. No-op when unindexed.
    pub fn deindex(&mut self) {
        if self.idx.is_empty() {
            return;
        }
        let verts: Vec<Vertex> = self.idx.iter().map(|&i| self.verts[i as usize]).collect();
        self.idx.clear();
        self.verts = verts;
    }

    /// Indexes every vertex once, in order.
    pub fn gen_index(&mut self) {
        self.idx = (0..self.verts.len() as u32).collect();
    }

    pub fn normalize_triangle_orientation(&mut self) {
        let verts = &self.verts;
        normalize_triangles(&mut self.idx, |i| verts[i as usize].position);
    }

    pub fn object_pos_to_world(&self, object_pos: Point) -> Point {
        self.object_matrix.transform_point(object_pos)
    }

    pub fn has_16bit_index(&self) -> bool {
        self.verts.len() <= u16::MAX as usize
    }

    pub fn index16(&self) -> Result<Vec<u16>, InkError> {
        if !self.has_16bit_index() {
            error!("mesh overflowing vert index: {} vertices", self.verts.len());
            return Err(InkError::IndexOverflow {
                vertex_count: self.verts.len(),
            });
        }
        Ok(self.idx.iter().map(|&i| i as u16).collect())
    }

    pub fn index_size(&self) -> usize {
        self.idx.len()
    }

    pub fn index_at(&self, n: usize) -> u32 {
        self.idx[n]
    }

    /// Envelope of the vertices in object space.
    pub fn envelope(&self) -> Option<Bounds> {
        Bounds::envelope(self.verts.iter().map(|v| v.position))
    }

    pub fn triangle_count(&self) -> usize {
        if self.idx.is_empty() {
            self.verts.len() / 3
        } else {
            self.idx.len() / 3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn square() -> Mesh {
        let mut mesh = Mesh::from_verts(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(0.0, 1.0),
        ]);
        // second triangle winds clockwise
        mesh.idx = vec![0, 1, 2, 0, 3, 2];
        mesh
    }

    fn areas(mesh: &Mesh) -> Vec<f32> {
        mesh.idx
            .chunks(3)
            .map(|t| {
                signed_area(
                    mesh.verts[t[0] as usize].position,
                    mesh.verts[t[1] as usize].position,
                    mesh.verts[t[2] as usize].position,
                )
            })
            .collect()
    }

    #[test]
    fn normalization_flips_clockwise_triangles_once() {
        let mut mesh = square();
        mesh.normalize_triangle_orientation();
        assert_eq!(mesh.idx, vec![0, 1, 2, 0, 2, 3]);
        assert!(areas(&mesh).iter().all(|a| *a >= 0.0));

        let once = mesh.idx.clone();
        mesh.normalize_triangle_orientation();
        assert_eq!(mesh.idx, once);
    }

    #[test]
    #[should_panic]
    fn normalization_rejects_partial_triangles() {
        let mut mesh = square();
        mesh.idx.pop();
        mesh.normalize_triangle_orientation();
    }

    #[test]
    fn append_moves_vertices_into_receiver_space() {
        let mut a = square();
        let mut b = Mesh::from_verts(vec![Vertex::new(1.0, 1.0), Vertex::new(2.0, 1.0), Vertex::new(1.0, 2.0)]);
        b.idx = vec![0, 1, 2];
        b.object_matrix = Transform::scale(2.0, 2.0);

        let before = a.verts.len() as u32;
        let before_idx = a.index_size();
        a.append(&b);

        assert_eq!(a.verts[before as usize].position, Point::new(2.0, 2.0));
        assert_eq!(a.index_size(), before_idx + b.index_size());
        assert_eq!(&a.idx[before_idx..], &[before, before + 1, before + 2]);
    }

    #[test]
    fn append_respects_a_transformed_receiver() {
        let mut a = Mesh::new();
        a.object_matrix = Transform::translate(10.0, 0.0);
        let mut b = Mesh::from_verts(vec![Vertex::new(0.0, 0.0)]);
        b.object_matrix = Transform::translate(0.0, 5.0);
        a.append(&b);
        assert_eq!(a.verts[0].position, Point::new(-10.0, 5.0));
        assert_eq!(a.object_pos_to_world(a.verts[0].position), Point::new(0.0, 5.0));
    }

    #[test]
    fn append_into_a_tiny_scale_keeps_world_placement() {
        let mut a = Mesh::new();
        a.object_matrix = Transform::scale(0.0005, 0.0005);
        let b = Mesh::from_verts(vec![Vertex::new(1.0, 1.0)]);
        a.append(&b);
        let world = a.object_pos_to_world(a.verts[0].position);
        assert!(world.equals(Point::new(1.0, 1.0), 1e-3), "{:?}", world);
    }

    #[test]
    #[should_panic]
    fn append_into_a_singular_transform_panics() {
        let mut a = Mesh::new();
        a.object_matrix = Transform::scale(0.0, 1.0);
        a.append(&Mesh::from_verts(vec![Vertex::new(1.0, 1.0)]));
    }

    #[test]
    #[should_panic]
    fn append_rejects_mixed_indexing() {
        let mut a = square();
        let b = Mesh::from_verts(vec![Vertex::new(0.0, 0.0)]);
        a.append(&b);
    }

    #[test]
    fn deindex_then_gen_index_keeps_triangles() {
        let mut mesh = square();
        let shapes: Vec<Point> = mesh.idx.iter().map(|&i| mesh.verts[i as usize].position).collect();

        mesh.deindex();
        assert!(mesh.idx.is_empty());
        assert_eq!(mesh.verts.len(), 6);
        mesh.deindex();
        assert_eq!(mesh.verts.len(), 6);

        mesh.gen_index();
        let regenerated: Vec<Point> = mesh.idx.iter().map(|&i| mesh.verts[i as usize].position).collect();
        assert_eq!(shapes, regenerated);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn index16_fails_for_large_meshes() {
        let mut mesh = Mesh::from_verts(vec![Vertex::default(); 70_000]);
        mesh.gen_index();
        assert_eq!(
            mesh.index16(),
            Err(InkError::IndexOverflow { vertex_count: 70_000 })
        );
        assert_eq!(square().index16().unwrap(), vec![0, 1, 2, 0, 3, 2]);
    }

    #[test]
    fn clone_deep_copies_texture() {
        let mut mesh = square();
        mesh.texture = Some(TextureInfo::new("sheet://brush"));
        mesh.shader_metadata = ShaderMetadata::particle(2.0, true);
        let mut copy = mesh.clone();
        copy.texture.as_mut().unwrap().uri.push_str("-copy");
        assert_eq!(mesh.texture.as_ref().unwrap().uri, "sheet://brush");
        assert!(copy.shader_metadata.is_particle() && copy.shader_metadata.is_cycling());
        assert!(!copy.shader_metadata.is_eraser());
    }
}
