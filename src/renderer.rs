pub use crate::*;

/// The only interface a drawing backend sees. Backends limited to 16-bit
/// indices go through [`OptimizedMesh::index16`] and propagate its error.
pub trait MeshRenderer {
    fn draw_mesh(&mut self, mesh: &OptimizedMesh) -> Result<(), InkError>;

    fn draw_meshes(&mut self, meshes: &[OptimizedMesh]) -> Result<(), InkError> {
        for mesh in meshes {
            self.draw_mesh(mesh)?;
        }
        Ok(())
    }
}
