#[macro_use]
extern crate bitflags;

mod color;
mod errors;
mod fat_line;
mod line_mesh;
mod math;
mod mesh;
mod optimized_mesh;
mod packed;
pub mod renderer;
mod tip;
mod vertex;

pub use color::*;
pub use errors::*;
pub use fat_line::*;
pub use line_mesh::{build_line_mesh, build_multi_line_mesh};
pub use math::*;
pub use mesh::{Mesh, ShaderFlags, ShaderMetadata, TextureInfo};
pub use optimized_mesh::{IndexBuffer, OptimizedMesh, ShaderType};
pub use packed::{calc_transform_for_format, PackedVertList, VertFormat};
pub use renderer::MeshRenderer;
pub use tip::*;
pub use vertex::*;
