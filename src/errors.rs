use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InkError {
    #[error("ERR_INDEX_OVERFLOW: {vertex_count} vertices cannot be addressed by 16-bit indices")]
    IndexOverflow { vertex_count: usize },

    #[error("ERR_VERTICES_CLEARED: packed vertices were released from cpu memory")]
    VerticesCleared,

    #[error("ERR_RENDERER: {0}")]
    Renderer(String),
}
