//! CPU-side surface extraction from chunk density fields.
#![forbid(unsafe_code)]

mod mesh_build;
mod surface;

pub use mesh_build::MeshBuild;
pub use surface::build_chunk_mesh;
