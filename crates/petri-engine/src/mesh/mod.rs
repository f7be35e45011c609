//! CPU-side sphere geometry.
//!
//! Responsibilities:
//! - tessellate latitude/longitude spheres (`sphere`)
//! - derive triangle and wireframe index lists (`topology`)
//! - pack many spheres into one shared vertex/index buffer (`buffer`)
//!
//! Nothing here touches the GPU; `render::sphere` uploads the packed data.

mod buffer;
mod error;
mod sphere;
mod tag;
mod topology;

pub use buffer::{SphereBuffer, SphereHandle, SphereLayout, VertexRecord, VERTEX_STRIDE};
pub use error::MeshError;
pub use sphere::{build_sphere, point_on_sphere, vertices_per_sphere, SpherePoint, MIN_LONG_STEPS};
pub use tag::{GridPos, SphereKind, TagRules, VertexTag};
pub use topology::{
    build_line_indices, build_triangle_indices, line_index_count, triangle_index_capacity,
    triangle_index_count,
};
