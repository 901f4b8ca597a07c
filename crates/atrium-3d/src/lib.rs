pub mod depth;
pub mod model;
pub mod pipeline;
pub mod render;

pub use depth::create_depth;
pub use model::{Aabb, GpuMesh, Material, Model, Vertex, create_model_ubo};
pub use pipeline::{Layouts, create_bind_group_layouts, create_pipeline};
pub use render::Renderer3D;
