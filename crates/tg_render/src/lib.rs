pub mod camera;
pub mod gpu_context;
pub mod mesh;
pub mod shading;
pub mod shape_pipeline;
pub mod vertex;

pub use camera::{CameraUniform, ScreenCamera};
pub use gpu_context::GpuContext;
pub use mesh::{CircleShape, DrawBatch, ParticleShape, ShapeMesh};
pub use shape_pipeline::ShapePipeline;
pub use vertex::ShapeVertex;
