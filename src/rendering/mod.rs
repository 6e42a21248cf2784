pub mod context;

// Re-export main types
pub use context::{LineRenderStyle, PointRenderStyle, Primitive, RenderContext};
