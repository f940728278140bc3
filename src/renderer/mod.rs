//! WebGPU rendering module
//!
//! Draws a game's `Canvas` as flat-colored triangles, letterboxed into the
//! surface.

pub mod pipeline;
pub mod tessellate;

pub use pipeline::RenderState;
pub use tessellate::{Vertex, Viewport, tessellate};
