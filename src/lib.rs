//! defer-ngin
//!
//! The core of a deferred renderer that streams scene resources into
//! device memory. Meshes, materials and textures live in resource tables
//! backed by growable device buffers; per-frame data goes through frame
//! rings so the CPU never overwrites what an in-flight frame still reads;
//! and every entity of a frame is drawn with a single indirect draw.
//!
//! High-level modules
//! - `buffers`: growable device blocks, CPU mirrors and frame rings
//! - `commands`: indirect draw command generation
//! - `config`: renderer configuration
//! - `context`: window, surface and device setup
//! - `data_structures`: meshes, textures, transforms, camera, lights, scenes
//! - `device`: the graphics device seam with a wgpu and a host backend
//! - `events`: the bounded window event queue
//! - `flow`: application shell and event loop
//! - `pipelines`: geometry, lighting and present pipelines
//! - `render`: render targets, frame data and the deferred renderer
//! - `resources`: loading files and shader sources
//! - `tables`: mesh, material and texture tables
//!

pub mod buffers;
pub mod commands;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod device;
pub mod events;
pub mod fatal;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod tables;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use config::RenderConfig;
pub use winit::event::WindowEvent;
