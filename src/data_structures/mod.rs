//! Engine data structures: meshes, textures, transforms and scene data.
//!
//! - `mesh` holds the vertex layout and decoded vertex/index streams
//! - `texture` holds decoded texture payloads and their formats
//! - `transform` is the per-entity position, rotation and scale
//! - `camera` produces view/projection matrices and the camera record
//! - `light` holds colours and point lights
//! - `scene` ties entities, camera and lights together

pub mod camera;
pub mod light;
pub mod mesh;
pub mod scene;
pub mod texture;
pub mod transform;
