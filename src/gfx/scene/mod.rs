//! # Scene Module
//!
//! Renderable objects built on top of the geometry core.
//!
//! - [`Mesh`] - A geometry plus its material, with the chunk buffer lifecycle
//! - [`MeshMaterial`] - One material for the whole mesh, or one per face
//!
//! ## Usage
//!
//! ```rust
//! use facet3d::gfx::geometry::generate_cube;
//! use facet3d::gfx::rendering::HeadlessBackend;
//! use facet3d::gfx::resources::Material;
//! use facet3d::gfx::scene::{Mesh, MeshMaterial};
//! use facet3d::performance::RenderInfo;
//!
//! let mut backend = HeadlessBackend::new();
//! let mut info = RenderInfo::new();
//!
//! let mut mesh = Mesh::new(generate_cube(1.0).unwrap(), MeshMaterial::Single(Material::default()));
//! mesh.init_buffers(&mut backend, &mut info).unwrap();
//! mesh.set_buffers(&mut backend).unwrap();
//!
//! let commands = mesh.render(&mut info).unwrap();
//! assert_eq!(commands.len(), 1);
//! ```

pub mod mesh;

// Re-export main types
pub use mesh::{Mesh, MeshMaterial, MorphState};
