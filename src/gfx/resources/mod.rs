// src/gfx/resources/mod.rs
//! Render resources
//!
//! Materials and the capability flags that decide which attribute arrays a
//! mesh chunk uploads.

pub mod material;

pub use material::{Material, MaterialCapabilities, Shading, VertexColors};
