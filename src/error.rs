//! Error types for the geometry core.
//!
//! Every variant is a broken caller contract (bad face index, UV layer out of
//! step with the face list, a missing prerequisite). Benign degenerate input
//! such as a zero-area triangle never produces an error.

use thiserror::Error;

/// Errors raised when a [`Geometry`](crate::gfx::geometry::Geometry) breaks one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the geometry has {vertex_count} vertices")]
    FaceIndexOutOfBounds {
        /// Face position in the face list.
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the geometry.
        vertex_count: usize,
    },

    /// A UV layer does not have one entry per face.
    #[error("uv layer {layer} has {uvs} entries but the geometry has {faces} faces")]
    UvLayerLength {
        /// UV layer number.
        layer: usize,
        /// Number of faces.
        faces: usize,
        /// Number of per-face UV lists in the layer.
        uvs: usize,
    },

    /// A face's UV list does not have one coordinate per corner.
    #[error("uv layer {layer}, face {face}: expected {expected} coordinates, found {actual}")]
    UvCornerCount {
        /// UV layer number.
        layer: usize,
        /// Face position in the face list.
        face: usize,
        /// Corner count of the face.
        expected: usize,
        /// Coordinates present.
        actual: usize,
    },

    /// Tangents need UV layer 0.
    #[error("uv layer 0 is required to compute tangents")]
    MissingUvLayer,

    /// Tangents need per-corner vertex normals.
    #[error("face {face} has no vertex normals; compute vertex normals before tangents")]
    MissingVertexNormals {
        /// Face position in the face list.
        face: usize,
    },

    /// The geometry is flagged as having tangents but a face lacks them.
    #[error("face {face} has no vertex tangents; recompute tangents after adding faces")]
    MissingTangents {
        /// Face position in the face list.
        face: usize,
    },

    /// A morph target is not the same length as the vertex list.
    #[error("morph target '{name}' has {actual} vertices, expected {expected}")]
    MorphTargetLength {
        /// Morph target name.
        name: String,
        /// Vertex count of the geometry.
        expected: usize,
        /// Vertex count of the morph target.
        actual: usize,
    },

    /// Skin weights or indices do not match the vertex list.
    #[error("skin data must have {expected} entries, found {weights} weights and {indices} indices")]
    SkinDataLength {
        /// Vertex count of the geometry.
        expected: usize,
        /// Number of skin weights.
        weights: usize,
        /// Number of skin indices.
        indices: usize,
    },

    /// No material could be resolved for a chunk.
    #[error("no material available for material index {material_index:?}")]
    MissingMaterial {
        /// Material index of the chunk.
        material_index: Option<usize>,
    },

    /// Morph normals were requested before they were computed.
    #[error("morph normals for target {target} have not been computed")]
    MissingMorphNormals {
        /// Morph target position.
        target: usize,
    },

    /// Buffers were requested before the geometry was partitioned.
    #[error("geometry has not been partitioned into groups")]
    GroupsNotPartitioned,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeometryError>;
