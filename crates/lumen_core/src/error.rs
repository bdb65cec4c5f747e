//! Errors raised while building a scene.
//!
//! The rendering core itself has no error taxonomy; only scene assembly can
//! fail, and callers are expected to report and skip the offending item.

use thiserror::Error;

/// Errors that can occur while adding geometry to a [`crate::Scene`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Unknown polyhedron type: {0}")]
    UnknownPolyhedronType(usize),

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}
