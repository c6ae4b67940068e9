//! # Meshstitch
//!
//! Surface topology from polygon soups.
//!
//! File readers produce flat lists of positions and face vertex indices.
//! Meshstitch turns such a list into a connected surface representation:
//!
//! - a dart-based 2D combinatorial map ([`mesh::CMap2`]), with faces sewn
//!   along shared edges and holes closed by boundary faces;
//! - a vertex/edge/face incidence graph ([`mesh::IncidenceGraph`]) with one
//!   edge per pair of adjacent vertices.
//!
//! Non-manifold edges and vertices are detected and reported, never
//! repaired.
//!
//! ## Features
//!
//! - **Arena storage**: darts and cells are dense indices into flat arrays
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Named attributes**: per-cell values looked up by name and type
//! - **Diagnostics**: import reports with boundary and non-manifold counts
//!
//! ## Quick Start
//!
//! ```
//! use meshstitch::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0usize, 2, 1], // bottom
//!     [0, 1, 3],      // front
//!     [1, 2, 3],      // right
//!     [2, 0, 3],      // left
//! ];
//!
//! let mut data = SurfaceImportData::from_polygons("position", &positions, &faces);
//! let mut map: CMap2 = CMap2::new();
//! let report = import_surface_data(&mut map, &mut data, &ImportOptions::default()).unwrap();
//!
//! assert!(report.is_closed_manifold());
//! assert_eq!(map.nb_faces(), 4);
//! assert_eq!(map.euler_characteristic(), 2);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use meshstitch::prelude::*;
//! use nalgebra::Point3;
//!
//! # let positions = vec![Point3::origin(); 3];
//! # let mut data = SurfaceImportData::from_polygons("position", &positions, &[[0usize, 1, 2]]);
//! # let mut map: CMap2 = CMap2::new();
//! # import_surface_data(&mut map, &mut data, &ImportOptions::default()).unwrap();
//! let d = DartId::new(0);
//!
//! // Vertices around the face of a dart
//! for v in map.face_vertices(d) {
//!     println!("Vertex: {:?}", v);
//! }
//!
//! // Darts leaving the same vertex
//! for e in map.vertex_darts(d) {
//!     println!("Dart {:?} -> face {:?}", e, map.face_of(e));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod progress;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshstitch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::io::{
        import_surface_data, import_surface_graph, ImportOptions, ImportReport, SurfaceImportData,
    };
    pub use crate::mesh::{CMap2, DartId, EdgeId, FaceId, IncidenceGraph, MeshIndex, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
