//! Core mesh data structures.
//!
//! Two surface representations are provided, both backed by flat arrays and
//! named per-cell attributes:
//!
//! - [`CMap2`], a 2D combinatorial map where darts are linked by the `phi1`
//!   (next in face) and `phi2` (opposite) relations;
//! - [`IncidenceGraph`], where vertices, edges and faces are explicit cells
//!   holding lists of their incident cells.
//!
//! # Index Types
//!
//! Cells are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex cell
//! - [`DartId`] - Identifies a dart of a combinatorial map
//! - [`FaceId`] - Identifies a face cell
//! - [`EdgeId`] - Identifies an edge of an incidence graph
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! Containers are normally filled by the importers in [`crate::io`], but can
//! be built by hand:
//!
//! ```
//! use meshstitch::mesh::{CMap2, VertexId};
//!
//! let mut map: CMap2 = CMap2::new();
//! let vertices: Vec<VertexId> = (0..3).map(|_| map.add_vertex()).collect();
//!
//! let d = map.add_face(3);
//! let darts: Vec<_> = map.face_darts(d).collect();
//! for (&dart, &v) in darts.iter().zip(&vertices) {
//!     map.set_vertex(dart, v);
//! }
//!
//! assert_eq!(map.close().unwrap(), 1);
//! assert!(map.is_valid());
//! ```

mod attribute;
mod cmap;
mod incidence_graph;
mod index;

pub use attribute::{Attribute, CellContainer};
pub use cmap::{CMap2, Dart, FaceDartIter, VertexDartIter};
pub use incidence_graph::IncidenceGraph;
pub use index::{DartId, EdgeId, FaceId, MeshIndex, VertexId};
