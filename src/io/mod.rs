//! Building meshes from polygon soups.
//!
//! Format readers (OBJ, PLY, ...) fill a [`SurfaceImportData`] with raw
//! positions and face index lists; this module turns that package into a
//! topological mesh:
//!
//! - [`import_surface_data`] builds a [`CMap2`](crate::mesh::CMap2), sewing
//!   faces along shared edges and closing holes;
//! - [`import_surface_graph`] builds an
//!   [`IncidenceGraph`](crate::mesh::IncidenceGraph) with deduplicated edges.
//!
//! # Usage
//!
//! ```
//! use meshstitch::io::{import_surface_data, ImportOptions, SurfaceImportData};
//! use meshstitch::mesh::CMap2;
//! use nalgebra::Point3;
//!
//! let mut data = SurfaceImportData::new("position");
//! data.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! data.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! data.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! data.add_face(&[0, 1, 2]);
//!
//! let mut map: CMap2 = CMap2::new();
//! let report = import_surface_data(&mut map, &mut data, &ImportOptions::default()).unwrap();
//!
//! assert_eq!(map.nb_faces(), 1);
//! assert_eq!(report.boundary_edges, 3);
//! assert_eq!(report.holes_closed, 1);
//! assert_eq!(data.vertex_id_after_import.len(), 3);
//! ```

mod surface_import;

pub use surface_import::{import_surface_data, import_surface_graph};

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, VertexId};
use crate::progress::Progress;

/// Name used for the position attribute when none is given.
pub const DEFAULT_POSITION_ATTRIBUTE: &str = "position";

/// Raw surface data as produced by a file reader.
///
/// Faces are stored flat: face `i` uses the next `faces_nb_vertices[i]`
/// entries of `faces_vertex_indices`. Indices refer to `vertex_position`.
#[derive(Debug, Clone)]
pub struct SurfaceImportData<I: MeshIndex = u32> {
    /// Vertex positions, in input order.
    pub vertex_position: Vec<Point3<f64>>,

    /// Name of the vertex attribute that receives the positions.
    pub vertex_position_attribute_name: String,

    /// Number of vertices of each face.
    pub faces_nb_vertices: Vec<usize>,

    /// Vertex references of all faces, concatenated.
    pub faces_vertex_indices: Vec<usize>,

    /// Filled by the importers: the vertex cell created for each input
    /// vertex, in input order.
    pub vertex_id_after_import: Vec<VertexId<I>>,
}

impl<I: MeshIndex> Default for SurfaceImportData<I> {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_ATTRIBUTE)
    }
}

impl<I: MeshIndex> SurfaceImportData<I> {
    /// Create an empty package storing positions under `position_attribute`.
    pub fn new(position_attribute: &str) -> Self {
        Self {
            vertex_position: Vec::new(),
            vertex_position_attribute_name: position_attribute.to_string(),
            faces_nb_vertices: Vec::new(),
            faces_vertex_indices: Vec::new(),
            vertex_id_after_import: Vec::new(),
        }
    }

    /// Create a package from positions and a list of faces.
    pub fn from_polygons<F: AsRef<[usize]>>(
        position_attribute: &str,
        positions: &[Point3<f64>],
        faces: &[F],
    ) -> Self {
        let mut data = Self::new(position_attribute);
        data.reserve(positions.len(), faces.len());
        data.vertex_position.extend_from_slice(positions);
        for face in faces {
            data.add_face(face.as_ref());
        }
        data
    }

    /// Reserve room for more vertices and faces.
    pub fn reserve(&mut self, nb_vertices: usize, nb_faces: usize) {
        self.vertex_position.reserve(nb_vertices);
        self.vertex_id_after_import.reserve(nb_vertices);
        self.faces_nb_vertices.reserve(nb_faces);
        self.faces_vertex_indices.reserve(nb_faces * 4);
    }

    /// Number of input vertices.
    #[inline]
    pub fn nb_vertices(&self) -> usize {
        self.vertex_position.len()
    }

    /// Number of input faces, degenerate ones included.
    #[inline]
    pub fn nb_faces(&self) -> usize {
        self.faces_nb_vertices.len()
    }

    /// Append a vertex and return its input index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.vertex_position.push(position);
        self.vertex_position.len() - 1
    }

    /// Append a face given by input vertex indices.
    pub fn add_face(&mut self, vertices: &[usize]) {
        self.faces_nb_vertices.push(vertices.len());
        self.faces_vertex_indices.extend_from_slice(vertices);
    }

    /// Iterate over the index window of each face.
    pub fn faces(&self) -> impl Iterator<Item = &[usize]> + '_ {
        let mut offset = 0;
        self.faces_nb_vertices.iter().map(move |&n| {
            let window = &self.faces_vertex_indices[offset..offset + n];
            offset += n;
            window
        })
    }

    /// Check the structural preconditions of an import.
    ///
    /// The face counts must add up to the index sequence length, every index
    /// must refer to an input vertex, and the output buffer must be empty.
    pub fn validate(&self) -> Result<()> {
        // A sum past usize::MAX can never match the index sequence.
        let expected = self
            .faces_nb_vertices
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n));
        if expected != Some(self.faces_vertex_indices.len()) {
            return Err(MeshError::IndexCountMismatch {
                expected: expected.unwrap_or(usize::MAX),
                actual: self.faces_vertex_indices.len(),
            });
        }

        for (face, window) in self.faces().enumerate() {
            if let Some(&vertex) = window.iter().find(|&&v| v >= self.nb_vertices()) {
                return Err(MeshError::InvalidVertexIndex { face, vertex });
            }
        }

        if !self.vertex_id_after_import.is_empty() {
            return Err(MeshError::OutputBufferNotEmpty {
                len: self.vertex_id_after_import.len(),
            });
        }
        Ok(())
    }

    /// Remove all vertices, faces and import results.
    pub fn clear(&mut self) {
        self.vertex_position.clear();
        self.faces_nb_vertices.clear();
        self.faces_vertex_indices.clear();
        self.vertex_id_after_import.clear();
    }
}

/// Options for the importers.
#[derive(Debug)]
pub struct ImportOptions {
    /// Whether to close the holes of the combinatorial map (default: true).
    /// Has no effect on incidence graph imports.
    pub close_holes: bool,

    /// Progress reporting for the import phases.
    pub progress: Option<Progress>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self {
            close_holes: true,
            progress: None,
        }
    }

    /// Set whether to close holes after sewing.
    pub fn with_close_holes(mut self, close_holes: bool) -> Self {
        self.close_holes = close_holes;
        self
    }

    /// Leave boundary darts unsewn.
    pub fn keep_holes_open(mut self) -> Self {
        self.close_holes = false;
        self
    }

    /// Set a progress callback.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub(crate) fn report(&self, current: usize, total: usize, message: &str) {
        if let Some(progress) = &self.progress {
            progress.report(current, total, message);
        }
    }
}

/// Summary of a combinatorial map import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Faces kept and threaded into the map.
    pub faces_imported: usize,

    /// Faces dropped because fewer than three distinct vertices remained.
    pub faces_skipped: usize,

    /// Darts left without an opposite after sewing.
    pub boundary_edges: usize,

    /// Boundary faces created to close holes.
    pub holes_closed: usize,

    /// Darts whose reverse edge was already sewn to another dart.
    pub non_manifold_edges: usize,

    /// Set when at least one non-manifold edge was met while sewing.
    pub non_manifold_detected: bool,

    /// Vertex cells whose darts form more than one fan.
    pub non_manifold_vertices: usize,
}

impl ImportReport {
    /// Whether the input formed a closed 2-manifold.
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edges == 0 && !self.non_manifold_detected && self.non_manifold_vertices == 0
    }
}

/// Summary of an incidence graph import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphImportReport {
    /// Faces added to the graph.
    pub faces_imported: usize,

    /// Faces dropped because fewer than three distinct vertices remained.
    pub faces_skipped: usize,

    /// Edges created.
    pub edges_created: usize,

    /// Face sides that reused an existing edge.
    pub edges_reused: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_data() -> SurfaceImportData {
        let mut data = SurfaceImportData::new("position");
        data.add_vertex(Point3::new(0.0, 0.0, 0.0));
        data.add_vertex(Point3::new(1.0, 0.0, 0.0));
        data.add_vertex(Point3::new(0.0, 1.0, 0.0));
        data.add_face(&[0, 1, 2]);
        data
    }

    #[test]
    fn test_faces_windows() {
        let data: SurfaceImportData = SurfaceImportData::from_polygons(
            "p",
            &[Point3::origin(); 5],
            &[vec![0usize, 1, 2], vec![1, 3, 4, 2]],
        );
        let faces: Vec<&[usize]> = data.faces().collect();
        let expected: Vec<&[usize]> = vec![&[0, 1, 2], &[1, 3, 4, 2]];
        assert_eq!(faces, expected);
        assert_eq!(data.nb_faces(), 2);
        assert_eq!(data.nb_vertices(), 5);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_validate_count_mismatch() {
        let mut data = triangle_data();
        data.faces_nb_vertices.push(4);
        assert_eq!(
            data.validate(),
            Err(MeshError::IndexCountMismatch {
                expected: 7,
                actual: 3
            })
        );
    }

    #[test]
    fn test_validate_count_sum_overflow() {
        let mut data = triangle_data();
        data.faces_vertex_indices.clear();
        data.faces_nb_vertices = vec![usize::MAX, 1];
        assert_eq!(
            data.validate(),
            Err(MeshError::IndexCountMismatch {
                expected: usize::MAX,
                actual: 0
            })
        );
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mut data = triangle_data();
        data.add_face(&[0, 2, 3]);
        assert_eq!(
            data.validate(),
            Err(MeshError::InvalidVertexIndex { face: 1, vertex: 3 })
        );
    }

    #[test]
    fn test_validate_output_buffer() {
        let mut data = triangle_data();
        data.vertex_id_after_import.push(VertexId::new(0));
        assert_eq!(data.validate(), Err(MeshError::OutputBufferNotEmpty { len: 1 }));

        data.clear();
        assert_eq!(data.nb_vertices(), 0);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = ImportOptions::new();
        assert!(options.close_holes);
        assert!(!options.keep_holes_open().close_holes);
        assert!(ImportOptions::new().with_close_holes(false).progress.is_none());
    }
}
