//! Dart-based 2D combinatorial map.
//!
//! A [`CMap2`] represents an oriented surface with two relations over a set
//! of darts:
//!
//! - **phi1** maps a dart to the next dart around its face. Its orbits are
//!   exactly the faces.
//! - **phi2** maps a dart to the dart running along the same edge in the
//!   opposite direction, from the neighbouring face. It is an involution, and
//!   a dart with `phi2(d) == d` is unsewn (an open boundary edge).
//!
//! Each dart also stores the vertex cell it starts from and the face cell of
//! its orbit. Darts and both relations live in flat arrays indexed by
//! [`DartId`]; nothing is linked through pointers.
//!
//! # Boundary Handling
//!
//! [`CMap2::close`] fills every hole with a *boundary face* whose darts are
//! sewn to the open darts. Boundary darts carry an invalid [`FaceId`] and are
//! not counted as faces, so a closed map still reports the same face count as
//! the open surface it came from.

use nalgebra::Point3;

use super::attribute::{Attribute, CellContainer};
use super::index::{DartId, FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A dart: one side of one edge, as seen from one face.
#[derive(Debug, Clone, Copy)]
pub struct Dart<I: MeshIndex = u32> {
    /// The next dart around the face.
    pub phi1: DartId<I>,

    /// The previous dart around the face. Always the inverse of `phi1`.
    pub phi_1: DartId<I>,

    /// The opposite dart across the edge, or the dart itself when unsewn.
    pub phi2: DartId<I>,

    /// The vertex cell this dart starts from.
    pub vertex: VertexId<I>,

    /// The face cell of this dart's orbit. Invalid for boundary darts.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> Dart<I> {
    /// Whether this dart belongs to a boundary face created by hole closing.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// A 2D combinatorial map with vertex and face cells.
#[derive(Debug, Default)]
pub struct CMap2<I: MeshIndex = u32> {
    pub(crate) darts: Vec<Dart<I>>,
    vertices: CellContainer,
    faces: CellContainer,
}

impl<I: MeshIndex> CMap2<I> {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self {
            darts: Vec::new(),
            vertices: CellContainer::new(),
            faces: CellContainer::new(),
        }
    }

    /// Create a map with room for `num_darts` darts.
    pub fn with_capacity(num_darts: usize) -> Self {
        Self {
            darts: Vec::with_capacity(num_darts),
            ..Self::new()
        }
    }

    // ==================== Accessors ====================

    /// Number of darts, boundary darts included.
    #[inline]
    pub fn nb_darts(&self) -> usize {
        self.darts.len()
    }

    /// Number of vertex cells.
    #[inline]
    pub fn nb_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of face cells. Boundary faces are not counted.
    #[inline]
    pub fn nb_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of edges, i.e. of phi2 orbits.
    pub fn nb_edges(&self) -> usize {
        self.darts()
            .filter(|&d| d.index() <= self.phi2(d).index())
            .count()
    }

    /// Number of unsewn darts.
    pub fn nb_boundary_darts(&self) -> usize {
        self.darts().filter(|&d| self.phi2(d) == d).count()
    }

    /// Number of boundary faces, i.e. of holes closed so far.
    pub fn nb_holes(&self) -> usize {
        let mut visited = vec![false; self.nb_darts()];
        let mut holes = 0;
        for d in self.darts() {
            if visited[d.index()] || !self.is_boundary(d) {
                continue;
            }
            holes += 1;
            for e in self.face_darts(d) {
                visited[e.index()] = true;
            }
        }
        holes
    }

    /// Get a dart by ID.
    #[inline]
    pub fn dart(&self, d: DartId<I>) -> &Dart<I> {
        &self.darts[d.index()]
    }

    #[inline]
    fn dart_mut(&mut self, d: DartId<I>) -> &mut Dart<I> {
        &mut self.darts[d.index()]
    }

    /// The vertex cell container, holding every vertex attribute.
    pub fn vertex_cells(&self) -> &CellContainer {
        &self.vertices
    }

    /// Mutable access to the vertex cell container.
    pub fn vertex_cells_mut(&mut self) -> &mut CellContainer {
        &mut self.vertices
    }

    /// The face cell container, holding every face attribute.
    pub fn face_cells(&self) -> &CellContainer {
        &self.faces
    }

    /// Mutable access to the face cell container.
    pub fn face_cells_mut(&mut self) -> &mut CellContainer {
        &mut self.faces
    }

    /// Get the vertex position attribute stored under `name`.
    pub fn positions(&self, name: &str) -> Option<&Attribute<Point3<f64>>> {
        self.vertices.get_attribute(name)
    }

    // ==================== Topology Queries ====================

    /// The next dart around the face.
    #[inline]
    pub fn phi1(&self, d: DartId<I>) -> DartId<I> {
        self.dart(d).phi1
    }

    /// The previous dart around the face.
    #[inline]
    pub fn phi_1(&self, d: DartId<I>) -> DartId<I> {
        self.dart(d).phi_1
    }

    /// The opposite dart across the edge.
    #[inline]
    pub fn phi2(&self, d: DartId<I>) -> DartId<I> {
        self.dart(d).phi2
    }

    /// The vertex cell a dart starts from.
    #[inline]
    pub fn vertex_of(&self, d: DartId<I>) -> VertexId<I> {
        self.dart(d).vertex
    }

    /// The face cell of a dart, invalid for boundary darts.
    #[inline]
    pub fn face_of(&self, d: DartId<I>) -> FaceId<I> {
        self.dart(d).face
    }

    /// Whether a dart belongs to a boundary face.
    #[inline]
    pub fn is_boundary(&self, d: DartId<I>) -> bool {
        self.dart(d).is_boundary()
    }

    /// Whether every dart is sewn.
    pub fn is_closed(&self) -> bool {
        self.darts().all(|d| self.phi2(d) != d)
    }

    // ==================== Iteration ====================

    /// Iterate over all dart IDs.
    pub fn darts(&self) -> impl Iterator<Item = DartId<I>> + '_ {
        (0..self.darts.len()).map(DartId::new)
    }

    /// Iterate over all vertex cell IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices.indices().map(VertexId::new)
    }

    /// Iterate over all face cell IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces.indices().map(FaceId::new)
    }

    /// Iterate over the darts of the face containing `d`, starting at `d`.
    pub fn face_darts(&self, d: DartId<I>) -> FaceDartIter<'_, I> {
        FaceDartIter::new(self, d)
    }

    /// Iterate over the vertex cells around the face containing `d`.
    pub fn face_vertices(&self, d: DartId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_darts(d).map(|e| self.vertex_of(e))
    }

    /// Iterate over the darts leaving the vertex of `d`, turning with
    /// `phi1 ∘ phi2`. The walk stops early at an unsewn dart, so on an
    /// open map it only covers the fan on one side of the boundary.
    pub fn vertex_darts(&self, d: DartId<I>) -> VertexDartIter<'_, I> {
        VertexDartIter::new(self, d)
    }

    /// Number of darts around a face.
    pub fn face_degree(&self, d: DartId<I>) -> usize {
        self.face_darts(d).count()
    }

    // ==================== Construction ====================

    /// Allocate a new vertex cell.
    pub fn add_vertex(&mut self) -> VertexId<I> {
        VertexId::new(self.vertices.new_index())
    }

    fn push_darts(&mut self, n: usize, face: FaceId<I>) -> DartId<I> {
        let first = self.darts.len();
        for i in 0..n {
            let d = DartId::new(first + i);
            self.darts.push(Dart {
                phi1: DartId::new(first + (i + 1) % n),
                phi_1: DartId::new(first + (i + n - 1) % n),
                phi2: d,
                vertex: VertexId::invalid(),
                face,
            });
        }
        DartId::new(first)
    }

    /// Add a face of `n` darts linked in a phi1 cycle and return its first
    /// dart. The darts are unsewn and have no vertex yet.
    pub fn add_face(&mut self, n: usize) -> DartId<I> {
        let face = FaceId::new(self.faces.new_index());
        self.push_darts(n, face)
    }

    /// Set the vertex cell a dart starts from.
    #[inline]
    pub fn set_vertex(&mut self, d: DartId<I>, v: VertexId<I>) {
        self.dart_mut(d).vertex = v;
    }

    /// Sew two unsewn darts along phi2.
    pub fn phi2_sew(&mut self, d: DartId<I>, e: DartId<I>) -> Result<()> {
        for x in [d, e] {
            if self.phi2(x) != x {
                return Err(MeshError::AlreadySewn { dart: x.index() });
            }
        }
        if d == e {
            return Err(MeshError::InvalidState(format!(
                "cannot sew dart {:?} to itself",
                d
            )));
        }
        self.dart_mut(d).phi2 = e;
        self.dart_mut(e).phi2 = d;
        Ok(())
    }

    /// Unsew a dart from its phi2 partner. Does nothing on an unsewn dart.
    pub fn phi2_unsew(&mut self, d: DartId<I>) {
        let e = self.phi2(d);
        self.dart_mut(d).phi2 = d;
        self.dart_mut(e).phi2 = e;
    }

    // ==================== Hole Closing ====================

    /// Close the hole bordered by the unsewn dart `d`.
    ///
    /// Walks the boundary loop through `d`, creates a boundary face with one
    /// dart per loop dart, sews them pairwise and returns the boundary dart
    /// sewn to `d`.
    pub fn close_hole(&mut self, d: DartId<I>) -> Result<DartId<I>> {
        if self.phi2(d) != d {
            return Err(MeshError::AlreadySewn { dart: d.index() });
        }

        let mut boundary = vec![d];
        let mut current = d;
        loop {
            // Turn around the end vertex of `current` to the next unsewn dart.
            let mut e = self.phi1(current);
            while self.phi2(e) != e {
                e = self.phi1(self.phi2(e));
            }
            if e == d {
                break;
            }
            boundary.push(e);
            if boundary.len() > self.darts.len() {
                return Err(MeshError::InvalidState(format!(
                    "boundary loop through {:?} does not close",
                    d
                )));
            }
            current = e;
        }

        // The hole face runs against the loop: phi1(h[i]) = h[i - 1].
        let n = boundary.len();
        let first = self.push_darts(n, FaceId::invalid()).index();
        for (i, &b) in boundary.iter().enumerate() {
            let h = DartId::new(first + i);
            let v = self.vertex_of(self.phi1(b));
            let dart = self.dart_mut(h);
            dart.phi1 = DartId::new(first + (i + n - 1) % n);
            dart.phi_1 = DartId::new(first + (i + 1) % n);
            dart.vertex = v;
            self.phi2_sew(h, b)?;
        }

        Ok(DartId::new(first))
    }

    /// Close every hole of the map and return the number of holes closed.
    pub fn close(&mut self) -> Result<usize> {
        let mut holes = 0;
        for i in 0..self.darts.len() {
            let d = DartId::new(i);
            if self.phi2(d) == d {
                self.close_hole(d)?;
                holes += 1;
            }
        }
        Ok(holes)
    }

    // ==================== Diagnostics ====================

    /// Darts around the vertex of `d`, following both directions of the fan
    /// until the walk wraps around or reaches an unsewn dart.
    fn vertex_fan(&self, d: DartId<I>) -> Vec<DartId<I>> {
        let mut fan: Vec<DartId<I>> = self.vertex_darts(d).collect();
        let mut current = d;
        loop {
            let prev = self.phi_1(current);
            if self.phi2(prev) == prev {
                break;
            }
            current = self.phi2(prev);
            if current == d {
                break;
            }
            fan.push(current);
        }
        fan
    }

    /// Vertex cells whose darts split into more than one fan.
    ///
    /// Such a vertex joins faces that do not form a single disk around it
    /// (two cones touching at their apex, for instance). The cells are only
    /// reported, never split.
    pub fn non_manifold_vertices(&self) -> Vec<VertexId<I>> {
        let mut visited = vec![false; self.nb_darts()];
        let mut fans = vec![0usize; self.vertices.capacity()];
        for d in self.darts() {
            if visited[d.index()] {
                continue;
            }
            for e in self.vertex_fan(d) {
                visited[e.index()] = true;
            }
            let v = self.vertex_of(d);
            if v.is_valid() {
                fans[v.index()] += 1;
            }
        }
        fans.iter()
            .enumerate()
            .filter(|&(_, &count)| count > 1)
            .map(|(i, _)| VertexId::new(i))
            .collect()
    }

    /// Euler characteristic `V - E + F`, boundary faces excluded.
    pub fn euler_characteristic(&self) -> i64 {
        self.nb_vertices() as i64 - self.nb_edges() as i64 + self.nb_faces() as i64
    }

    // ==================== Validation ====================

    /// Check that phi1 is a permutation with inverse phi_1, phi2 is an
    /// involution, every dart has a vertex, and sewn darts agree on the
    /// vertices of their edge.
    pub fn is_valid(&self) -> bool {
        for d in self.darts() {
            let dart = self.dart(d);
            if self.phi_1(dart.phi1) != d || self.phi1(dart.phi_1) != d {
                return false;
            }
            if self.phi2(dart.phi2) != d {
                return false;
            }
            if !self.vertices.is_active(dart.vertex.index()) {
                return false;
            }
            if self.face_of(dart.phi1) != dart.face {
                return false;
            }
            if dart.phi2 != d {
                if self.vertex_of(dart.phi2) != self.vertex_of(dart.phi1) {
                    return false;
                }
                if dart.is_boundary() && self.is_boundary(dart.phi2) {
                    return false;
                }
            }
        }
        true
    }
}

/// Iterator over the darts of a face.
pub struct FaceDartIter<'a, I: MeshIndex = u32> {
    map: &'a CMap2<I>,
    start: DartId<I>,
    current: DartId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceDartIter<'a, I> {
    fn new(map: &'a CMap2<I>, d: DartId<I>) -> Self {
        Self {
            map,
            start: d,
            current: d,
            done: !d.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceDartIter<'a, I> {
    type Item = DartId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.map.phi1(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the darts leaving a vertex.
pub struct VertexDartIter<'a, I: MeshIndex = u32> {
    map: &'a CMap2<I>,
    start: DartId<I>,
    current: DartId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexDartIter<'a, I> {
    fn new(map: &'a CMap2<I>, d: DartId<I>) -> Self {
        Self {
            map,
            start: d,
            current: d,
            done: !d.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexDartIter<'a, I> {
    type Item = DartId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If d goes v -> w, phi2(d) goes w -> v and phi1(phi2(d)) leaves v again.
        let opposite = self.map.phi2(self.current);
        if opposite == self.current {
            self.done = true;
            return Some(result);
        }
        self.current = self.map.phi1(opposite);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a face over the given vertex cells.
    fn face(map: &mut CMap2, vertices: &[VertexId]) -> DartId {
        let first = map.add_face(vertices.len());
        let darts: Vec<DartId> = map.face_darts(first).collect();
        for (&d, &v) in darts.iter().zip(vertices) {
            map.set_vertex(d, v);
        }
        first
    }

    #[test]
    fn test_empty_map() {
        let map = CMap2::<u32>::new();
        assert_eq!(map.nb_darts(), 0);
        assert_eq!(map.nb_faces(), 0);
        assert!(map.is_valid());
        assert!(map.is_closed());
    }

    #[test]
    fn test_cell_ids_and_face_attributes() {
        let mut map = CMap2::<u32>::with_capacity(8);
        let vs: Vec<VertexId> = (0..4).map(|_| map.add_vertex()).collect();
        let a = face(&mut map, &[vs[0], vs[1], vs[2]]);
        let b = face(&mut map, &[vs[2], vs[1], vs[3]]);

        assert_eq!(map.vertex_ids().collect::<Vec<_>>(), vs);
        assert_eq!(
            map.face_ids().collect::<Vec<_>>(),
            vec![map.face_of(a), map.face_of(b)]
        );

        let area = map.face_cells_mut().add_attribute::<f64>("area").unwrap();
        area[1] = 0.5;
        let area = map.face_cells().get_attribute::<f64>("area").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area[map.face_of(b).index()], 0.5);

        // Boundary faces get no face cell.
        map.close().unwrap();
        assert_eq!(map.face_ids().count(), 2);
    }

    #[test]
    fn test_add_face_builds_cycle() {
        let mut map = CMap2::<u32>::new();
        let vs: Vec<VertexId> = (0..4).map(|_| map.add_vertex()).collect();
        let d = face(&mut map, &vs);

        assert_eq!(map.nb_darts(), 4);
        assert_eq!(map.face_degree(d), 4);
        assert_eq!(map.face_vertices(d).collect::<Vec<_>>(), vs);
        assert_eq!(map.phi_1(d), DartId::new(3));
        assert_eq!(map.nb_boundary_darts(), 4);
        assert!(map.is_valid());
    }

    #[test]
    fn test_sew_and_unsew() {
        let mut map = CMap2::<u32>::new();
        let vs: Vec<VertexId> = (0..4).map(|_| map.add_vertex()).collect();
        let a = face(&mut map, &[vs[0], vs[1], vs[2]]);
        let b = face(&mut map, &[vs[2], vs[1], vs[3]]);

        // a+1 runs 1 -> 2, b runs 2 -> 1
        let a12 = map.phi1(a);
        map.phi2_sew(a12, b).unwrap();
        assert_eq!(map.phi2(a12), b);
        assert_eq!(map.phi2(b), a12);
        assert!(map.is_valid());

        assert_eq!(
            map.phi2_sew(a12, map.phi1(b)),
            Err(MeshError::AlreadySewn { dart: a12.index() })
        );

        map.phi2_unsew(b);
        assert_eq!(map.phi2(a12), a12);
        assert_eq!(map.phi2(b), b);
    }

    #[test]
    fn test_close_single_triangle() {
        let mut map = CMap2::<u32>::new();
        let vs: Vec<VertexId> = (0..3).map(|_| map.add_vertex()).collect();
        face(&mut map, &vs);

        assert_eq!(map.close().unwrap(), 1);
        assert_eq!(map.nb_darts(), 6);
        assert_eq!(map.nb_faces(), 1);
        assert_eq!(map.nb_holes(), 1);
        assert_eq!(map.nb_edges(), 3);
        assert!(map.is_closed());
        assert!(map.is_valid());
        assert_eq!(map.euler_characteristic(), 1);

        // The boundary face runs the triangle backwards.
        let h = DartId::new(3);
        assert!(map.is_boundary(h));
        assert_eq!(
            map.face_vertices(h).collect::<Vec<_>>(),
            vec![vs[1], vs[0], vs[2]]
        );
    }

    #[test]
    fn test_close_hole_rejects_sewn_dart() {
        let mut map = CMap2::<u32>::new();
        let vs: Vec<VertexId> = (0..3).map(|_| map.add_vertex()).collect();
        let d = face(&mut map, &vs);
        let h = map.close_hole(d).unwrap();
        assert_eq!(map.phi2(h), d);
        assert!(map.close_hole(d).is_err());
    }

    #[test]
    fn test_vertex_darts_on_closed_map() {
        let mut map = CMap2::<u32>::new();
        let vs: Vec<VertexId> = (0..3).map(|_| map.add_vertex()).collect();
        let d = face(&mut map, &vs);
        map.close().unwrap();

        let around: Vec<DartId> = map.vertex_darts(d).collect();
        assert_eq!(around.len(), 2);
        assert!(around.iter().all(|&e| map.vertex_of(e) == vs[0]));
        assert!(map.non_manifold_vertices().is_empty());
    }
}
