//! Incidence graph of vertices, edges and faces.
//!
//! Unlike [`CMap2`](super::CMap2), the incidence graph stores cells as
//! explicit objects and their incidences as lists:
//!
//! - a vertex knows its incident edges;
//! - an edge knows its two vertices and every incident face;
//! - a face knows its edges, ordered so consecutive edges share a vertex.
//!
//! An edge may be shared by any number of faces, so non-manifold surfaces
//! (fins, books of faces around one edge) are represented as they are.

use nalgebra::Point3;

use super::attribute::{Attribute, CellContainer};
use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A vertex/edge/face incidence graph.
#[derive(Debug, Default)]
pub struct IncidenceGraph<I: MeshIndex = u32> {
    vertices: CellContainer,
    edges: CellContainer,
    faces: CellContainer,
    vertex_incident_edges: Vec<Vec<EdgeId<I>>>,
    edge_incident_vertices: Vec<[VertexId<I>; 2]>,
    edge_incident_faces: Vec<Vec<FaceId<I>>>,
    face_incident_edges: Vec<Vec<EdgeId<I>>>,
    face_incident_vertices: Vec<Vec<VertexId<I>>>,
}

/// Put `value` at `index`, growing the slot array if needed.
fn store<T>(slots: &mut Vec<T>, index: usize, value: T) {
    if index < slots.len() {
        slots[index] = value;
    } else {
        debug_assert_eq!(index, slots.len());
        slots.push(value);
    }
}

impl<I: MeshIndex> IncidenceGraph<I> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            vertices: CellContainer::new(),
            edges: CellContainer::new(),
            faces: CellContainer::new(),
            vertex_incident_edges: Vec::new(),
            edge_incident_vertices: Vec::new(),
            edge_incident_faces: Vec::new(),
            face_incident_edges: Vec::new(),
            face_incident_vertices: Vec::new(),
        }
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn nb_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[inline]
    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn nb_faces(&self) -> usize {
        self.faces.len()
    }

    /// The vertex cell container, holding every vertex attribute.
    pub fn vertex_cells(&self) -> &CellContainer {
        &self.vertices
    }

    /// Mutable access to the vertex cell container.
    pub fn vertex_cells_mut(&mut self) -> &mut CellContainer {
        &mut self.vertices
    }

    /// The edge cell container.
    pub fn edge_cells(&self) -> &CellContainer {
        &self.edges
    }

    /// The face cell container.
    pub fn face_cells(&self) -> &CellContainer {
        &self.faces
    }

    /// Get the vertex position attribute stored under `name`.
    pub fn positions(&self, name: &str) -> Option<&Attribute<Point3<f64>>> {
        self.vertices.get_attribute(name)
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices.indices().map(VertexId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edges.indices().map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces.indices().map(FaceId::new)
    }

    // ==================== Incidence Queries ====================

    /// The two vertices of an edge, in creation order.
    #[inline]
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        self.edge_incident_vertices[e.index()]
    }

    /// Faces incident to an edge.
    #[inline]
    pub fn edge_faces(&self, e: EdgeId<I>) -> &[FaceId<I>] {
        &self.edge_incident_faces[e.index()]
    }

    /// Edges incident to a vertex.
    #[inline]
    pub fn vertex_edges(&self, v: VertexId<I>) -> &[EdgeId<I>] {
        &self.vertex_incident_edges[v.index()]
    }

    /// Edges of a face, in cycle order.
    #[inline]
    pub fn face_edges(&self, f: FaceId<I>) -> &[EdgeId<I>] {
        &self.face_incident_edges[f.index()]
    }

    /// Vertices of a face, in cycle order. `face_vertices(f)[i]` and
    /// `face_vertices(f)[i + 1]` are the endpoints of `face_edges(f)[i]`.
    #[inline]
    pub fn face_vertices(&self, f: FaceId<I>) -> &[VertexId<I>] {
        &self.face_incident_vertices[f.index()]
    }

    /// Find an edge joining two vertices, in either direction.
    pub fn find_edge(&self, v0: VertexId<I>, v1: VertexId<I>) -> Option<EdgeId<I>> {
        self.vertex_edges(v0).iter().copied().find(|&e| {
            let [a, b] = self.edge_vertices(e);
            (a == v0 && b == v1) || (a == v1 && b == v0)
        })
    }

    /// Edges shared by more than two faces.
    pub fn non_manifold_edges(&self) -> Vec<EdgeId<I>> {
        self.edge_ids()
            .filter(|&e| self.edge_faces(e).len() > 2)
            .collect()
    }

    /// Edges with exactly one incident face.
    pub fn boundary_edges(&self) -> Vec<EdgeId<I>> {
        self.edge_ids()
            .filter(|&e| self.edge_faces(e).len() == 1)
            .collect()
    }

    // ==================== Construction ====================

    /// Add an isolated vertex.
    pub fn add_vertex(&mut self) -> VertexId<I> {
        let index = self.vertices.new_index();
        store(&mut self.vertex_incident_edges, index, Vec::new());
        VertexId::new(index)
    }

    /// Add an edge between two existing vertices.
    ///
    /// No deduplication happens here: adding the same pair twice creates two
    /// parallel edges.
    pub fn add_edge(&mut self, v0: VertexId<I>, v1: VertexId<I>) -> Result<EdgeId<I>> {
        for v in [v0, v1] {
            if !self.vertices.is_active(v.index()) {
                return Err(MeshError::InvalidState(format!("{:?} does not exist", v)));
            }
        }
        if v0 == v1 {
            return Err(MeshError::InvalidState(format!(
                "cannot add a loop edge on {:?}",
                v0
            )));
        }

        let index = self.edges.new_index();
        let e = EdgeId::new(index);
        store(&mut self.edge_incident_vertices, index, [v0, v1]);
        store(&mut self.edge_incident_faces, index, Vec::new());
        self.vertex_incident_edges[v0.index()].push(e);
        self.vertex_incident_edges[v1.index()].push(e);
        Ok(e)
    }

    /// Walk `edges` in the given order from `start`, leaving through `current`.
    fn walk_cycle(
        &self,
        edges: &[EdgeId<I>],
        start: VertexId<I>,
        mut current: VertexId<I>,
    ) -> Option<Vec<VertexId<I>>> {
        let mut vertices = vec![start];
        for &e in &edges[1..] {
            let [a, b] = self.edge_vertices(e);
            vertices.push(current);
            current = match (a == current, b == current) {
                (true, _) => b,
                (_, true) => a,
                _ => return None,
            };
        }
        (current == start).then_some(vertices)
    }

    /// Order `edges` into a closed cycle and return the matching vertex cycle.
    ///
    /// Edges already given in cycle order keep that order (and the face keeps
    /// the vertex order they describe). Otherwise the first edge keeps its
    /// place, is oriented towards the vertex it shares with the second edge,
    /// and the others are chained greedily.
    fn sort_face_edges(&self, edges: &[EdgeId<I>]) -> Result<(Vec<EdgeId<I>>, Vec<VertexId<I>>)> {
        let open = || MeshError::OpenFace { edges: edges.len() };
        if edges.len() < 3 {
            return Err(open());
        }
        for &e in edges {
            if !self.edges.is_active(e.index()) {
                return Err(MeshError::InvalidState(format!("{:?} does not exist", e)));
            }
        }

        let [mut start, mut current] = self.edge_vertices(edges[0]);
        if let Some(vertices) = self
            .walk_cycle(edges, start, current)
            .or_else(|| self.walk_cycle(edges, current, start))
        {
            return Ok((edges.to_vec(), vertices));
        }

        let [n0, n1] = self.edge_vertices(edges[1]);
        if current != n0 && current != n1 {
            std::mem::swap(&mut start, &mut current);
        }

        let mut remaining: Vec<EdgeId<I>> = edges[1..].to_vec();
        let mut sorted = vec![edges[0]];
        let mut vertices = vec![start];

        while !remaining.is_empty() {
            let pos = remaining
                .iter()
                .position(|&e| self.edge_vertices(e).contains(&current))
                .ok_or_else(open)?;
            let e = remaining.remove(pos);
            let [a, b] = self.edge_vertices(e);
            vertices.push(current);
            current = if a == current { b } else { a };
            sorted.push(e);
        }

        if current != start {
            return Err(open());
        }
        Ok((sorted, vertices))
    }

    /// Add a face bounded by `edges`, which must form one closed cycle.
    pub fn add_face(&mut self, edges: &[EdgeId<I>]) -> Result<FaceId<I>> {
        let (sorted, vertices) = self.sort_face_edges(edges)?;

        let index = self.faces.new_index();
        let f = FaceId::new(index);
        for &e in &sorted {
            self.edge_incident_faces[e.index()].push(f);
        }
        store(&mut self.face_incident_edges, index, sorted);
        store(&mut self.face_incident_vertices, index, vertices);
        Ok(f)
    }

    /// Remove a face. Its edges and vertices stay.
    pub fn remove_face(&mut self, f: FaceId<I>) -> Result<()> {
        self.faces.release_index(f.index())?;
        for e in std::mem::take(&mut self.face_incident_edges[f.index()]) {
            self.edge_incident_faces[e.index()].retain(|&g| g != f);
        }
        self.face_incident_vertices[f.index()].clear();
        Ok(())
    }

    /// Remove an edge, together with every face incident to it.
    pub fn remove_edge(&mut self, e: EdgeId<I>) -> Result<()> {
        if !self.edges.is_active(e.index()) {
            return Err(MeshError::InvalidState(format!("{:?} does not exist", e)));
        }
        while let Some(&f) = self.edge_incident_faces[e.index()].last() {
            self.remove_face(f)?;
        }
        for v in self.edge_vertices(e) {
            self.vertex_incident_edges[v.index()].retain(|&g| g != e);
        }
        self.edges.release_index(e.index())
    }

    // ==================== Validation ====================

    /// Check that every incidence is recorded on both sides and every face is
    /// a closed cycle.
    pub fn is_valid(&self) -> bool {
        for e in self.edge_ids() {
            for v in self.edge_vertices(e) {
                if !self.vertices.is_active(v.index()) || !self.vertex_edges(v).contains(&e) {
                    return false;
                }
            }
            for &f in self.edge_faces(e) {
                if !self.faces.is_active(f.index()) || !self.face_edges(f).contains(&e) {
                    return false;
                }
            }
        }
        for f in self.face_ids() {
            let edges = self.face_edges(f);
            let vertices = self.face_vertices(f);
            if edges.len() < 3 || edges.len() != vertices.len() {
                return false;
            }
            for (i, &e) in edges.iter().enumerate() {
                let [a, b] = self.edge_vertices(e);
                let (p, q) = (vertices[i], vertices[(i + 1) % vertices.len()]);
                if !((a == p && b == q) || (a == q && b == p)) {
                    return false;
                }
                if !self.edge_faces(e).contains(&f) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(g: &mut IncidenceGraph, v: [VertexId; 3]) -> (FaceId, [EdgeId; 3]) {
        let e = [
            g.add_edge(v[0], v[1]).unwrap(),
            g.add_edge(v[1], v[2]).unwrap(),
            g.add_edge(v[2], v[0]).unwrap(),
        ];
        (g.add_face(&e).unwrap(), e)
    }

    #[test]
    fn test_empty_graph() {
        let g = IncidenceGraph::<u32>::new();
        assert_eq!(g.nb_vertices(), 0);
        assert_eq!(g.nb_edges(), 0);
        assert_eq!(g.nb_faces(), 0);
        assert!(g.is_valid());
    }

    #[test]
    fn test_triangle_incidences() {
        let mut g = IncidenceGraph::<u32>::new();
        let v = [g.add_vertex(), g.add_vertex(), g.add_vertex()];
        let (f, e) = triangle(&mut g, v);

        assert_eq!(g.face_edges(f), &e);
        assert_eq!(g.face_vertices(f), &v);
        assert_eq!(g.edge_faces(e[1]), &[f]);
        assert_eq!(g.vertex_edges(v[0]).len(), 2);
        assert_eq!(g.find_edge(v[2], v[1]), Some(e[1]));
        assert_eq!(g.boundary_edges().len(), 3);
        assert!(g.is_valid());
    }

    #[test]
    fn test_add_face_sorts_edges() {
        let mut g = IncidenceGraph::<u32>::new();
        let v: Vec<VertexId> = (0..4).map(|_| g.add_vertex()).collect();
        let e01 = g.add_edge(v[0], v[1]).unwrap();
        let e12 = g.add_edge(v[1], v[2]).unwrap();
        let e23 = g.add_edge(v[2], v[3]).unwrap();
        let e30 = g.add_edge(v[3], v[0]).unwrap();

        let f = g.add_face(&[e01, e12, e30, e23]).unwrap();
        assert_eq!(g.face_edges(f), &[e01, e12, e23, e30]);
        assert_eq!(g.face_vertices(f), &v[..]);
        assert!(g.is_valid());
    }

    #[test]
    fn test_add_face_rejects_open_chain() {
        let mut g = IncidenceGraph::<u32>::new();
        let v: Vec<VertexId> = (0..4).map(|_| g.add_vertex()).collect();
        let e01 = g.add_edge(v[0], v[1]).unwrap();
        let e12 = g.add_edge(v[1], v[2]).unwrap();
        let e23 = g.add_edge(v[2], v[3]).unwrap();

        assert_eq!(
            g.add_face(&[e01, e12, e23]),
            Err(MeshError::OpenFace { edges: 3 })
        );
        assert_eq!(g.add_face(&[e01, e12]), Err(MeshError::OpenFace { edges: 2 }));
        assert_eq!(g.nb_faces(), 0);
    }

    #[test]
    fn test_fin_shares_one_edge() {
        let mut g = IncidenceGraph::<u32>::new();
        let v: Vec<VertexId> = (0..5).map(|_| g.add_vertex()).collect();
        let shared = g.add_edge(v[0], v[1]).unwrap();
        for &apex in &v[2..] {
            let a = g.add_edge(v[1], apex).unwrap();
            let b = g.add_edge(apex, v[0]).unwrap();
            g.add_face(&[shared, a, b]).unwrap();
        }

        assert_eq!(g.edge_faces(shared).len(), 3);
        assert_eq!(g.non_manifold_edges(), vec![shared]);
        assert!(g.is_valid());
    }

    #[test]
    fn test_remove_edge_removes_faces() {
        let mut g = IncidenceGraph::<u32>::new();
        let v: Vec<VertexId> = (0..4).map(|_| g.add_vertex()).collect();
        let (f0, e) = triangle(&mut g, [v[0], v[1], v[2]]);
        let e13 = g.add_edge(v[1], v[3]).unwrap();
        let e32 = g.add_edge(v[3], v[2]).unwrap();
        let f1 = g.add_face(&[e[1], e13, e32]).unwrap();

        g.remove_edge(e[1]).unwrap();
        assert_eq!(g.nb_faces(), 0);
        assert_eq!(g.nb_edges(), 4);
        assert!(g.edge_faces(e[0]).is_empty());
        assert!(g.find_edge(v[1], v[2]).is_none());
        assert!(g.remove_face(f0).is_err());
        assert!(g.remove_face(f1).is_err());
        assert!(g.is_valid());

        // Released identities are reused.
        let again = g.add_edge(v[1], v[2]).unwrap();
        assert_eq!(again, e[1]);
    }
}
