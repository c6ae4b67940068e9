//! Builders turning a [`SurfaceImportData`] into a topological container.

use std::collections::HashMap;

use nalgebra::Point3;

use super::{GraphImportReport, ImportOptions, ImportReport, SurfaceImportData};
use crate::error::{MeshError, Result};
use crate::mesh::{CMap2, CellContainer, DartId, EdgeId, IncidenceGraph, MeshIndex, VertexId};

/// Faces threaded between two progress reports.
const PROGRESS_STRIDE: usize = 1024;

/// Fail when `count` cells cannot be addressed with `I`.
fn ensure_fits<I: MeshIndex>(count: usize) -> Result<()> {
    if count > I::MAX.to_usize() + 1 {
        return Err(MeshError::IndexOverflow { count });
    }
    Ok(())
}

/// Translate a face window into vertex cells, collapsing consecutive
/// repeats and a closing vertex equal to the first one.
fn face_vertex_cells<I: MeshIndex>(
    window: &[usize],
    ids: &[VertexId<I>],
    out: &mut Vec<VertexId<I>>,
) {
    out.clear();
    for &i in window {
        let v = ids[i];
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
}

/// Write the input positions into the named vertex attribute.
fn store_positions<I: MeshIndex>(
    cells: &mut CellContainer,
    data: &SurfaceImportData<I>,
) -> Result<()> {
    let position =
        cells.get_or_add_attribute::<Point3<f64>>(&data.vertex_position_attribute_name)?;
    for (v, p) in data.vertex_id_after_import.iter().zip(&data.vertex_position) {
        position[v.index()] = *p;
    }
    Ok(())
}

fn report_face(options: &ImportOptions, face: usize, nb_faces: usize, phase: usize, phases: usize) {
    if face % PROGRESS_STRIDE != 0 {
        return;
    }
    if let Some(progress) = &options.progress {
        progress.report_phase(phase, phases, face, nb_faces, "Threading faces");
    }
}

/// Build a combinatorial map from a polygon soup.
///
/// Every input vertex becomes a vertex cell (in input order, recorded in
/// `data.vertex_id_after_import`). Every face with at least three distinct
/// consecutive vertices becomes a phi1 cycle of darts. Darts running along
/// the same edge in opposite directions are then sewn, and the remaining
/// holes are closed with boundary faces unless
/// [`ImportOptions::keep_holes_open`] was requested.
///
/// Only darts created by this call take part in sewing, so importing into a
/// non-empty map appends a separate component.
///
/// Nothing is modified when the package is malformed, its output buffer is
/// not empty, the position attribute name is taken by another value type, or
/// the cells would not fit in the index type.
///
/// # Example
///
/// ```
/// use meshstitch::io::{import_surface_data, ImportOptions, SurfaceImportData};
/// use meshstitch::mesh::CMap2;
/// use nalgebra::Point3;
///
/// let positions = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut data = SurfaceImportData::from_polygons("position", &positions, &[[0usize, 1, 2], [0, 2, 3]]);
///
/// let mut map: CMap2 = CMap2::new();
/// let options = ImportOptions::default().keep_holes_open();
/// let report = import_surface_data(&mut map, &mut data, &options).unwrap();
///
/// assert_eq!(report.faces_imported, 2);
/// assert_eq!(report.boundary_edges, 4);
/// assert_eq!(map.nb_boundary_darts(), 4);
/// assert_eq!(map.nb_edges(), 5);
/// ```
pub fn import_surface_data<I: MeshIndex>(
    map: &mut CMap2<I>,
    data: &mut SurfaceImportData<I>,
    options: &ImportOptions,
) -> Result<ImportReport> {
    data.validate()?;
    ensure_fits::<I>(map.vertex_cells().capacity() + data.nb_vertices())?;
    ensure_fits::<I>(map.face_cells().capacity() + data.nb_faces())?;
    // Hole closing adds at most one dart per face dart.
    ensure_fits::<I>(map.nb_darts() + 2 * data.faces_vertex_indices.len())?;
    map.vertex_cells()
        .check_attribute_type::<Point3<f64>>(&data.vertex_position_attribute_name)?;

    const PHASES: usize = 4;
    let mut report = ImportReport::default();

    options.report(0, PHASES, "Allocating vertices");
    for _ in 0..data.nb_vertices() {
        let v = map.add_vertex();
        data.vertex_id_after_import.push(v);
    }
    store_positions(map.vertex_cells_mut(), data)?;

    let first_dart = map.nb_darts();
    let mut darts_per_vertex: Vec<Vec<DartId<I>>> =
        vec![Vec::new(); map.vertex_cells().capacity()];
    let mut face_vertices = Vec::new();

    for (fi, window) in data.faces().enumerate() {
        report_face(options, fi, data.nb_faces(), 1, PHASES);
        face_vertex_cells(window, &data.vertex_id_after_import, &mut face_vertices);
        if face_vertices.len() < 3 {
            log::debug!(
                "skipping face {}: {} distinct vertices",
                fi,
                face_vertices.len()
            );
            report.faces_skipped += 1;
            continue;
        }

        let mut d = map.add_face(face_vertices.len());
        for &v in &face_vertices {
            map.set_vertex(d, v);
            darts_per_vertex[v.index()].push(d);
            d = map.phi1(d);
        }
        report.faces_imported += 1;
    }

    options.report(2, PHASES, "Sewing edges");
    for i in first_dart..map.nb_darts() {
        let d = DartId::new(i);
        if map.phi2(d) != d {
            continue;
        }
        let v1 = map.vertex_of(d);
        let v2 = map.vertex_of(map.phi1(d));

        let mut sewn = false;
        let mut met_sewn = false;
        for &c in &darts_per_vertex[v2.index()] {
            if map.vertex_of(map.phi1(c)) != v1 {
                continue;
            }
            if map.phi2(c) == c {
                map.phi2_sew(d, c)?;
                sewn = true;
                break;
            }
            met_sewn = true;
        }

        if !sewn {
            report.boundary_edges += 1;
        }
        if met_sewn {
            report.non_manifold_edges += 1;
            report.non_manifold_detected = true;
        }
    }

    options.report(3, PHASES, "Closing holes");
    if report.boundary_edges > 0 {
        if options.close_holes {
            report.holes_closed = map.close()?;
            log::info!("{} hole(s) have been closed", report.holes_closed);
        }
        log::info!("{} boundary edges", report.boundary_edges);
    }

    if report.non_manifold_detected {
        log::warn!(
            "{} dart(s) met an edge already shared by two faces",
            report.non_manifold_edges
        );
    }
    report.non_manifold_vertices = map.non_manifold_vertices().len();
    if report.non_manifold_vertices > 0 {
        log::warn!(
            "{} non-manifold vertices detected",
            report.non_manifold_vertices
        );
    }

    options.report(PHASES, PHASES, "Done");
    Ok(report)
}

/// Build an incidence graph from a polygon soup.
///
/// Vertices are allocated as in [`import_surface_data`]. Each face with at
/// least three distinct consecutive vertices becomes a graph face; the edge
/// between two vertices is created once, from the smaller to the larger
/// vertex cell, and shared by every face that runs along it.
///
/// # Example
///
/// ```
/// use meshstitch::io::{import_surface_graph, ImportOptions, SurfaceImportData};
/// use meshstitch::mesh::IncidenceGraph;
/// use nalgebra::Point3;
///
/// let positions = [Point3::origin(); 4];
/// let mut data = SurfaceImportData::from_polygons("position", &positions, &[[0usize, 1, 2], [2, 1, 3]]);
///
/// let mut graph: IncidenceGraph = IncidenceGraph::new();
/// let report = import_surface_graph(&mut graph, &mut data, &ImportOptions::default()).unwrap();
///
/// assert_eq!(graph.nb_edges(), 5);
/// assert_eq!(report.edges_reused, 1);
/// ```
pub fn import_surface_graph<I: MeshIndex>(
    graph: &mut IncidenceGraph<I>,
    data: &mut SurfaceImportData<I>,
    options: &ImportOptions,
) -> Result<GraphImportReport> {
    data.validate()?;
    ensure_fits::<I>(graph.vertex_cells().capacity() + data.nb_vertices())?;
    ensure_fits::<I>(graph.edge_cells().capacity() + data.faces_vertex_indices.len())?;
    ensure_fits::<I>(graph.face_cells().capacity() + data.nb_faces())?;
    graph
        .vertex_cells()
        .check_attribute_type::<Point3<f64>>(&data.vertex_position_attribute_name)?;

    const PHASES: usize = 2;
    let mut report = GraphImportReport::default();

    options.report(0, PHASES, "Allocating vertices");
    for _ in 0..data.nb_vertices() {
        let v = graph.add_vertex();
        data.vertex_id_after_import.push(v);
    }
    store_positions(graph.vertex_cells_mut(), data)?;

    let mut edge_index: HashMap<(VertexId<I>, VertexId<I>), EdgeId<I>> = HashMap::new();
    let mut face_vertices = Vec::new();
    let mut face_edges = Vec::new();

    for (fi, window) in data.faces().enumerate() {
        report_face(options, fi, data.nb_faces(), 1, PHASES);
        face_vertex_cells(window, &data.vertex_id_after_import, &mut face_vertices);
        if face_vertices.len() < 3 {
            log::debug!(
                "skipping face {}: {} distinct vertices",
                fi,
                face_vertices.len()
            );
            report.faces_skipped += 1;
            continue;
        }

        face_edges.clear();
        for (i, &a) in face_vertices.iter().enumerate() {
            let b = face_vertices[(i + 1) % face_vertices.len()];
            let key = if a < b { (a, b) } else { (b, a) };
            let e = match edge_index.get(&key) {
                Some(&e) => {
                    report.edges_reused += 1;
                    e
                }
                None => {
                    let e = graph.add_edge(key.0, key.1)?;
                    edge_index.insert(key, e);
                    report.edges_created += 1;
                    e
                }
            };
            face_edges.push(e);
        }
        graph.add_face(&face_edges)?;
        report.faces_imported += 1;
    }

    log::debug!(
        "incidence graph import: {} faces, {} edges created, {} reused",
        report.faces_imported,
        report.edges_created,
        report.edges_reused
    );
    options.report(PHASES, PHASES, "Done");
    Ok(report)
}
