//! Curvilinear and unstructured grids.

use super::array::AttributeSet;
use super::image::{extent_dims, extent_num_points, Extent, EMPTY_EXTENT};
use crate::clock::{next_tick, ModTick};
use std::sync::Arc;

/// A structured grid: image topology with explicit point coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    extent: Extent,
    points: Arc<Vec<[f64; 3]>>,
    pub point_data: AttributeSet,
    pub cell_data: AttributeSet,
    mtime: ModTick,
}

impl Default for StructuredGrid {
    fn default() -> Self {
        Self::new(EMPTY_EXTENT, Vec::new())
    }
}

impl StructuredGrid {
    pub fn new(extent: Extent, points: Vec<[f64; 3]>) -> Self {
        debug_assert_eq!(points.len(), extent_num_points(&extent));
        Self {
            extent,
            points: Arc::new(points),
            point_data: AttributeSet::new(),
            cell_data: AttributeSet::new(),
            mtime: next_tick(),
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn dims(&self) -> [usize; 3] {
        extent_dims(&self.extent)
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut Vec<[f64; 3]> {
        self.mtime = next_tick();
        Arc::make_mut(&mut self.points)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn mtime(&self) -> ModTick {
        self.mtime
    }

    pub fn touch(&mut self) {
        self.mtime = next_tick();
    }

    pub fn bounds(&self) -> Option<[f64; 6]> {
        point_bounds(&self.points)
    }

    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            extent: self.extent,
            points: Arc::new(self.points.as_ref().clone()),
            point_data: self.point_data.deep_copy(),
            cell_data: self.cell_data.deep_copy(),
            mtime: self.mtime,
        }
    }
}

/// Cell shapes an unstructured grid may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Vertex,
    Line,
    Triangle,
    Quad,
    Tetra,
    Hexahedron,
}

/// A single cell: shape plus point indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    pub connectivity: Vec<usize>,
}

/// Points plus an explicit cell list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnstructuredGrid {
    points: Arc<Vec<[f64; 3]>>,
    cells: Arc<Vec<Cell>>,
    pub point_data: AttributeSet,
    pub cell_data: AttributeSet,
    mtime: ModTick,
}

impl UnstructuredGrid {
    pub fn new(points: Vec<[f64; 3]>, cells: Vec<Cell>) -> Self {
        Self {
            points: Arc::new(points),
            cells: Arc::new(cells),
            point_data: AttributeSet::new(),
            cell_data: AttributeSet::new(),
            mtime: next_tick(),
        }
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut Vec<[f64; 3]> {
        self.mtime = next_tick();
        Arc::make_mut(&mut self.points)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut Vec<Cell> {
        self.mtime = next_tick();
        Arc::make_mut(&mut self.cells)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn mtime(&self) -> ModTick {
        self.mtime
    }

    pub fn touch(&mut self) {
        self.mtime = next_tick();
    }

    pub fn bounds(&self) -> Option<[f64; 6]> {
        point_bounds(&self.points)
    }

    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            points: Arc::new(self.points.as_ref().clone()),
            cells: Arc::new(self.cells.as_ref().clone()),
            point_data: self.point_data.deep_copy(),
            cell_data: self.cell_data.deep_copy(),
            mtime: self.mtime,
        }
    }

    /// Concatenate `other`'s points, cells, and per-point arrays onto this
    /// grid. Cell connectivity is re-based onto the merged point list.
    pub fn append(&mut self, other: &UnstructuredGrid) {
        let offset = self.points.len();
        self.points_mut().extend_from_slice(other.points());
        let rebased = other.cells().iter().map(|c| Cell {
            kind: c.kind,
            connectivity: c.connectivity.iter().map(|&p| p + offset).collect(),
        });
        self.cells_mut().extend(rebased);
        append_point_arrays(&mut self.point_data, &other.point_data);
        self.touch();
    }
}

pub(crate) fn point_bounds(points: &[[f64; 3]]) -> Option<[f64; 6]> {
    let first = points.first()?;
    let mut b = [
        first[0], first[0], first[1], first[1], first[2], first[2],
    ];
    for p in points {
        for axis in 0..3 {
            b[2 * axis] = b[2 * axis].min(p[axis]);
            b[2 * axis + 1] = b[2 * axis + 1].max(p[axis]);
        }
    }
    Some(b)
}

/// Row-wise concatenation of matching per-point arrays.
pub(crate) fn append_point_arrays(dst: &mut AttributeSet, src: &AttributeSet) {
    for src_arr in src.iter() {
        if let Some(dst_arr) = dst.array_mut(src_arr.name()) {
            dst_arr.values_mut().extend_from_slice(src_arr.values());
        } else {
            dst.set_array(src_arr.clone());
        }
    }
}
