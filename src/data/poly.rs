//! Polygonal meshes.

use super::array::AttributeSet;
use super::grid::{append_point_arrays, point_bounds};
use crate::clock::{next_tick, ModTick};
use std::sync::Arc;

/// A polygonal surface: points plus vertex, line, and polygon connectivity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyMesh {
    points: Arc<Vec<[f64; 3]>>,
    verts: Arc<Vec<Vec<usize>>>,
    lines: Arc<Vec<Vec<usize>>>,
    polys: Arc<Vec<Vec<usize>>>,
    pub point_data: AttributeSet,
    pub cell_data: AttributeSet,
    mtime: ModTick,
}

impl PolyMesh {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self {
            points: Arc::new(points),
            mtime: next_tick(),
            ..Self::default()
        }
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

    pub fn verts(&self) -> &[Vec<usize>] {
        &self.verts
    }

    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    pub fn polys(&self) -> &[Vec<usize>] {
        &self.polys
    }

    pub fn add_vert(&mut self, point: usize) {
        Arc::make_mut(&mut self.verts).push(vec![point]);
        self.touch();
    }

    pub fn add_line(&mut self, connectivity: Vec<usize>) {
        Arc::make_mut(&mut self.lines).push(connectivity);
        self.touch();
    }

    pub fn add_poly(&mut self, connectivity: Vec<usize>) {
        Arc::make_mut(&mut self.polys).push(connectivity);
        self.touch();
    }

    pub fn num_cells(&self) -> usize {
        self.verts.len() + self.lines.len() + self.polys.len()
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
            verts: Arc::new(self.verts.as_ref().clone()),
            lines: Arc::new(self.lines.as_ref().clone()),
            polys: Arc::new(self.polys.as_ref().clone()),
            point_data: self.point_data.deep_copy(),
            cell_data: self.cell_data.deep_copy(),
            mtime: self.mtime,
        }
    }

    /// Concatenate `other`'s points, cells, and per-point arrays onto this
    /// mesh, re-basing connectivity onto the merged point list.
    pub fn append(&mut self, other: &PolyMesh) {
        let offset = self.points.len();
        self.points_mut().extend_from_slice(other.points());
        let rebase = |cells: &[Vec<usize>]| -> Vec<Vec<usize>> {
            cells
                .iter()
                .map(|c| c.iter().map(|&p| p + offset).collect())
                .collect()
        };
        Arc::make_mut(&mut self.verts).extend(rebase(&other.verts));
        Arc::make_mut(&mut self.lines).extend(rebase(&other.lines));
        Arc::make_mut(&mut self.polys).extend(rebase(&other.polys));
        append_point_arrays(&mut self.point_data, &other.point_data);
        self.touch();
    }
}
