//! Regular-grid image data and extent arithmetic.
//!
//! Extents are inclusive index ranges `[xmin, xmax, ymin, ymax, zmin, zmax]`.
//! An axis with `min > max` marks an empty extent. 2D images carry a flat
//! z-axis (`zmin == zmax`).

use super::array::AttributeSet;
use crate::clock::{next_tick, ModTick};

/// An inclusive 6-component index range.
pub type Extent = [i32; 6];

/// Extent of no voxels at all.
pub const EMPTY_EXTENT: Extent = [0, -1, 0, -1, 0, -1];

/// Point counts along each axis.
pub fn extent_dims(extent: &Extent) -> [usize; 3] {
    let mut dims = [0usize; 3];
    for axis in 0..3 {
        let span = extent[2 * axis + 1] - extent[2 * axis] + 1;
        dims[axis] = span.max(0) as usize;
    }
    dims
}

pub fn extent_is_empty(extent: &Extent) -> bool {
    extent_dims(extent).iter().any(|&d| d == 0)
}

pub fn extent_num_points(extent: &Extent) -> usize {
    let d = extent_dims(extent);
    d[0] * d[1] * d[2]
}

/// True if `inner` lies entirely inside `outer`. Empty extents are contained
/// in anything.
pub fn extent_contains(outer: &Extent, inner: &Extent) -> bool {
    if extent_is_empty(inner) {
        return true;
    }
    (0..3).all(|axis| {
        outer[2 * axis] <= inner[2 * axis] && inner[2 * axis + 1] <= outer[2 * axis + 1]
    })
}

pub fn extent_intersect(a: &Extent, b: &Extent) -> Extent {
    let mut out = EMPTY_EXTENT;
    for axis in 0..3 {
        let lo = a[2 * axis].max(b[2 * axis]);
        let hi = a[2 * axis + 1].min(b[2 * axis + 1]);
        if lo > hi {
            return EMPTY_EXTENT;
        }
        out[2 * axis] = lo;
        out[2 * axis + 1] = hi;
    }
    out
}

/// Bounding extent of both inputs. An empty input contributes nothing.
pub fn extent_union(a: &Extent, b: &Extent) -> Extent {
    if extent_is_empty(a) {
        return *b;
    }
    if extent_is_empty(b) {
        return *a;
    }
    let mut out = *a;
    for axis in 0..3 {
        out[2 * axis] = out[2 * axis].min(b[2 * axis]);
        out[2 * axis + 1] = out[2 * axis + 1].max(b[2 * axis + 1]);
    }
    out
}

/// A regular grid with origin, spacing, direction, and an extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub origin: [f64; 3],
    pub spacing: [f64; 3],
    /// Row-major 3×3 axis direction matrix.
    pub direction: [f64; 9],
    extent: Extent,
    pub point_data: AttributeSet,
    pub cell_data: AttributeSet,
    mtime: ModTick,
}

impl Default for ImageData {
    fn default() -> Self {
        Self::new(EMPTY_EXTENT)
    }
}

impl ImageData {
    pub fn new(extent: Extent) -> Self {
        Self {
            origin: [0.0; 3],
            spacing: [1.0; 3],
            direction: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            extent,
            point_data: AttributeSet::new(),
            cell_data: AttributeSet::new(),
            mtime: next_tick(),
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = extent;
        self.touch();
    }

    pub fn dims(&self) -> [usize; 3] {
        extent_dims(&self.extent)
    }

    pub fn num_points(&self) -> usize {
        extent_num_points(&self.extent)
    }

    pub fn num_cells(&self) -> usize {
        let d = self.dims();
        if d.iter().any(|&n| n == 0) {
            return 0;
        }
        // A flat axis still contributes one cell layer.
        d.iter().map(|&n| (n - 1).max(1)).product()
    }

    /// Flat point index of global grid coordinates `(i, j, k)`.
    /// Coordinates must lie inside the extent.
    #[inline]
    pub fn point_index(&self, i: i32, j: i32, k: i32) -> usize {
        let d = self.dims();
        let x = (i - self.extent[0]) as usize;
        let y = (j - self.extent[2]) as usize;
        let z = (k - self.extent[4]) as usize;
        (z * d[1] + y) * d[0] + x
    }

    pub fn mtime(&self) -> ModTick {
        self.mtime
    }

    pub fn touch(&mut self) {
        self.mtime = next_tick();
    }

    pub fn bounds(&self) -> [f64; 6] {
        let mut b = [0.0f64; 6];
        for axis in 0..3 {
            b[2 * axis] = self.origin[axis] + self.extent[2 * axis] as f64 * self.spacing[axis];
            b[2 * axis + 1] =
                self.origin[axis] + self.extent[2 * axis + 1] as f64 * self.spacing[axis];
        }
        b
    }

    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            point_data: self.point_data.deep_copy(),
            cell_data: self.cell_data.deep_copy(),
            ..self.clone()
        }
    }

    /// Copy `src`'s point arrays into this image over the sub-extent the two
    /// images share. Arrays are matched by name; missing destination arrays
    /// are allocated over this image's extent.
    pub fn copy_extent_from(&mut self, src: &ImageData) {
        let overlap = extent_intersect(&self.extent, &src.extent());
        if extent_is_empty(&overlap) {
            return;
        }
        let src_names: Vec<String> = src.point_data.iter().map(|a| a.name().to_string()).collect();
        for name in src_names {
            let src_arr = src.point_data.array(&name).cloned();
            let Some(src_arr) = src_arr else { continue };
            let comps = src_arr.components();
            if self.point_data.array(&name).is_none() {
                self.point_data.set_array(super::array::DataArray::zeros(
                    name.clone(),
                    comps,
                    self.num_points(),
                ));
            }
            let dst_extent = self.extent;
            let dst_arr = match self.point_data.array_mut(&name) {
                Some(a) => a,
                None => continue,
            };
            for k in overlap[4]..=overlap[5] {
                for j in overlap[2]..=overlap[3] {
                    for i in overlap[0]..=overlap[1] {
                        let si = flat_index(&src.extent(), i, j, k);
                        let di = flat_index(&dst_extent, i, j, k);
                        for c in 0..comps {
                            let v = src_arr.get_component(si, c);
                            dst_arr.set(di, c, v);
                        }
                    }
                }
            }
        }
        self.touch();
    }
}

#[inline]
fn flat_index(extent: &Extent, i: i32, j: i32, k: i32) -> usize {
    let d = extent_dims(extent);
    let x = (i - extent[0]) as usize;
    let y = (j - extent[2]) as usize;
    let z = (k - extent[4]) as usize;
    (z * d[1] + y) * d[0] + x
}
