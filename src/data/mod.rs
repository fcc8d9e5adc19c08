//! Polymorphic data objects flowing along pipeline connections.
//!
//! `DataObject` is a tagged union over the concrete dataset variants. All
//! bulk payloads (attribute arrays, point lists, cell lists) live behind
//! `Arc`s, so `shallow_copy` forks the structure while sharing payloads and
//! `deep_copy` duplicates everything. Downstream consumers observe objects
//! read-only and fork before mutating.

pub mod array;
pub mod composite;
pub mod grid;
pub mod image;
pub mod poly;
pub mod registry;
pub mod table;
pub mod tree;

pub use array::{AttributeSet, DataArray};
pub use composite::{CompositeData, CompositeEntry, CompositeIterator};
pub use grid::{Cell, CellKind, StructuredGrid, UnstructuredGrid};
pub use image::{
    extent_contains, extent_dims, extent_intersect, extent_is_empty, extent_num_points,
    extent_union, Extent, ImageData, EMPTY_EXTENT,
};
pub use poly::PolyMesh;
pub use registry::{descriptor, descriptor_by_name, new_instance, TypeDescriptor};
pub use table::Table;
pub use tree::{TreeData, TreeNode};

use crate::clock::ModTick;

/// One tag per data object variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Image,
    StructuredGrid,
    UnstructuredGrid,
    PolyMesh,
    Table,
    Tree,
    Composite,
}

impl DataKind {
    pub fn name(self) -> &'static str {
        registry::descriptor(self).name
    }

    /// Regular-grid family: datasets addressed by an extent.
    pub fn is_grid(self) -> bool {
        matches!(self, DataKind::Image | DataKind::StructuredGrid)
    }

    /// Datasets carrying an explicit point list.
    pub fn is_point_set(self) -> bool {
        matches!(
            self,
            DataKind::StructuredGrid | DataKind::UnstructuredGrid | DataKind::PolyMesh
        )
    }

    pub fn is_composite(self) -> bool {
        registry::descriptor(self).is_composite
    }
}

/// A value flowing along a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum DataObject {
    Image(ImageData),
    StructuredGrid(StructuredGrid),
    UnstructuredGrid(UnstructuredGrid),
    PolyMesh(PolyMesh),
    Table(Table),
    Tree(TreeData),
    Composite(CompositeData),
}

impl DataObject {
    pub fn kind(&self) -> DataKind {
        match self {
            DataObject::Image(_) => DataKind::Image,
            DataObject::StructuredGrid(_) => DataKind::StructuredGrid,
            DataObject::UnstructuredGrid(_) => DataKind::UnstructuredGrid,
            DataObject::PolyMesh(_) => DataKind::PolyMesh,
            DataObject::Table(_) => DataKind::Table,
            DataObject::Tree(_) => DataKind::Tree,
            DataObject::Composite(_) => DataKind::Composite,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn mtime(&self) -> ModTick {
        match self {
            DataObject::Image(d) => d.mtime(),
            DataObject::StructuredGrid(d) => d.mtime(),
            DataObject::UnstructuredGrid(d) => d.mtime(),
            DataObject::PolyMesh(d) => d.mtime(),
            DataObject::Table(d) => d.mtime(),
            DataObject::Tree(d) => d.mtime(),
            DataObject::Composite(d) => d.mtime(),
        }
    }

    pub fn touch(&mut self) {
        match self {
            DataObject::Image(d) => d.touch(),
            DataObject::StructuredGrid(d) => d.touch(),
            DataObject::UnstructuredGrid(d) => d.touch(),
            DataObject::PolyMesh(d) => d.touch(),
            DataObject::Table(d) => d.touch(),
            DataObject::Tree(d) => d.touch(),
            DataObject::Composite(d) => d.touch(),
        }
    }

    /// Fork structure, share payloads.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// Fork structure and payloads.
    pub fn deep_copy(&self) -> Self {
        match self {
            DataObject::Image(d) => DataObject::Image(d.deep_copy()),
            DataObject::StructuredGrid(d) => DataObject::StructuredGrid(d.deep_copy()),
            DataObject::UnstructuredGrid(d) => DataObject::UnstructuredGrid(d.deep_copy()),
            DataObject::PolyMesh(d) => DataObject::PolyMesh(d.deep_copy()),
            DataObject::Table(d) => DataObject::Table(d.deep_copy()),
            DataObject::Tree(d) => DataObject::Tree(d.deep_copy()),
            DataObject::Composite(d) => DataObject::Composite(d.deep_copy()),
        }
    }

    /// Spatial bounds, `None` for non-spatial variants (tables, trees) and
    /// for point sets with no points.
    pub fn bounds(&self) -> Option<[f64; 6]> {
        match self {
            DataObject::Image(d) => Some(d.bounds()),
            DataObject::StructuredGrid(d) => d.bounds(),
            DataObject::UnstructuredGrid(d) => d.bounds(),
            DataObject::PolyMesh(d) => d.bounds(),
            DataObject::Table(_) | DataObject::Tree(_) => None,
            DataObject::Composite(d) => {
                let mut bounds: Option<[f64; 6]> = None;
                for (leaf, _) in d.iter_leaves() {
                    let Some(b) = leaf.bounds() else { continue };
                    bounds = Some(match bounds {
                        None => b,
                        Some(acc) => merge_bounds(acc, b),
                    });
                }
                bounds
            }
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            DataObject::Image(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            DataObject::Table(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeData> {
        match self {
            DataObject::Composite(d) => Some(d),
            _ => None,
        }
    }
}

fn merge_bounds(a: [f64; 6], b: [f64; 6]) -> [f64; 6] {
    let mut out = a;
    for axis in 0..3 {
        out[2 * axis] = out[2 * axis].min(b[2 * axis]);
        out[2 * axis + 1] = out[2 * axis + 1].max(b[2 * axis + 1]);
    }
    out
}
