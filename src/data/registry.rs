//! Data object type descriptors and by-name factory.

use super::composite::CompositeData;
use super::grid::{StructuredGrid, UnstructuredGrid};
use super::image::ImageData;
use super::poly::PolyMesh;
use super::table::Table;
use super::tree::TreeData;
use super::{DataKind, DataObject};

/// Static descriptor for one data object variant.
pub struct TypeDescriptor {
    pub kind: DataKind,
    pub name: &'static str,
    pub is_composite: bool,
    pub new_instance: fn() -> DataObject,
}

pub static TYPE_DESCRIPTORS: &[TypeDescriptor] = &[
    TypeDescriptor {
        kind: DataKind::Image,
        name: "ImageData",
        is_composite: false,
        new_instance: || DataObject::Image(ImageData::default()),
    },
    TypeDescriptor {
        kind: DataKind::StructuredGrid,
        name: "StructuredGrid",
        is_composite: false,
        new_instance: || DataObject::StructuredGrid(StructuredGrid::default()),
    },
    TypeDescriptor {
        kind: DataKind::UnstructuredGrid,
        name: "UnstructuredGrid",
        is_composite: false,
        new_instance: || DataObject::UnstructuredGrid(UnstructuredGrid::default()),
    },
    TypeDescriptor {
        kind: DataKind::PolyMesh,
        name: "PolyMesh",
        is_composite: false,
        new_instance: || DataObject::PolyMesh(PolyMesh::default()),
    },
    TypeDescriptor {
        kind: DataKind::Table,
        name: "Table",
        is_composite: false,
        new_instance: || DataObject::Table(Table::default()),
    },
    TypeDescriptor {
        kind: DataKind::Tree,
        name: "Tree",
        is_composite: false,
        new_instance: || DataObject::Tree(TreeData::default()),
    },
    TypeDescriptor {
        kind: DataKind::Composite,
        name: "Composite",
        is_composite: true,
        new_instance: || DataObject::Composite(CompositeData::default()),
    },
];

pub fn descriptor(kind: DataKind) -> &'static TypeDescriptor {
    TYPE_DESCRIPTORS
        .iter()
        .find(|d| d.kind == kind)
        .expect("every DataKind has a descriptor")
}

pub fn descriptor_by_name(name: &str) -> Option<&'static TypeDescriptor> {
    TYPE_DESCRIPTORS.iter().find(|d| d.name == name)
}

/// Default-construct a data object by type name.
pub fn new_instance(name: &str) -> Option<DataObject> {
    descriptor_by_name(name).map(|d| (d.new_instance)())
}
