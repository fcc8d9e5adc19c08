//! Tabular data.

use super::array::DataArray;
use crate::clock::{next_tick, ModTick};

/// Named columns of equal row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<DataArray>,
    mtime: ModTick,
}

impl Table {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            mtime: next_tick(),
        }
    }

    /// Add or replace the column with the same name.
    pub fn set_column(&mut self, column: DataArray) {
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name() == column.name()) {
            *existing = column;
        } else {
            self.columns.push(column);
        }
        self.touch();
    }

    pub fn column(&self, name: &str) -> Option<&DataArray> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[DataArray] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// Every column must have the same row count.
    pub fn validate(&self) -> bool {
        let rows = self.num_rows();
        self.columns.iter().all(|c| c.len() == rows)
    }

    pub fn mtime(&self) -> ModTick {
        self.mtime
    }

    pub fn touch(&mut self) {
        self.mtime = next_tick();
    }

    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            columns: self.columns.iter().map(DataArray::deep_copy).collect(),
            mtime: self.mtime,
        }
    }

    /// Row-wise concatenation. Columns are matched by name; columns missing
    /// from either side keep their existing rows.
    pub fn append(&mut self, other: &Table) {
        for src in other.columns() {
            if let Some(dst) = self.columns.iter_mut().find(|c| c.name() == src.name()) {
                dst.values_mut().extend_from_slice(src.values());
            } else {
                self.columns.push(src.clone());
            }
        }
        self.touch();
    }
}
