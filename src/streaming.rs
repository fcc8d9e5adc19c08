//! Streaming coordinator.
//!
//! Streaming is an outer loop over full synchronous updates, never a
//! per-node recursive split: the coordinator asks the target for its
//! information, decides a piece count, runs one `update_piece` per piece,
//! and appends the produced sub-data onto an accumulating output.

use crate::data::{
    extent_union, DataObject, Extent, ImageData,
};
use crate::error::{PipelineError, PipelineResult};
use crate::executive::Executive;
use crate::id::NodeId;
use crate::info::keys;

/// Slab-decompose `whole` into `num_pieces` along the outermost non-flat
/// axis (z first, then y, then x). Returns `None` when `piece` gets an
/// empty slab (more pieces than slices).
pub fn split_extent(whole: &Extent, piece: usize, num_pieces: usize) -> Option<Extent> {
    if num_pieces <= 1 {
        return (piece == 0).then_some(*whole);
    }

    // No splittable axis: the first piece takes the whole extent.
    let Some(axis) = (0..3)
        .rev()
        .find(|&axis| whole[2 * axis + 1] > whole[2 * axis])
    else {
        return (piece == 0).then_some(*whole);
    };

    let lo = whole[2 * axis];
    let hi = whole[2 * axis + 1];
    let length = (hi - lo + 1) as usize;
    if piece >= num_pieces || piece >= length {
        return None;
    }

    // First `remainder` slabs get one extra slice.
    let base = length / num_pieces;
    let remainder = length % num_pieces;
    let start = piece * base + piece.min(remainder);
    let size = base + usize::from(piece < remainder);
    if size == 0 {
        return None;
    }

    let mut out = *whole;
    out[2 * axis] = lo + start as i32;
    out[2 * axis + 1] = lo + (start + size) as i32 - 1;
    Some(out)
}

/// Append `piece` onto `acc` following the per-type merge rules: image
/// extents merge, point sets and tables concatenate, composites union
/// component-wise.
pub fn append_data(acc: &mut DataObject, piece: &DataObject) -> PipelineResult<()> {
    match (acc, piece) {
        (DataObject::Image(acc), DataObject::Image(piece)) => {
            let union = extent_union(&acc.extent(), &piece.extent());
            if union != acc.extent() {
                let mut merged = ImageData::new(union);
                merged.origin = acc.origin;
                merged.spacing = acc.spacing;
                merged.direction = acc.direction;
                merged.copy_extent_from(acc);
                *acc = merged;
            }
            acc.copy_extent_from(piece);
            Ok(())
        }
        (DataObject::UnstructuredGrid(acc), DataObject::UnstructuredGrid(piece)) => {
            acc.append(piece);
            Ok(())
        }
        (DataObject::PolyMesh(acc), DataObject::PolyMesh(piece)) => {
            acc.append(piece);
            Ok(())
        }
        (DataObject::Table(acc), DataObject::Table(piece)) => {
            acc.append(piece);
            Ok(())
        }
        (DataObject::Composite(acc), DataObject::Composite(piece)) => {
            for (index, entry) in piece.entries().iter().enumerate() {
                while acc.len() <= index {
                    acc.push(None);
                }
                let Some(slot) = acc.entry_mut(index) else {
                    continue;
                };
                match (&mut slot.data, &entry.data) {
                    (_, None) => {}
                    (Some(dst), Some(src)) => append_data(dst, src)?,
                    (dst, Some(src)) => {
                        *dst = Some(src.shallow_copy());
                        slot.info.copy_from(&entry.info, false);
                    }
                }
            }
            Ok(())
        }
        (acc, piece) => Err(PipelineError::AppendMismatch {
            dst: acc.type_name(),
            src: piece.type_name(),
        }),
    }
}

/// Drives piece-wise evaluation of one pipeline output.
#[derive(Debug, Clone)]
pub struct StreamingCoordinator {
    divisions: usize,
}

impl StreamingCoordinator {
    /// `divisions` is the requested split count; it is clamped to 1 when
    /// the target cannot stream.
    pub fn new(divisions: usize) -> Self {
        Self {
            divisions: divisions.max(1),
        }
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Update `node`'s output `port`, split into pieces when the producer
    /// advertises streaming support. Returns the accumulated data object,
    /// or `None` when the pipeline produced nothing.
    pub fn update_streamed(
        &self,
        exec: &mut Executive,
        node: NodeId,
        port: usize,
    ) -> PipelineResult<Option<DataObject>> {
        exec.update_information(node)?;
        let bag = exec
            .output_information(node, port)
            .ok_or(PipelineError::BadPort { node_id: node, port })?;
        let can_stream = bag.get_int(&keys::CAN_PRODUCE_SUB_EXTENT) == Some(1)
            || bag.get_int(&keys::CAN_HANDLE_PIECE_REQUEST) == Some(1);
        let num_pieces = if can_stream { self.divisions } else { 1 };

        if num_pieces == 1 {
            tracing::debug!(%node, "streaming disabled, single full update");
            exec.update_port(node, port)?;
            return Ok(exec.output(node, port));
        }

        tracing::debug!(%node, num_pieces, "streaming update");
        let mut accumulated: Option<DataObject> = None;
        for piece in 0..num_pieces {
            exec.update_piece_port(node, piece, num_pieces, 0, port)?;
            let Some(produced) = exec.output(node, port) else {
                continue;
            };
            match &mut accumulated {
                None => accumulated = Some(produced),
                Some(acc) => append_data(acc, &produced)?,
            }
        }
        Ok(accumulated)
    }
}
