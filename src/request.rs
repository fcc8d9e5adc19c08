//! Request tags and cached request signatures.

use crate::data::{extent_contains, Extent};
use crate::info::{keys, InfoBag};

/// The four evaluation passes the executive drives through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Upstream-first metadata discovery.
    Information,
    /// Downstream-first update-parameter propagation.
    UpdateExtent,
    /// Upstream-first data production.
    Data,
    /// Upstream-first refresh of time-dependent metadata.
    TimeDependentInformation,
}

/// The update parameters a cached output was produced for, captured off the
/// producing port's information bag. A cache can serve a new request only
/// if the new parameters are a subset of these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSignature {
    pub time: Option<f64>,
    pub piece: Option<i64>,
    pub num_pieces: Option<i64>,
    pub ghost_levels: Option<i64>,
    pub extent: Option<Extent>,
    pub member: Option<i64>,
}

impl RequestSignature {
    /// Capture the current update keys from an output port's bag.
    pub fn capture(bag: &InfoBag) -> Self {
        Self {
            time: bag.get_double(&keys::UPDATE_TIME_STEP),
            piece: bag.get_int(&keys::UPDATE_PIECE_NUMBER),
            num_pieces: bag.get_int(&keys::UPDATE_NUMBER_OF_PIECES),
            ghost_levels: bag.get_int(&keys::UPDATE_GHOST_LEVELS),
            extent: bag.get_extent(&keys::UPDATE_EXTENT),
            member: bag.get_int(&keys::UPDATE_MEMBER),
        }
    }

    /// Whether a cache produced for `self` can serve `request`. Time, piece,
    /// and member must match exactly; a requested extent must lie inside the
    /// produced one. An unconstrained produced parameter satisfies any
    /// request for it.
    pub fn satisfies(&self, request: &RequestSignature) -> bool {
        fn exact<T: PartialEq>(produced: &Option<T>, requested: &Option<T>) -> bool {
            match (produced, requested) {
                (_, None) => true,
                (Some(p), Some(r)) => p == r,
                (None, Some(_)) => false,
            }
        }

        let extent_ok = match (&self.extent, &request.extent) {
            (_, None) => true,
            (Some(produced), Some(requested)) => extent_contains(produced, requested),
            (None, Some(_)) => false,
        };

        exact(&self.time, &request.time)
            && exact(&self.piece, &request.piece)
            && exact(&self.num_pieces, &request.num_pieces)
            && exact(&self.ghost_levels, &request.ghost_levels)
            && exact(&self.member, &request.member)
            && extent_ok
    }
}
