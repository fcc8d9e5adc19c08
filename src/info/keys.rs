//! Well-known pipeline keys.
//!
//! These statics are the vocabulary the executive, the streaming
//! coordinator, and algorithms use to exchange metadata. Extents follow the
//! inclusive `[xmin, xmax, ymin, ymax, zmin, zmax]` convention.

use super::key::{InfoKey, ValueKind};

/// Time values a source can produce, in ascending order.
pub static TIME_STEPS: InfoKey = InfoKey::new("TIME_STEPS", "Executive", ValueKind::DoubleVec);

/// `[tmin, tmax]` of the producible time values.
pub static TIME_RANGE: InfoKey = InfoKey::new("TIME_RANGE", "Executive", ValueKind::DoubleVec);

/// The time value requested for the next data pass.
pub static UPDATE_TIME_STEP: InfoKey =
    InfoKey::new("UPDATE_TIME_STEP", "Executive", ValueKind::Double);

/// Piece index requested for the next data pass.
pub static UPDATE_PIECE_NUMBER: InfoKey =
    InfoKey::new("UPDATE_PIECE_NUMBER", "Executive", ValueKind::Int);

/// Total piece count for the current piece request.
pub static UPDATE_NUMBER_OF_PIECES: InfoKey =
    InfoKey::new("UPDATE_NUMBER_OF_PIECES", "Executive", ValueKind::Int);

/// Ghost layers requested around each piece.
pub static UPDATE_GHOST_LEVELS: InfoKey =
    InfoKey::new("UPDATE_GHOST_LEVELS", "Executive", ValueKind::Int);

/// The sub-extent requested for the next data pass.
pub static UPDATE_EXTENT: InfoKey = InfoKey::new("UPDATE_EXTENT", "Executive", ValueKind::IntVec);

/// The full producible extent of a regular-grid producer.
pub static WHOLE_EXTENT: InfoKey = InfoKey::new("WHOLE_EXTENT", "Executive", ValueKind::IntVec);

/// Opaque per-member metadata advertised by ensemble sources.
pub static ENSEMBLE_META_DATA: InfoKey =
    InfoKey::new("ENSEMBLE_META_DATA", "Executive", ValueKind::Str);

/// Ensemble member requested for the next data pass.
pub static UPDATE_MEMBER: InfoKey = InfoKey::new("UPDATE_MEMBER", "Executive", ValueKind::Int);

/// Producer honors `UPDATE_EXTENT` smaller than its whole extent.
pub static CAN_PRODUCE_SUB_EXTENT: InfoKey =
    InfoKey::new("CAN_PRODUCE_SUB_EXTENT", "StreamingCoordinator", ValueKind::Int);

/// Producer honors piece/number-of-pieces requests.
pub static CAN_HANDLE_PIECE_REQUEST: InfoKey =
    InfoKey::new("CAN_HANDLE_PIECE_REQUEST", "StreamingCoordinator", ValueKind::Int);

/// The keys that parameterize a data request. These are what the default
/// `request_update_extent` forwards upstream and what a cache signature
/// captures.
pub static UPDATE_KEYS: &[&InfoKey] = &[
    &UPDATE_TIME_STEP,
    &UPDATE_PIECE_NUMBER,
    &UPDATE_NUMBER_OF_PIECES,
    &UPDATE_GHOST_LEVELS,
    &UPDATE_EXTENT,
    &UPDATE_MEMBER,
];
