//! Error types for local array operations.
//!
//! One enum per operation family: shape validation, allocation, view
//! retrieval, deallocation, and element access through an existing view.
//! Every failing operation leaves descriptor state untouched.

use std::error::Error;
use std::fmt;

use crate::kind::ElementKind;
use crate::state::ArrayState;

/// A requested shape is not representable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// Rank outside `1..=7`.
    RankOutOfRange {
        /// The rejected rank.
        rank: usize,
    },
    /// An extent below zero.
    NegativeExtent {
        /// Zero-based dimension of the offending extent.
        dim: usize,
        /// The rejected extent.
        extent: i64,
    },
    /// Number of extents differs from the descriptor's rank.
    RankMismatch {
        /// The descriptor's rank.
        expected: usize,
        /// Number of extents supplied.
        found: usize,
    },
    /// The product of extents overflows `usize`.
    CountOverflow,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankOutOfRange { rank } => write!(f, "rank {rank} outside 1..=7"),
            Self::NegativeExtent { dim, extent } => {
                write!(f, "negative extent {extent} in dimension {dim}")
            }
            Self::RankMismatch { expected, found } => {
                write!(f, "expected {expected} extents, got {found}")
            }
            Self::CountOverflow => write!(f, "element count overflows usize"),
        }
    }
}

impl Error for ShapeError {}

/// Errors from allocating storage for a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationError {
    /// Negative extent, wrong number of extents, or rank out of range.
    InvalidShape(ShapeError),
    /// The descriptor is not `Unallocated`.
    InvalidState {
        /// State the descriptor was found in.
        state: ArrayState,
    },
    /// Element count times element size overflows `usize`.
    SizeOverflow {
        /// Requested element count.
        elements: usize,
        /// Kind whose width overflowed.
        kind: ElementKind,
    },
    /// The store's byte budget would be exceeded.
    CapacityExceeded {
        /// Bytes requested by this allocation.
        requested: usize,
        /// Bytes still available under the budget.
        available: usize,
    },
    /// The store already holds its maximum number of descriptors.
    TooManyArrays {
        /// Configured descriptor limit.
        limit: usize,
    },
    /// The system allocator refused the request.
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
    },
    /// Adopted data does not hold exactly the product of the extents.
    LengthMismatch {
        /// Product of extents.
        expected: usize,
        /// Length of the supplied data.
        found: usize,
    },
    /// Adopted data is of a different kind than the descriptor.
    KindMismatch {
        /// The descriptor's kind.
        expected: ElementKind,
        /// Kind of the supplied data.
        found: ElementKind,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape(reason) => write!(f, "invalid shape: {reason}"),
            Self::InvalidState { state } => {
                write!(f, "cannot allocate a descriptor that is {state}")
            }
            Self::SizeOverflow { elements, kind } => {
                write!(f, "{elements} elements of kind {kind} overflow the address space")
            }
            Self::CapacityExceeded {
                requested,
                available,
            } => write!(
                f,
                "byte budget exceeded: requested {requested} bytes, {available} bytes available"
            ),
            Self::TooManyArrays { limit } => write!(f, "store already holds {limit} arrays"),
            Self::OutOfMemory { requested } => {
                write!(f, "allocation of {requested} bytes failed")
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {expected} elements, got {found}")
            }
            Self::KindMismatch { expected, found } => {
                write!(f, "expected {expected} data, got {found}")
            }
        }
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidShape(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<ShapeError> for AllocationError {
    fn from(reason: ShapeError) -> Self {
        Self::InvalidShape(reason)
    }
}

/// Errors from requesting a view of an array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessError {
    /// The requested kind or rank differs from what the descriptor holds.
    TypeKindRankMismatch {
        /// Kind the caller asked for.
        requested_kind: ElementKind,
        /// Rank the caller asked for.
        requested_rank: usize,
        /// Kind the descriptor holds.
        actual_kind: ElementKind,
        /// Rank the descriptor holds.
        actual_rank: usize,
    },
    /// The descriptor is not `Allocated`: never allocated, or already
    /// released.
    DoubleFreeOrInvalidState {
        /// State the descriptor was found in.
        state: ArrayState,
    },
    /// The handle does not name a live descriptor.
    StaleHandle,
    /// Allocating the buffer for a copy view failed.
    CopyFailed(AllocationError),
    /// The storage is mutably borrowed through a reference view.
    Busy,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeKindRankMismatch {
                requested_kind,
                requested_rank,
                actual_kind,
                actual_rank,
            } => write!(
                f,
                "requested {requested_kind} rank {requested_rank}, array holds {actual_kind} rank {actual_rank}"
            ),
            Self::DoubleFreeOrInvalidState { state } => {
                write!(f, "cannot view an array that is {state}")
            }
            Self::StaleHandle => write!(f, "stale array handle"),
            Self::CopyFailed(reason) => write!(f, "copy failed: {reason}"),
            Self::Busy => write!(f, "storage is mutably borrowed"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CopyFailed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Errors from releasing an array's storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeallocationError {
    /// The descriptor is `Unallocated` or already `Deallocated`.
    DoubleFreeOrInvalidState {
        /// State the descriptor was found in.
        state: ArrayState,
    },
    /// The handle does not name a live descriptor.
    StaleHandle,
}

impl fmt::Display for DeallocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleFreeOrInvalidState { state } => {
                write!(f, "double free or invalid state: descriptor is {state}")
            }
            Self::StaleHandle => write!(f, "stale array handle"),
        }
    }
}

impl Error for DeallocationError {}

/// Errors from reading or writing through an existing view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The source array of a reference view has been deallocated.
    Invalidated,
    /// A multi-index lies outside the view's bounds.
    IndexOutOfBounds {
        /// The rejected index.
        index: Vec<i64>,
    },
    /// A linear offset is past the end of the view.
    OffsetOutOfBounds {
        /// The rejected offset.
        offset: usize,
        /// Number of elements in the view.
        len: usize,
    },
    /// A multi-index has the wrong number of components.
    RankMismatch {
        /// The view's rank.
        expected: usize,
        /// Components supplied.
        found: usize,
    },
    /// The storage is already borrowed by an enclosing access.
    Busy,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalidated => write!(f, "view invalidated: source array was deallocated"),
            Self::IndexOutOfBounds { index } => write!(f, "index {index:?} out of bounds"),
            Self::OffsetOutOfBounds { offset, len } => {
                write!(f, "offset {offset} out of bounds for {len} elements")
            }
            Self::RankMismatch { expected, found } => {
                write!(f, "expected {expected} index components, got {found}")
            }
            Self::Busy => write!(f, "storage already borrowed"),
        }
    }
}

impl Error for ViewError {}
