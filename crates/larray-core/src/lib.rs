//! Core types for larray local arrays.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! element kinds, shape and bound arithmetic, lifecycle state, and error
//! types shared by the storage layer and its callers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod kind;
pub mod shape;
pub mod state;

pub use error::{AccessError, AllocationError, DeallocationError, ShapeError, ViewError};
pub use kind::{Element, ElementKind};
pub use shape::{element_count, Bounds, Dims, Rank, Shape, MAX_RANK};
pub use state::{ArrayState, CopyFlag};
