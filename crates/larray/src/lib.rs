//! larray: descriptor-managed local arrays of rank 1 to 7.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the larray sub-crates. For most users, adding `larray` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use larray::prelude::*;
//!
//! let mut store = ArrayStore::default();
//! let grid = store.allocate::<f64, 2>([3, 4]).unwrap();
//!
//! // A reference view aliases the array's storage.
//! let mut live = store.get_view::<f64, 2>(grid, CopyFlag::Reference).unwrap();
//! live.set(&[3, 4], 1.5).unwrap();
//!
//! // A copy view owns a snapshot.
//! let snapshot = store.get_view::<f64, 2>(grid, CopyFlag::Copy).unwrap();
//!
//! store.deallocate(grid).unwrap();
//! assert!(!live.is_valid());
//! assert_eq!(snapshot.get(&[3, 4]).unwrap(), 1.5);
//!
//! // Views must match the array's element kind and rank exactly.
//! let h = store.allocate::<i32, 1>([8]).unwrap();
//! assert!(matches!(
//!     store.get_view::<i64, 1>(h, CopyFlag::Copy),
//!     Err(AccessError::TypeKindRankMismatch { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `larray-core` | Element kinds, ranks, shapes, bounds, errors |
//! | [`store`] | `larray-store` | Descriptors, backend, views, handles, store |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element kinds, shapes and error types (`larray-core`).
///
/// [`types::ElementKind`] and the sealed [`types::Element`] trait tie Rust
/// element types to their runtime tags.
pub use larray_core as types;

/// Storage, views and lifecycle management (`larray-store`).
///
/// [`store::ArrayStore`] is the handle-based entry point;
/// [`store::StorageBackend`] and [`store::accessor`] work on bare
/// descriptors.
pub use larray_store as store;

/// Common imports for typical larray usage.
///
/// ```rust
/// use larray::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use larray_core::{ArrayState, Bounds, CopyFlag, Element, ElementKind, Rank, Shape};

    // Errors
    pub use larray_core::{AccessError, AllocationError, DeallocationError, ViewError};

    // Store
    pub use larray_store::{
        AnyView, ArrayDescriptor, ArrayHandle, ArrayStore, CopyView, RefView, StoreConfig,
        StoreMetrics, View,
    };
}
