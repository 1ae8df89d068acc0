//! Descriptor-owned storage and typed views for larray local arrays.
//!
//! # Architecture
//!
//! ```text
//! ArrayStore (handle-based entry points)
//! ├── HandleTable<ArrayDescriptor> (slot+generation handles)
//! │   └── ArrayDescriptor → AnyBlock → StorageBlock<T> (Rc<RefCell<Vec<T>>>)
//! ├── StorageBackend (validate-then-commit allocation, byte budget)
//! │   ├── StoreConfig
//! │   └── StoreMetrics
//! └── accessor (exact kind/rank check) → View<T>
//!     ├── RefView<T> (Weak alias, invalidated on deallocate)
//!     └── CopyView<T> (owned snapshot, released on drop)
//! ```
//!
//! # Lifecycle
//!
//! A descriptor moves `Unallocated → Allocated → Deallocated` and never
//! back. Views are only handed out while it is `Allocated`, and only for
//! the exact element kind and rank it was created with.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accessor;
pub mod backend;
pub mod block;
pub mod config;
pub mod descriptor;
pub mod handle;
pub mod metrics;
pub mod store;
pub mod view;

pub use backend::StorageBackend;
pub use block::{AnyBlock, BlockElement, StorageBlock};
pub use config::{ConfigError, StoreConfig};
pub use descriptor::ArrayDescriptor;
pub use handle::ArrayHandle;
pub use metrics::StoreMetrics;
pub use store::ArrayStore;
pub use view::{AnyView, CopyView, RefView, View, ViewLayout};
