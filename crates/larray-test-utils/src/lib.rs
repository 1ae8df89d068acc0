//! Test fixtures for larray development.
//!
//! Shared shapes, element sequences and proptest strategies used by the
//! unit, integration and benchmark code of the other larray crates.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    extents_strategy, iota, kind_strategy, mismatched_contracts, sample_extents, Ordinal,
    ALL_RANKS,
};
