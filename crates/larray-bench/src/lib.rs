//! Benchmark profiles for larray.
//!
//! - [`grid_extents`]: a square rank-2 shape with a given cell count.
//! - [`populated_store`]: a store pre-filled with many small arrays.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use larray_core::ElementKind;
use larray_store::{ArrayHandle, ArrayStore, StoreConfig};

/// Extents of a square grid holding at least `cells` elements.
pub fn grid_extents(cells: usize) -> [i64; 2] {
    let mut side = (cells as f64).sqrt() as i64;
    if (side * side) < cells as i64 {
        side += 1;
    }
    [side, side]
}

/// A store holding `count` allocated rank-1 arrays of `len` `Real64`
/// elements, with their handles in allocation order.
///
/// # Panics
///
/// If `count` is zero or any allocation fails.
pub fn populated_store(count: usize, len: i64) -> (ArrayStore, Vec<ArrayHandle>) {
    let config = StoreConfig::new().with_max_arrays(count);
    let mut store = ArrayStore::new(config).expect("populated_store needs count >= 1");
    let handles = (0..count)
        .map(|i| {
            store
                .allocate_dyn(ElementKind::Real64, &[len])
                .unwrap_or_else(|err| panic!("profile array {i} of {count}: {err}"))
        })
        .collect();
    (store, handles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_extents_cover_cell_count() {
        assert_eq!(grid_extents(10_000), [100, 100]);
        assert_eq!(grid_extents(10), [4, 4]);
    }

    #[test]
    fn populated_store_fills_to_count() {
        let (store, handles) = populated_store(16, 8);
        assert_eq!(handles.len(), 16);
        assert_eq!(store.len(), 16);
        assert_eq!(store.live_bytes(), 16 * 8 * 8);
    }

    #[test]
    #[should_panic(expected = "profile array 0 of 2")]
    fn populated_store_panics_on_bad_extent() {
        populated_store(2, -1);
    }

    #[test]
    #[should_panic(expected = "count >= 1")]
    fn populated_store_rejects_empty_profile() {
        populated_store(0, 4);
    }
}
