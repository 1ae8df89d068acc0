//! Reusable shapes, data and strategies.
//!
//! - [`sample_extents`]: one small shape per supported rank.
//! - [`iota`]: `1, 2, 3, ...` in any element type.
//! - [`mismatched_contracts`]: every (kind, rank) pair except one.
//! - [`extents_strategy`] / [`kind_strategy`]: proptest inputs.

use larray_core::{Element, ElementKind, MAX_RANK};
use proptest::prelude::*;

/// Every supported rank, in order.
pub const ALL_RANKS: [usize; MAX_RANK] = [1, 2, 3, 4, 5, 6, 7];

/// A small non-empty shape of the given rank: `[2, 3, 2, 3, ...]`.
///
/// Products stay below 500 elements for every rank.
pub fn sample_extents(rank: usize) -> Vec<i64> {
    (0..rank).map(|d| if d % 2 == 0 { 2 } else { 3 }).collect()
}

/// An element type that can be built from a counter, truncating.
pub trait Ordinal: Element {
    fn from_ordinal(n: usize) -> Self;
}

macro_rules! impl_ordinal {
    ($($ty:ty),*) => {
        $(
            impl Ordinal for $ty {
                fn from_ordinal(n: usize) -> Self {
                    n as $ty
                }
            }
        )*
    };
}

impl_ordinal!(i8, i16, i32, i64, f32, f64);

/// `len` elements counting up from one.
pub fn iota<T: Ordinal>(len: usize) -> Vec<T> {
    (1..=len).map(T::from_ordinal).collect()
}

/// Every (kind, rank) pair that differs from `(kind, rank)` in at least one
/// component.
pub fn mismatched_contracts(kind: ElementKind, rank: usize) -> Vec<(ElementKind, usize)> {
    ElementKind::ALL
        .iter()
        .flat_map(|&k| ALL_RANKS.iter().map(move |&r| (k, r)))
        .filter(|&(k, r)| k != kind || r != rank)
        .collect()
}

/// Any element kind.
pub fn kind_strategy() -> impl Strategy<Value = ElementKind> {
    proptest::sample::select(ElementKind::ALL.to_vec())
}

/// Shapes of rank 1 to 7 with extents in `0..=max_extent`.
///
/// Ranks above 3 are capped at extent 3 to keep element counts small.
pub fn extents_strategy(max_extent: i64) -> impl Strategy<Value = Vec<i64>> {
    (1usize..=MAX_RANK).prop_flat_map(move |rank| {
        let cap = if rank > 3 { max_extent.min(3) } else { max_extent };
        proptest::collection::vec(0..=cap, rank)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_extents_match_rank() {
        for rank in ALL_RANKS {
            let extents = sample_extents(rank);
            assert_eq!(extents.len(), rank);
            assert!(extents.iter().all(|&e| e > 0));
        }
        assert_eq!(sample_extents(3), vec![2, 3, 2]);
    }

    #[test]
    fn from_ordinal_truncates() {
        assert_eq!(i8::from_ordinal(300), 300usize as i8);
        assert_eq!(f64::from_ordinal(7), 7.0);
    }

    #[test]
    fn iota_counts_from_one() {
        assert_eq!(iota::<i32>(4), vec![1, 2, 3, 4]);
        assert_eq!(iota::<f64>(2), vec![1.0, 2.0]);
    }

    #[test]
    fn mismatched_contracts_exclude_only_the_match() {
        let pairs = mismatched_contracts(ElementKind::Real64, 2);
        assert_eq!(pairs.len(), ElementKind::ALL.len() * MAX_RANK - 1);
        assert!(!pairs.contains(&(ElementKind::Real64, 2)));
        assert!(pairs.contains(&(ElementKind::Real32, 2)));
        assert!(pairs.contains(&(ElementKind::Real64, 3)));
    }
}
