//! End-to-end lifecycle tests through the handle-based store.

use larray_core::{
    AccessError, AllocationError, ArrayState, CopyFlag, DeallocationError, ElementKind, ViewError,
};
use larray_store::{ArrayStore, StoreConfig};
use larray_test_utils::{iota, mismatched_contracts, sample_extents, ALL_RANKS};

#[test]
fn real64_rank2_scenario() {
    let mut store = ArrayStore::default();
    let h = store.allocate::<f64, 2>([3, 4]).unwrap();

    let desc = store.descriptor(h).unwrap();
    assert_eq!(desc.element_count(), 12);
    assert_eq!(desc.lower_bounds(), &[1, 1]);
    assert_eq!(desc.upper_bounds(), &[3, 4]);

    let reference = store.get_view::<f64, 2>(h, CopyFlag::Reference).unwrap();
    for (offset, value) in iota::<f64>(12).into_iter().enumerate() {
        reference.as_reference().unwrap().set_linear(offset, value).unwrap();
    }
    let copy = store.get_view::<f64, 2>(h, CopyFlag::Copy).unwrap();

    store.deallocate(h).unwrap();
    assert_eq!(store.state(h), Some(ArrayState::Deallocated));

    assert!(!reference.is_valid());
    assert_eq!(reference.get(&[1, 1]), Err(ViewError::Invalidated));
    assert_eq!(copy.len(), 12);
    assert_eq!(copy.to_vec().unwrap(), iota::<f64>(12));
    assert_eq!(copy.get(&[3, 4]).unwrap(), 12.0);
}

#[test]
fn reference_round_trip_across_views() {
    let mut store = ArrayStore::default();
    let h = store.allocate::<i32, 3>([2, 3, 2]).unwrap();
    let mut writer = store.get_view::<i32, 3>(h, CopyFlag::Reference).unwrap();
    let reader = store.get_view::<i32, 3>(h, CopyFlag::Reference).unwrap();

    writer.set(&[2, 3, 1], 7).unwrap();
    assert_eq!(reader.get(&[2, 3, 1]).unwrap(), 7);
    // Column-major: (2,3,1) sits at offset 1 + 2*2.
    assert_eq!(reader.to_vec().unwrap()[5], 7);
}

#[test]
fn copy_is_independent_both_ways() {
    let mut store = ArrayStore::default();
    let h = store.from_vec::<i16, 1>([4], iota(4)).unwrap();
    let mut copy = store.get_view::<i16, 1>(h, CopyFlag::Copy).unwrap();
    let mut reference = store.get_view::<i16, 1>(h, CopyFlag::Reference).unwrap();

    copy.set(&[1], -1).unwrap();
    reference.set(&[4], -4).unwrap();

    assert_eq!(copy.to_vec().unwrap(), vec![-1, 2, 3, 4]);
    assert_eq!(reference.to_vec().unwrap(), vec![1, 2, 3, -4]);
}

#[test]
fn every_mismatched_contract_rejected() {
    for kind in ElementKind::ALL {
        for rank in ALL_RANKS {
            let mut store = ArrayStore::default();
            let h = store.allocate_dyn(kind, &sample_extents(rank)).unwrap();
            for (k, r) in mismatched_contracts(kind, rank) {
                for flag in [CopyFlag::Reference, CopyFlag::Copy] {
                    let err = store.get_any_view(h, k, r, flag).unwrap_err();
                    assert_eq!(
                        err,
                        AccessError::TypeKindRankMismatch {
                            requested_kind: k,
                            requested_rank: r,
                            actual_kind: kind,
                            actual_rank: rank,
                        }
                    );
                }
            }
            assert!(store.get_any_view(h, kind, rank, CopyFlag::Copy).is_ok());
            assert_eq!(store.state(h), Some(ArrayState::Allocated));
        }
    }
}

#[test]
fn double_free_rejected() {
    let mut store = ArrayStore::default();
    let h = store.allocate::<i64, 1>([8]).unwrap();
    assert_eq!(store.deallocate(h), Ok(()));
    assert_eq!(
        store.deallocate(h),
        Err(DeallocationError::DoubleFreeOrInvalidState {
            state: ArrayState::Deallocated
        })
    );
    assert_eq!(
        store.get_view::<i64, 1>(h, CopyFlag::Copy).unwrap_err(),
        AccessError::DoubleFreeOrInvalidState {
            state: ArrayState::Deallocated
        }
    );
}

#[test]
fn zero_extent_arrays_are_valid() {
    let mut store = ArrayStore::default();
    let h = store.allocate::<f32, 3>([4, 0, 2]).unwrap();
    let desc = store.descriptor(h).unwrap();
    assert_eq!(desc.element_count(), 0);
    assert_eq!(desc.upper_bounds(), &[4, 0, 2]);

    let first = store.get_view::<f32, 3>(h, CopyFlag::Reference).unwrap();
    let second = store.get_view::<f32, 3>(h, CopyFlag::Reference).unwrap();
    assert!(first.is_empty() && second.is_empty());
    assert!(first.is_valid() && second.is_valid());
    assert!(matches!(
        first.get(&[1, 1, 1]),
        Err(ViewError::IndexOutOfBounds { .. })
    ));

    let copy = store.get_view::<f32, 3>(h, CopyFlag::Copy).unwrap();
    assert!(copy.to_vec().unwrap().is_empty());
    store.deallocate(h).unwrap();
}

#[test]
fn zero_extent_beside_huge_extents_allocates() {
    let mut store = ArrayStore::default();
    let h = store.allocate::<f64, 3>([i64::MAX, i64::MAX, 0]).unwrap();
    let desc = store.descriptor(h).unwrap();
    assert_eq!(desc.element_count(), 0);
    assert_eq!(desc.upper_bounds(), &[i64::MAX, i64::MAX, 0]);
    assert!(desc.is_consistent());
    assert_eq!(store.live_bytes(), 0);
}

#[test]
fn byte_budget_rejects_without_side_effects() {
    let config = StoreConfig::new().with_byte_budget(64);
    let mut store = ArrayStore::new(config).unwrap();
    let h = store.allocate::<f64, 1>([8]).unwrap();
    let err = store.allocate::<i8, 1>([1]).unwrap_err();
    assert_eq!(
        err,
        AllocationError::CapacityExceeded {
            requested: 1,
            available: 0
        }
    );
    assert_eq!(store.len(), 1);

    // A copy view is owned by the caller and does not need budget.
    assert!(store.get_view::<f64, 1>(h, CopyFlag::Copy).is_ok());
    // A duplicate is owned by the store and does.
    assert!(matches!(
        store.duplicate(h),
        Err(AccessError::CopyFailed(AllocationError::CapacityExceeded { .. }))
    ));

    store.deallocate(h).unwrap();
    assert!(store.allocate::<i8, 1>([64]).is_ok());
}

#[test]
fn metrics_track_lifecycle() {
    let mut store = ArrayStore::default();
    let a = store.allocate::<i32, 1>([10]).unwrap();
    let b = store.allocate::<i32, 1>([5]).unwrap();
    let _ = store.get_view::<i32, 1>(a, CopyFlag::Reference).unwrap();
    let _ = store.get_view::<i32, 1>(a, CopyFlag::Copy).unwrap();
    store.deallocate(a).unwrap();
    let _ = store.deallocate(a);
    let _ = store.allocate::<i32, 1>([-1]);

    let m = store.metrics();
    assert_eq!(m.allocations, 2);
    assert_eq!(m.failed_allocations, 1);
    assert_eq!(m.deallocations, 1);
    assert_eq!(m.rejected_deallocations, 1);
    assert_eq!(m.reference_views, 1);
    assert_eq!(m.copy_views, 1);
    assert_eq!(m.live_arrays, 1);
    assert_eq!(m.live_bytes, 20);
    assert_eq!(m.peak_bytes, 60);

    store.destroy(b).unwrap();
    assert_eq!(store.metrics().live_bytes, 0);
}

#[test]
fn descriptor_display_in_listing() {
    let mut store = ArrayStore::default();
    store.allocate::<f64, 2>([2, 3]).unwrap();
    let h = store.allocate::<i8, 1>([4]).unwrap();
    store.deallocate(h).unwrap();

    let lines: Vec<String> = store.iter().map(|(_, d)| d.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "R82D allocated [1:2, 1:3] (6 elements)".to_string(),
            "I11D deallocated".to_string(),
        ]
    );
}
