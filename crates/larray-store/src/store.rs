//! Handle-based entry points over descriptors, backend and accessor.
//!
//! [`ArrayStore`] owns every descriptor it creates and hands callers an
//! [`ArrayHandle`] instead. Allocation creates and allocates in one step,
//! so a descriptor is never visible to callers in the `Unallocated` state.

use log::{debug, warn};

use larray_core::{
    AccessError, AllocationError, ArrayState, CopyFlag, DeallocationError, ElementKind, Rank,
};

use crate::accessor;
use crate::backend::StorageBackend;
use crate::block::BlockElement;
use crate::config::{ConfigError, StoreConfig};
use crate::descriptor::ArrayDescriptor;
use crate::handle::{ArrayHandle, HandleTable};
use crate::metrics::StoreMetrics;
use crate::view::{AnyView, View};

/// A collection of local arrays addressed by handle.
///
/// Deallocated descriptors stay in the store, so their handles keep
/// reporting `Deallocated`, until [`destroy`](Self::destroy) removes them.
pub struct ArrayStore {
    backend: StorageBackend,
    arrays: HandleTable<ArrayDescriptor>,
}

impl ArrayStore {
    /// Create an empty store after validating `config`.
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: StorageBackend::new(config)?,
            arrays: HandleTable::new(),
        })
    }

    /// Allocate a zero-initialised rank-`R` array of `T`.
    ///
    /// `R` must be in `1..=7` and every extent non-negative. A zero extent
    /// yields a valid empty array.
    ///
    /// ```
    /// use larray_store::ArrayStore;
    /// use larray_core::CopyFlag;
    ///
    /// let mut store = ArrayStore::default();
    /// let h = store.allocate::<f64, 2>([3, 4]).unwrap();
    /// let view = store.get_view::<f64, 2>(h, CopyFlag::Reference).unwrap();
    /// assert_eq!(view.len(), 12);
    /// ```
    pub fn allocate<T: BlockElement, const R: usize>(
        &mut self,
        extents: [i64; R],
    ) -> Result<ArrayHandle, AllocationError> {
        self.allocate_dyn(T::KIND, &extents)
    }

    /// Allocate an array whose kind and rank are known only at run time.
    ///
    /// The rank is `extents.len()`.
    pub fn allocate_dyn(
        &mut self,
        kind: ElementKind,
        extents: &[i64],
    ) -> Result<ArrayHandle, AllocationError> {
        let mut desc = self.fresh_descriptor(kind, extents.len())?;
        self.backend.allocate(&mut desc, extents)?;
        self.insert_allocated(desc)
    }

    /// Take ownership of `data` as a rank-`R` array without copying.
    ///
    /// `data.len()` must equal the product of `extents`; elements are in
    /// column-major order.
    pub fn from_vec<T: BlockElement, const R: usize>(
        &mut self,
        extents: [i64; R],
        data: Vec<T>,
    ) -> Result<ArrayHandle, AllocationError> {
        let mut desc = self.fresh_descriptor(T::KIND, R)?;
        self.backend.adopt(&mut desc, &extents, data)?;
        self.insert_allocated(desc)
    }

    /// Deep copy an allocated array into a new, independently owned one.
    pub fn duplicate(&mut self, handle: ArrayHandle) -> Result<ArrayHandle, AccessError> {
        let src = self.arrays.get(handle).ok_or(AccessError::StaleHandle)?;
        if let Err(err) = self.check_capacity() {
            self.backend.metrics_mut().failed_allocations += 1;
            warn!("duplicate of {handle} rejected: {err}");
            return Err(AccessError::CopyFailed(err));
        }
        let mut dst = ArrayDescriptor::new(src.kind(), src.rank());
        self.backend.duplicate(src, &mut dst)?;
        self.insert_allocated(dst).map_err(AccessError::CopyFailed)
    }

    /// View the array as rank-`R` elements of `T`.
    ///
    /// Fails with [`AccessError::TypeKindRankMismatch`] unless `T` and `R`
    /// are exactly the array's kind and rank.
    pub fn get_view<T: BlockElement, const R: usize>(
        &mut self,
        handle: ArrayHandle,
        flag: CopyFlag,
    ) -> Result<View<T>, AccessError> {
        let desc = self.arrays.get(handle).ok_or(AccessError::StaleHandle)?;
        let view = accessor::get_view::<T>(desc, R, flag)?;
        self.count_view(flag);
        Ok(view)
    }

    /// View the array with a kind and rank chosen at run time.
    pub fn get_any_view(
        &mut self,
        handle: ArrayHandle,
        kind: ElementKind,
        rank: usize,
        flag: CopyFlag,
    ) -> Result<AnyView, AccessError> {
        let desc = self.arrays.get(handle).ok_or(AccessError::StaleHandle)?;
        let view = accessor::get_any_view(desc, kind, rank, flag)?;
        self.count_view(flag);
        Ok(view)
    }

    /// Release the array's storage. The descriptor stays, `Deallocated`.
    ///
    /// A second call on the same handle fails with
    /// [`DeallocationError::DoubleFreeOrInvalidState`].
    pub fn deallocate(&mut self, handle: ArrayHandle) -> Result<(), DeallocationError> {
        let Some(desc) = self.arrays.get_mut(handle) else {
            self.backend.metrics_mut().rejected_deallocations += 1;
            warn!("deallocate rejected: stale handle {handle}");
            return Err(DeallocationError::StaleHandle);
        };
        self.backend.deallocate(desc)
    }

    /// Remove the array from the store, deallocating it first if needed.
    ///
    /// The handle goes stale.
    pub fn destroy(&mut self, handle: ArrayHandle) -> Result<(), DeallocationError> {
        let desc = self
            .arrays
            .get_mut(handle)
            .ok_or(DeallocationError::StaleHandle)?;
        if desc.state().is_allocated() {
            self.backend.deallocate(desc)?;
        }
        self.arrays.remove(handle);
        debug!("destroyed array {handle}");
        Ok(())
    }

    /// The descriptor behind `handle`.
    pub fn descriptor(&self, handle: ArrayHandle) -> Option<&ArrayDescriptor> {
        self.arrays.get(handle)
    }

    /// Lifecycle state of the array behind `handle`.
    pub fn state(&self, handle: ArrayHandle) -> Option<ArrayState> {
        self.arrays.get(handle).map(ArrayDescriptor::state)
    }

    /// Descriptors held, deallocated ones included.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the store holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.arrays.len() == 0
    }

    /// Held descriptors with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayHandle, &ArrayDescriptor)> {
        self.arrays.iter()
    }

    /// Lifecycle counters.
    pub fn metrics(&self) -> &StoreMetrics {
        self.backend.metrics()
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        self.backend.config()
    }

    /// Bytes of owned storage currently held.
    pub fn live_bytes(&self) -> usize {
        self.backend.live_bytes()
    }

    fn fresh_descriptor(
        &mut self,
        kind: ElementKind,
        rank: usize,
    ) -> Result<ArrayDescriptor, AllocationError> {
        let result = self
            .check_capacity()
            .and_then(|()| Ok(Rank::new(rank)?));
        match result {
            Ok(rank) => Ok(ArrayDescriptor::new(kind, rank)),
            Err(err) => {
                self.backend.metrics_mut().failed_allocations += 1;
                warn!("allocation of {kind} rank {rank} rejected: {err}");
                Err(err)
            }
        }
    }

    fn check_capacity(&self) -> Result<(), AllocationError> {
        let limit = self.backend.config().max_arrays;
        if self.arrays.len() >= limit {
            return Err(AllocationError::TooManyArrays { limit });
        }
        Ok(())
    }

    /// Hand an allocated descriptor to the table, undoing the allocation if
    /// the table has no slot for it.
    fn insert_allocated(&mut self, desc: ArrayDescriptor) -> Result<ArrayHandle, AllocationError> {
        match self.arrays.insert(desc) {
            Ok(handle) => {
                debug!("array {handle} created");
                Ok(handle)
            }
            Err(mut desc) => {
                self.backend.rollback(&mut desc);
                let limit = self.arrays.len();
                warn!("handle table full at {limit} arrays");
                Err(AllocationError::TooManyArrays { limit })
            }
        }
    }

    fn count_view(&mut self, flag: CopyFlag) {
        let metrics = self.backend.metrics_mut();
        match flag {
            CopyFlag::Reference => metrics.reference_views += 1,
            CopyFlag::Copy => metrics.copy_views += 1,
        }
    }
}

impl Default for ArrayStore {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            arrays: HandleTable::new(),
        }
    }
}
