//! Storage backend: allocation and release of descriptor-owned blocks.
//!
//! The backend is the only component that binds storage to a
//! [`ArrayDescriptor`] or releases it. Every operation validates first and
//! commits last, so a failed call leaves the descriptor exactly as it was.
//! Byte accounting against [`StoreConfig::byte_budget`] happens here.

use log::{debug, warn};

use larray_core::{
    AccessError, AllocationError, ArrayState, DeallocationError, Dims, ElementKind, Shape,
};

use crate::block::{AnyBlock, BlockElement, StorageBlock};
use crate::config::{ConfigError, StoreConfig};
use crate::descriptor::ArrayDescriptor;
use crate::metrics::StoreMetrics;

/// Owns the byte budget and lifecycle counters for a set of descriptors.
#[derive(Debug, Default)]
pub struct StorageBackend {
    config: StoreConfig,
    metrics: StoreMetrics,
}

impl StorageBackend {
    /// Create a backend after validating `config`.
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: StoreMetrics::default(),
        })
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Lifecycle counters.
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut StoreMetrics {
        &mut self.metrics
    }

    /// Bytes of storage currently bound to descriptors.
    pub fn live_bytes(&self) -> usize {
        self.metrics.live_bytes
    }

    /// Bytes still available under the budget.
    pub fn available_bytes(&self) -> usize {
        self.config.byte_budget.saturating_sub(self.metrics.live_bytes)
    }

    /// Allocate zero-initialised contiguous storage for `desc`.
    ///
    /// `desc` must be `Unallocated` and `extents` must hold one
    /// non-negative extent per dimension. A zero extent is valid and binds
    /// an empty block. On success the descriptor gets 1-based bounds, zero
    /// strides and offsets, and the `Allocated` state. On failure it is
    /// left untouched.
    pub fn allocate(
        &mut self,
        desc: &mut ArrayDescriptor,
        extents: &[i64],
    ) -> Result<(), AllocationError> {
        let result = self.try_allocate(desc, extents);
        self.note_failure(desc, &result);
        result
    }

    fn try_allocate(
        &mut self,
        desc: &mut ArrayDescriptor,
        extents: &[i64],
    ) -> Result<(), AllocationError> {
        require_unallocated(desc)?;
        let shape = Shape::new(desc.rank(), extents)?;
        let bytes = self.reserve(desc.kind(), shape.element_count())?;
        let block = AnyBlock::zeroed(desc.kind(), shape.element_count())?;
        self.commit(desc, &shape, block, bytes);
        Ok(())
    }

    /// Bind caller-supplied elements to `desc` without copying.
    ///
    /// `T` must match the descriptor's kind and `data.len()` must equal
    /// the product of `extents`.
    pub fn adopt<T: BlockElement>(
        &mut self,
        desc: &mut ArrayDescriptor,
        extents: &[i64],
        data: Vec<T>,
    ) -> Result<(), AllocationError> {
        let result = self.try_adopt(desc, extents, data);
        self.note_failure(desc, &result);
        result
    }

    fn try_adopt<T: BlockElement>(
        &mut self,
        desc: &mut ArrayDescriptor,
        extents: &[i64],
        data: Vec<T>,
    ) -> Result<(), AllocationError> {
        require_unallocated(desc)?;
        if T::KIND != desc.kind() {
            return Err(AllocationError::KindMismatch {
                expected: desc.kind(),
                found: T::KIND,
            });
        }
        let shape = Shape::new(desc.rank(), extents)?;
        if data.len() != shape.element_count() {
            return Err(AllocationError::LengthMismatch {
                expected: shape.element_count(),
                found: data.len(),
            });
        }
        let bytes = self.reserve(desc.kind(), data.len())?;
        let block = T::into_any_block(StorageBlock::from_vec(data));
        self.commit(desc, &shape, block, bytes);
        Ok(())
    }

    /// Deep copy `src` into the `Unallocated` descriptor `dst`.
    ///
    /// `dst` must have the same kind and rank as `src`. The copy is owned by
    /// `dst` and counts against the byte budget.
    pub fn duplicate(
        &mut self,
        src: &ArrayDescriptor,
        dst: &mut ArrayDescriptor,
    ) -> Result<(), AccessError> {
        let result = self.try_duplicate(src, dst);
        if let Err(err) = &result {
            self.metrics.failed_allocations += 1;
            warn!("duplicate of {src} rejected: {err}");
        }
        result
    }

    fn try_duplicate(
        &mut self,
        src: &ArrayDescriptor,
        dst: &mut ArrayDescriptor,
    ) -> Result<(), AccessError> {
        let block = match (src.state(), src.block()) {
            (ArrayState::Allocated, Some(block)) => block,
            (state, _) => return Err(AccessError::DoubleFreeOrInvalidState { state }),
        };
        if dst.kind() != src.kind() || dst.rank() != src.rank() {
            return Err(AccessError::TypeKindRankMismatch {
                requested_kind: dst.kind(),
                requested_rank: dst.rank().get(),
                actual_kind: src.kind(),
                actual_rank: src.rank().get(),
            });
        }
        require_unallocated(dst).map_err(AccessError::CopyFailed)?;
        let extents: Dims<i64> = src.extents().iter().map(|&e| e as i64).collect();
        let shape = Shape::new(src.rank(), &extents)
            .map_err(|e| AccessError::CopyFailed(e.into()))?;
        let bytes = self
            .reserve(src.kind(), block.len())
            .map_err(AccessError::CopyFailed)?;
        let copy = block.try_clone()?;
        self.commit(dst, &shape, copy, bytes);
        Ok(())
    }

    /// Release the storage bound to `desc` and mark it `Deallocated`.
    ///
    /// Fails with [`DeallocationError::DoubleFreeOrInvalidState`] unless the
    /// descriptor is `Allocated`. Reference views of the released storage
    /// become invalid.
    pub fn deallocate(&mut self, desc: &mut ArrayDescriptor) -> Result<(), DeallocationError> {
        if !desc.state().is_allocated() {
            self.metrics.rejected_deallocations += 1;
            warn!("deallocate rejected: descriptor {desc} is not allocated");
            return Err(DeallocationError::DoubleFreeOrInvalidState {
                state: desc.state(),
            });
        }
        let bytes = desc.memory_bytes();
        drop(desc.release());
        self.metrics.record_deallocation(bytes);
        debug!("deallocated {} {}D ({bytes} bytes)", desc.kind(), desc.rank().get());
        Ok(())
    }

    /// Undo a just-committed allocation whose descriptor could not be kept.
    ///
    /// The storage is released and the attempt is counted as a failed
    /// allocation rather than a deallocation. No-op unless `Allocated`.
    pub(crate) fn rollback(&mut self, desc: &mut ArrayDescriptor) {
        if !desc.state().is_allocated() {
            return;
        }
        let bytes = desc.memory_bytes();
        drop(desc.release());
        self.metrics.record_rollback(bytes);
        warn!("rolled back allocation of {} {}D ({bytes} bytes)", desc.kind(), desc.rank().get());
    }

    /// Byte size of `count` elements of `kind`, if it fits the budget.
    fn reserve(&self, kind: ElementKind, count: usize) -> Result<usize, AllocationError> {
        let bytes = count
            .checked_mul(kind.size_bytes())
            .ok_or(AllocationError::SizeOverflow {
                elements: count,
                kind,
            })?;
        let available = self.available_bytes();
        if bytes > available {
            return Err(AllocationError::CapacityExceeded {
                requested: bytes,
                available,
            });
        }
        Ok(bytes)
    }

    fn commit(&mut self, desc: &mut ArrayDescriptor, shape: &Shape, block: AnyBlock, bytes: usize) {
        desc.bind(shape, block);
        self.metrics.record_allocation(bytes);
        debug!("allocated {} {shape} ({bytes} bytes)", desc.kind());
    }

    fn note_failure(&mut self, desc: &ArrayDescriptor, result: &Result<(), AllocationError>) {
        if let Err(err) = result {
            self.metrics.failed_allocations += 1;
            warn!("allocation for {desc} failed: {err}");
        }
    }
}

fn require_unallocated(desc: &ArrayDescriptor) -> Result<(), AllocationError> {
    match desc.state() {
        ArrayState::Unallocated => Ok(()),
        state => Err(AllocationError::InvalidState { state }),
    }
}
