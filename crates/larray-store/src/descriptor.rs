//! Array descriptors: shape metadata bound to one storage block.
//!
//! An [`ArrayDescriptor`] records the element kind and rank of an array
//! (both immutable), the extents, bounds, strides and offsets set at
//! allocation time, and the lifecycle [`ArrayState`]. In the `Allocated`
//! state it owns exactly one [`AnyBlock`]; the backend is the only code
//! that binds or releases that block.

use std::fmt;

use larray_core::{ArrayState, Bounds, Dims, Element, ElementKind, Rank, Shape};

use crate::block::{AnyBlock, BlockElement, StorageBlock};
use crate::view::ViewLayout;

/// Metadata record for one local array.
pub struct ArrayDescriptor {
    kind: ElementKind,
    rank: Rank,
    extents: Dims<usize>,
    bounds: Bounds,
    /// Layout metadata for aliased storage. Zero for owned storage.
    strides: Dims<i64>,
    /// Layout metadata for aliased storage. Zero for owned storage.
    offsets: Dims<i64>,
    contiguous: bool,
    state: ArrayState,
    block: Option<AnyBlock>,
}

impl ArrayDescriptor {
    /// Create an `Unallocated` descriptor for the given kind and rank.
    pub fn new(kind: ElementKind, rank: Rank) -> Self {
        Self {
            kind,
            rank,
            extents: Dims::new(),
            bounds: Bounds::empty(),
            strides: Dims::new(),
            offsets: Dims::new(),
            contiguous: true,
            state: ArrayState::Unallocated,
            block: None,
        }
    }

    /// Create an `Unallocated` descriptor whose kind is taken from `T`.
    pub fn for_element<T: Element>(rank: Rank) -> Self {
        Self::new(T::KIND, rank)
    }

    /// Element kind. Fixed at creation.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Rank. Fixed at creation.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Lifecycle state.
    pub fn state(&self) -> ArrayState {
        self.state
    }

    /// Element count per dimension. Empty unless `Allocated`.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Inclusive index bounds. Empty unless `Allocated`.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Inclusive lower bound per dimension.
    pub fn lower_bounds(&self) -> &[i64] {
        self.bounds.lower()
    }

    /// Inclusive upper bound per dimension.
    pub fn upper_bounds(&self) -> &[i64] {
        self.bounds.upper()
    }

    /// Per-dimension strides.
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    /// Per-dimension offsets.
    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    /// Whether the storage has no gaps. Always true for owned storage.
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// Total number of elements; zero unless `Allocated`.
    pub fn element_count(&self) -> usize {
        self.block.as_ref().map_or(0, AnyBlock::len)
    }

    /// Size of the bound storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.as_ref().map_or(0, AnyBlock::memory_bytes)
    }

    /// Whether `extents` fits this descriptor: one non-negative extent per
    /// dimension.
    pub fn validate_shape(&self, extents: &[i64]) -> bool {
        extents.len() == self.rank.get() && extents.iter().all(|&e| e >= 0)
    }

    /// Bounds for `extents`: `lower[i] = 1`, `upper[i] = extents[i]`.
    pub fn compute_bounds(&self, extents: &[usize]) -> Bounds {
        Bounds::one_based(extents)
    }

    /// The bound storage, if any.
    pub fn block(&self) -> Option<&AnyBlock> {
        self.block.as_ref()
    }

    /// The bound storage as elements of `T`, if allocated with that kind.
    pub fn block_as<T: BlockElement>(&self) -> Option<&StorageBlock<T>> {
        self.block.as_ref()?.downcast_ref::<T>()
    }

    /// Check the descriptor's structural invariants.
    ///
    /// Allocated descriptors must have bounds matching their extents, one
    /// stride and offset per dimension, and a block of their own kind
    /// holding exactly the product of the extents. Other states hold no
    /// block and no shape.
    pub fn is_consistent(&self) -> bool {
        match (&self.block, self.state) {
            (Some(block), ArrayState::Allocated) => {
                let rank = self.rank.get();
                self.extents.len() == rank
                    && self.bounds.matches_extents(&self.extents)
                    && self.strides.len() == rank
                    && self.offsets.len() == rank
                    && block.kind() == self.kind
                    && larray_core::element_count(&self.extents) == Some(block.len())
            }
            (None, ArrayState::Unallocated | ArrayState::Deallocated) => {
                self.extents.is_empty() && self.bounds.rank() == 0
            }
            _ => false,
        }
    }

    /// Layout metadata handed to views.
    pub(crate) fn layout(&self) -> ViewLayout {
        ViewLayout::new(self.kind, self.bounds.clone(), self.element_count())
    }

    /// Attach freshly owned contiguous storage and mark `Allocated`.
    ///
    /// The caller has validated the shape, kind and state.
    pub(crate) fn bind(&mut self, shape: &Shape, block: AnyBlock) {
        debug_assert_eq!(self.state, ArrayState::Unallocated);
        debug_assert_eq!(block.kind(), self.kind);
        let rank = shape.rank().get();
        self.extents = shape.extents().iter().copied().collect();
        self.bounds = self.compute_bounds(shape.extents());
        self.strides = Dims::from_elem(0, rank);
        self.offsets = Dims::from_elem(0, rank);
        self.contiguous = true;
        self.block = Some(block);
        self.state = ArrayState::Allocated;
    }

    /// Detach the storage and mark `Deallocated`.
    pub(crate) fn release(&mut self) -> Option<AnyBlock> {
        self.extents.clear();
        self.bounds = Bounds::empty();
        self.strides.clear();
        self.offsets.clear();
        self.state = ArrayState::Deallocated;
        self.block.take()
    }
}

impl fmt::Debug for ArrayDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayDescriptor")
            .field("kind", &self.kind)
            .field("rank", &self.rank)
            .field("extents", &self.extents)
            .field("bounds", &self.bounds)
            .field("strides", &self.strides)
            .field("offsets", &self.offsets)
            .field("contiguous", &self.contiguous)
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Display for ArrayDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.kind, self.rank, self.state)?;
        if self.state.is_allocated() {
            write!(f, " {} ({} elements)", self.bounds, self.element_count())?;
        }
        Ok(())
    }
}
