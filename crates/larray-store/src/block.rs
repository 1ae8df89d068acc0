//! Contiguous storage blocks and their kind-erased wrapper.
//!
//! A [`StorageBlock`] is one exclusively owned, contiguous, zero-initialised
//! buffer. The descriptor holds the only strong reference; reference views
//! hold a `Weak` and therefore never keep released storage alive.
//! [`AnyBlock`] erases the element type so descriptors of every kind can
//! live in one table.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use larray_core::{AccessError, AllocationError, Element, ElementKind};

use crate::view::{AnyView, View};

/// Shared cell holding a block's elements.
pub(crate) type Shared<T> = RefCell<Vec<T>>;

/// One contiguous buffer of `T`.
///
/// Blocks are never resized: the element count is fixed at creation and
/// equals the product of the owning descriptor's extents.
pub struct StorageBlock<T> {
    data: Rc<Shared<T>>,
    len: usize,
}

impl<T: Element> StorageBlock<T> {
    /// Allocate `len` zero-valued elements.
    ///
    /// Uses a fallible reservation, so an allocator refusal surfaces as
    /// [`AllocationError::OutOfMemory`] instead of aborting the process.
    pub fn zeroed(len: usize) -> Result<Self, AllocationError> {
        let mut data = try_with_capacity::<T>(len)?;
        data.resize(len, T::default());
        Ok(Self::from_vec(data))
    }

    /// Take ownership of existing elements.
    pub fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            data: Rc::new(RefCell::new(data)),
            len,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element kind of this block.
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    /// Size of the elements in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.len * T::KIND.size_bytes()
    }

    /// Copy the current contents into a fresh, independently owned vector.
    pub fn snapshot(&self) -> Result<Vec<T>, AccessError> {
        let data = self.data.try_borrow().map_err(|_| AccessError::Busy)?;
        let mut copy = try_with_capacity::<T>(self.len).map_err(AccessError::CopyFailed)?;
        copy.extend_from_slice(&data);
        Ok(copy)
    }

    /// Non-owning pointer for reference views.
    pub(crate) fn downgrade(&self) -> Weak<Shared<T>> {
        Rc::downgrade(&self.data)
    }
}

fn try_with_capacity<T: Element>(len: usize) -> Result<Vec<T>, AllocationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| AllocationError::OutOfMemory {
            requested: len.saturating_mul(T::KIND.size_bytes()),
        })?;
    Ok(data)
}

/// A [`StorageBlock`] of any supported element kind.
pub enum AnyBlock {
    /// `i8` elements.
    Int8(StorageBlock<i8>),
    /// `i16` elements.
    Int16(StorageBlock<i16>),
    /// `i32` elements.
    Int32(StorageBlock<i32>),
    /// `i64` elements.
    Int64(StorageBlock<i64>),
    /// `f32` elements.
    Real32(StorageBlock<f32>),
    /// `f64` elements.
    Real64(StorageBlock<f64>),
}

macro_rules! for_each_block {
    ($block:expr, $b:ident => $body:expr) => {
        match $block {
            AnyBlock::Int8($b) => $body,
            AnyBlock::Int16($b) => $body,
            AnyBlock::Int32($b) => $body,
            AnyBlock::Int64($b) => $body,
            AnyBlock::Real32($b) => $body,
            AnyBlock::Real64($b) => $body,
        }
    };
}

impl AnyBlock {
    /// Allocate `len` zero-valued elements of `kind`.
    pub fn zeroed(kind: ElementKind, len: usize) -> Result<Self, AllocationError> {
        Ok(match kind {
            ElementKind::Int8 => Self::Int8(StorageBlock::zeroed(len)?),
            ElementKind::Int16 => Self::Int16(StorageBlock::zeroed(len)?),
            ElementKind::Int32 => Self::Int32(StorageBlock::zeroed(len)?),
            ElementKind::Int64 => Self::Int64(StorageBlock::zeroed(len)?),
            ElementKind::Real32 => Self::Real32(StorageBlock::zeroed(len)?),
            ElementKind::Real64 => Self::Real64(StorageBlock::zeroed(len)?),
        })
    }

    /// Element kind of the wrapped block.
    pub fn kind(&self) -> ElementKind {
        for_each_block!(self, b => b.kind())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        for_each_block!(self, b => b.len())
    }

    /// Whether the block holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the elements in bytes.
    pub fn memory_bytes(&self) -> usize {
        for_each_block!(self, b => b.memory_bytes())
    }

    /// Deep copy into a new, independently owned block of the same kind.
    pub fn try_clone(&self) -> Result<Self, AccessError> {
        Ok(match self {
            Self::Int8(b) => Self::Int8(StorageBlock::from_vec(b.snapshot()?)),
            Self::Int16(b) => Self::Int16(StorageBlock::from_vec(b.snapshot()?)),
            Self::Int32(b) => Self::Int32(StorageBlock::from_vec(b.snapshot()?)),
            Self::Int64(b) => Self::Int64(StorageBlock::from_vec(b.snapshot()?)),
            Self::Real32(b) => Self::Real32(StorageBlock::from_vec(b.snapshot()?)),
            Self::Real64(b) => Self::Real64(StorageBlock::from_vec(b.snapshot()?)),
        })
    }

    /// The typed block, if it holds elements of type `T`.
    pub fn downcast_ref<T: BlockElement>(&self) -> Option<&StorageBlock<T>> {
        T::block_ref(self)
    }
}

/// An [`Element`] that can be stored in an [`AnyBlock`] and viewed through
/// an [`AnyView`].
///
/// Implemented for every element type; the mapping mirrors
/// [`Element::KIND`].
pub trait BlockElement: Element {
    /// Wrap a typed block.
    fn into_any_block(block: StorageBlock<Self>) -> AnyBlock;

    /// Borrow the typed block out of a wrapper of the matching kind.
    fn block_ref(block: &AnyBlock) -> Option<&StorageBlock<Self>>;

    /// Unwrap a view of the matching kind.
    fn from_any_view(view: AnyView) -> Option<View<Self>>;
}

macro_rules! impl_block_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl BlockElement for $ty {
                fn into_any_block(block: StorageBlock<Self>) -> AnyBlock {
                    AnyBlock::$variant(block)
                }

                fn block_ref(block: &AnyBlock) -> Option<&StorageBlock<Self>> {
                    match block {
                        AnyBlock::$variant(b) => Some(b),
                        _ => None,
                    }
                }

                fn from_any_view(view: AnyView) -> Option<View<Self>> {
                    match view {
                        AnyView::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_block_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Real32,
    f64 => Real64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_block_is_zero() {
        let block = StorageBlock::<f64>::zeroed(12).unwrap();
        assert_eq!(block.len(), 12);
        assert_eq!(block.memory_bytes(), 96);
        assert!(block.snapshot().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_block_is_valid() {
        let block = StorageBlock::<i32>::zeroed(0).unwrap();
        assert!(block.is_empty());
        assert!(block.snapshot().unwrap().is_empty());
    }

    #[test]
    fn oversized_reservation_is_an_error_not_an_abort() {
        let result = StorageBlock::<i64>::zeroed(usize::MAX / 4);
        assert!(matches!(result, Err(AllocationError::OutOfMemory { .. })));
    }

    #[test]
    fn weak_pointer_dies_with_block() {
        let block = StorageBlock::<i16>::zeroed(4).unwrap();
        let weak = block.downgrade();
        assert!(weak.upgrade().is_some());
        drop(block);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn any_block_reports_kind_and_size() {
        for kind in ElementKind::ALL {
            let block = AnyBlock::zeroed(kind, 5).unwrap();
            assert_eq!(block.kind(), kind);
            assert_eq!(block.len(), 5);
            assert_eq!(block.memory_bytes(), 5 * kind.size_bytes());
        }
    }

    #[test]
    fn downcast_only_matches_own_kind() {
        let block = AnyBlock::zeroed(ElementKind::Real32, 3).unwrap();
        assert!(block.downcast_ref::<f32>().is_some());
        assert!(block.downcast_ref::<f64>().is_none());
        assert!(block.downcast_ref::<i32>().is_none());
    }

    #[test]
    fn try_clone_is_independent() {
        let block = AnyBlock::Int32(StorageBlock::from_vec(vec![1, 2, 3]));
        let copy = block.try_clone().unwrap();
        if let AnyBlock::Int32(b) = &block {
            b.data.borrow_mut()[0] = 99;
        }
        let copied = copy.downcast_ref::<i32>().unwrap().snapshot().unwrap();
        assert_eq!(copied, vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_while_mutably_borrowed_is_busy() {
        let block = StorageBlock::<i8>::zeroed(2).unwrap();
        let _guard = block.data.borrow_mut();
        assert_eq!(block.snapshot(), Err(AccessError::Busy));
    }
}
