//! Typed views handed out by the accessor.
//!
//! A [`RefView`] aliases the live storage of an array through a `Weak`
//! pointer: writes through one reference view are visible through every
//! other, and once the source array is deallocated every access fails with
//! [`ViewError::Invalidated`]. A [`CopyView`] owns an independent snapshot
//! and is released by dropping it.
//!
//! Elements are addressed by inclusive multi-indices within the array's
//! bounds (1-based for storage allocated here) in column-major order, or by
//! a zero-based linear offset.

use std::fmt;
use std::rc::Weak;

use larray_core::{Bounds, CopyFlag, Dims, Element, ElementKind, ViewError};

use crate::block::Shared;

/// Shape metadata carried by every view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewLayout {
    kind: ElementKind,
    bounds: Bounds,
    len: usize,
}

impl ViewLayout {
    pub(crate) fn new(kind: ElementKind, bounds: Bounds, len: usize) -> Self {
        Self { kind, bounds, len }
    }

    /// Element kind of the viewed array.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Rank of the viewed array.
    pub fn rank(&self) -> usize {
        self.bounds.rank()
    }

    /// Index bounds of the viewed array.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Extents derived from the bounds.
    pub fn extents(&self) -> Dims<usize> {
        self.bounds.extents()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn offset_of(&self, index: &[i64]) -> Result<usize, ViewError> {
        if index.len() != self.rank() {
            return Err(ViewError::RankMismatch {
                expected: self.rank(),
                found: index.len(),
            });
        }
        self.bounds
            .linear_index(index)
            .ok_or_else(|| ViewError::IndexOutOfBounds {
                index: index.to_vec(),
            })
    }

    fn check_offset(&self, offset: usize) -> Result<usize, ViewError> {
        if offset < self.len {
            Ok(offset)
        } else {
            Err(ViewError::OffsetOutOfBounds {
                offset,
                len: self.len,
            })
        }
    }
}

/// Non-owning view aliasing an array's storage.
///
/// Cloning a reference view yields another alias of the same storage.
pub struct RefView<T> {
    block: Weak<Shared<T>>,
    layout: ViewLayout,
}

impl<T: Element> RefView<T> {
    pub(crate) fn new(block: Weak<Shared<T>>, layout: ViewLayout) -> Self {
        Self { block, layout }
    }

    /// Shape metadata.
    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }

    /// Whether the source array still holds its storage.
    pub fn is_valid(&self) -> bool {
        self.block.strong_count() > 0
    }

    /// Whether two reference views alias the same storage.
    pub fn aliases(&self, other: &RefView<T>) -> bool {
        Weak::ptr_eq(&self.block, &other.block)
    }

    /// Run `f` over the live elements.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R, ViewError> {
        let block = self.block.upgrade().ok_or(ViewError::Invalidated)?;
        let data = block.try_borrow().map_err(|_| ViewError::Busy)?;
        let out = f(&data);
        Ok(out)
    }

    /// Run `f` over the live elements, mutably.
    ///
    /// Takes `&self`: writes are visible through every alias of the same
    /// storage. Nested access to that storage from inside `f`
    /// fails with [`ViewError::Busy`].
    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, ViewError> {
        let block = self.block.upgrade().ok_or(ViewError::Invalidated)?;
        let mut data = block.try_borrow_mut().map_err(|_| ViewError::Busy)?;
        let out = f(&mut data);
        Ok(out)
    }

    /// Read the element at a multi-index.
    pub fn get(&self, index: &[i64]) -> Result<T, ViewError> {
        let offset = self.layout.offset_of(index)?;
        self.with_slice(|data| data[offset])
    }

    /// Write the element at a multi-index.
    pub fn set(&self, index: &[i64], value: T) -> Result<(), ViewError> {
        let offset = self.layout.offset_of(index)?;
        self.with_slice_mut(|data| data[offset] = value)
    }

    /// Read the element at a linear offset.
    pub fn get_linear(&self, offset: usize) -> Result<T, ViewError> {
        let offset = self.layout.check_offset(offset)?;
        self.with_slice(|data| data[offset])
    }

    /// Write the element at a linear offset.
    pub fn set_linear(&self, offset: usize, value: T) -> Result<(), ViewError> {
        let offset = self.layout.check_offset(offset)?;
        self.with_slice_mut(|data| data[offset] = value)
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: T) -> Result<(), ViewError> {
        self.with_slice_mut(|data| data.fill(value))
    }

    /// Copy the current elements out.
    pub fn to_vec(&self) -> Result<Vec<T>, ViewError> {
        self.with_slice(<[T]>::to_vec)
    }
}

impl<T> fmt::Debug for RefView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefView")
            .field("layout", &self.layout)
            .field("valid", &(self.block.strong_count() > 0))
            .finish()
    }
}

impl<T> Clone for RefView<T> {
    fn clone(&self) -> Self {
        Self {
            block: Weak::clone(&self.block),
            layout: self.layout.clone(),
        }
    }
}

/// Owning view of an independent copy of an array.
#[derive(Clone, Debug, PartialEq)]
pub struct CopyView<T> {
    data: Vec<T>,
    layout: ViewLayout,
}

impl<T: Element> CopyView<T> {
    pub(crate) fn new(data: Vec<T>, layout: ViewLayout) -> Self {
        debug_assert_eq!(data.len(), layout.len());
        Self { data, layout }
    }

    /// Shape metadata.
    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }

    /// The copied elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The copied elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Read the element at a multi-index.
    pub fn get(&self, index: &[i64]) -> Result<T, ViewError> {
        let offset = self.layout.offset_of(index)?;
        Ok(self.data[offset])
    }

    /// Write the element at a multi-index.
    pub fn set(&mut self, index: &[i64], value: T) -> Result<(), ViewError> {
        let offset = self.layout.offset_of(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Read the element at a linear offset.
    pub fn get_linear(&self, offset: usize) -> Result<T, ViewError> {
        let offset = self.layout.check_offset(offset)?;
        Ok(self.data[offset])
    }

    /// Write the element at a linear offset.
    pub fn set_linear(&mut self, offset: usize, value: T) -> Result<(), ViewError> {
        let offset = self.layout.check_offset(offset)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Take the copied elements.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Release the copy. Equivalent to dropping it.
    pub fn release(self) {}
}

/// A view returned by the accessor: either an alias or a copy.
#[derive(Debug)]
pub enum View<T> {
    /// Non-owning alias of the live storage.
    Reference(RefView<T>),
    /// Owning independent snapshot.
    Copy(CopyView<T>),
}

impl<T: Element> View<T> {
    /// Which flag produced this view.
    pub fn copy_flag(&self) -> CopyFlag {
        match self {
            Self::Reference(_) => CopyFlag::Reference,
            Self::Copy(_) => CopyFlag::Copy,
        }
    }

    /// Shape metadata.
    pub fn layout(&self) -> &ViewLayout {
        match self {
            Self::Reference(v) => v.layout(),
            Self::Copy(v) => v.layout(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.layout().len()
    }

    /// Whether the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.layout().is_empty()
    }

    /// Whether the view may be read. Copy views are always valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Reference(v) => v.is_valid(),
            Self::Copy(_) => true,
        }
    }

    /// Read the element at a multi-index.
    pub fn get(&self, index: &[i64]) -> Result<T, ViewError> {
        match self {
            Self::Reference(v) => v.get(index),
            Self::Copy(v) => v.get(index),
        }
    }

    /// Write the element at a multi-index.
    pub fn set(&mut self, index: &[i64], value: T) -> Result<(), ViewError> {
        match self {
            Self::Reference(v) => v.set(index, value),
            Self::Copy(v) => v.set(index, value),
        }
    }

    /// Run `f` over the elements.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R, ViewError> {
        match self {
            Self::Reference(v) => v.with_slice(f),
            Self::Copy(v) => Ok(f(v.as_slice())),
        }
    }

    /// Run `f` over the elements, mutably.
    pub fn with_slice_mut<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, ViewError> {
        match self {
            Self::Reference(v) => v.with_slice_mut(f),
            Self::Copy(v) => Ok(f(v.as_mut_slice())),
        }
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) -> Result<(), ViewError> {
        self.with_slice_mut(|data| data.fill(value))
    }

    /// Copy the current elements out.
    pub fn to_vec(&self) -> Result<Vec<T>, ViewError> {
        self.with_slice(<[T]>::to_vec)
    }

    /// The reference view, if this is one.
    pub fn as_reference(&self) -> Option<&RefView<T>> {
        match self {
            Self::Reference(v) => Some(v),
            Self::Copy(_) => None,
        }
    }

    /// The copy view, if this is one.
    pub fn into_copy(self) -> Option<CopyView<T>> {
        match self {
            Self::Reference(_) => None,
            Self::Copy(v) => Some(v),
        }
    }
}

/// A [`View`] of any element kind, for callers that only know the kind at
/// run time.
#[derive(Debug)]
pub enum AnyView {
    /// `i8` view.
    Int8(View<i8>),
    /// `i16` view.
    Int16(View<i16>),
    /// `i32` view.
    Int32(View<i32>),
    /// `i64` view.
    Int64(View<i64>),
    /// `f32` view.
    Real32(View<f32>),
    /// `f64` view.
    Real64(View<f64>),
}

macro_rules! for_each_view {
    ($view:expr, $v:ident => $body:expr) => {
        match $view {
            AnyView::Int8($v) => $body,
            AnyView::Int16($v) => $body,
            AnyView::Int32($v) => $body,
            AnyView::Int64($v) => $body,
            AnyView::Real32($v) => $body,
            AnyView::Real64($v) => $body,
        }
    };
}

impl AnyView {
    /// Element kind of the view.
    pub fn kind(&self) -> ElementKind {
        for_each_view!(self, v => v.layout().kind())
    }

    /// Shape metadata.
    pub fn layout(&self) -> &ViewLayout {
        for_each_view!(self, v => v.layout())
    }

    /// Which flag produced this view.
    pub fn copy_flag(&self) -> CopyFlag {
        for_each_view!(self, v => v.copy_flag())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.layout().len()
    }

    /// Whether the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.layout().is_empty()
    }

    /// Whether the view may be read.
    pub fn is_valid(&self) -> bool {
        for_each_view!(self, v => v.is_valid())
    }

    /// The typed view, if it holds elements of type `T`.
    pub fn downcast<T: crate::block::BlockElement>(self) -> Option<View<T>> {
        T::from_any_view(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::StorageBlock;

    fn layout(kind: ElementKind, extents: &[usize]) -> ViewLayout {
        let len = extents.iter().product();
        ViewLayout::new(kind, Bounds::one_based(extents), len)
    }

    #[test]
    fn reference_views_alias() {
        let block = StorageBlock::<f64>::zeroed(12).unwrap();
        let a = RefView::new(block.downgrade(), layout(ElementKind::Real64, &[3, 4]));
        let b = a.clone();
        a.set(&[2, 3], 7.5).unwrap();
        assert_eq!(b.get(&[2, 3]).unwrap(), 7.5);
        assert!(a.aliases(&b));
    }

    #[test]
    fn reference_view_invalidated_when_block_dropped() {
        let block = StorageBlock::<i32>::zeroed(4).unwrap();
        let view = RefView::new(block.downgrade(), layout(ElementKind::Int32, &[4]));
        assert!(view.is_valid());
        drop(block);
        assert!(!view.is_valid());
        assert_eq!(view.get(&[1]), Err(ViewError::Invalidated));
        assert_eq!(view.to_vec(), Err(ViewError::Invalidated));
    }

    #[test]
    fn nested_mutable_access_is_busy() {
        let block = StorageBlock::<i16>::zeroed(2).unwrap();
        let view = RefView::new(block.downgrade(), layout(ElementKind::Int16, &[2]));
        let inner = view
            .with_slice_mut(|_| view.get_linear(0))
            .unwrap();
        assert_eq!(inner, Err(ViewError::Busy));
    }

    #[test]
    fn index_errors() {
        let block = StorageBlock::<f32>::zeroed(6).unwrap();
        let view = RefView::new(block.downgrade(), layout(ElementKind::Real32, &[2, 3]));
        assert_eq!(
            view.get(&[1]),
            Err(ViewError::RankMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            view.get(&[3, 1]),
            Err(ViewError::IndexOutOfBounds { index: vec![3, 1] })
        );
        assert_eq!(
            view.get_linear(6),
            Err(ViewError::OffsetOutOfBounds { offset: 6, len: 6 })
        );
    }

    #[test]
    fn copy_view_owns_its_data() {
        let mut copy = CopyView::new(vec![1i64, 2, 3, 4], layout(ElementKind::Int64, &[2, 2]));
        assert_eq!(copy.get(&[1, 2]).unwrap(), 3);
        copy.set(&[2, 2], 40).unwrap();
        assert_eq!(copy.as_slice(), &[1, 2, 3, 40]);
        assert_eq!(copy.into_vec(), vec![1, 2, 3, 40]);
    }

    #[test]
    fn view_enum_dispatches() {
        let block = StorageBlock::<i8>::zeroed(3).unwrap();
        let mut view = View::Reference(RefView::new(
            block.downgrade(),
            layout(ElementKind::Int8, &[3]),
        ));
        assert_eq!(view.copy_flag(), CopyFlag::Reference);
        view.fill(5).unwrap();
        assert_eq!(view.to_vec().unwrap(), vec![5, 5, 5]);
        assert!(view.into_copy().is_none());
    }

    #[test]
    fn any_view_downcast() {
        let view = View::Copy(CopyView::new(vec![1.0f32], layout(ElementKind::Real32, &[1])));
        let any = AnyView::Real32(view);
        assert_eq!(any.kind(), ElementKind::Real32);
        assert_eq!(any.copy_flag(), CopyFlag::Copy);
        assert!(any.downcast::<f32>().is_some());

        let view = View::Copy(CopyView::new(vec![1.0f32], layout(ElementKind::Real32, &[1])));
        assert!(AnyView::Real32(view).downcast::<f64>().is_none());
    }
}
