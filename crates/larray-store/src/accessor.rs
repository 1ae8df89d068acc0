//! View retrieval with exact kind/rank checking.
//!
//! The accessor never coerces: a view is handed out only when the caller's
//! requested kind and rank equal the descriptor's, and only while the
//! descriptor is `Allocated`. Creating a view never changes descriptor
//! state.

use log::trace;

use larray_core::{AccessError, CopyFlag, ElementKind};

use crate::block::{AnyBlock, BlockElement, StorageBlock};
use crate::descriptor::ArrayDescriptor;
use crate::view::{AnyView, CopyView, RefView, View, ViewLayout};

/// Check that `desc` is `Allocated` and holds `requested_kind` elements of
/// rank `requested_rank`.
pub fn check_contract(
    desc: &ArrayDescriptor,
    requested_kind: ElementKind,
    requested_rank: usize,
) -> Result<(), AccessError> {
    if !desc.state().is_allocated() {
        return Err(AccessError::DoubleFreeOrInvalidState {
            state: desc.state(),
        });
    }
    if requested_kind != desc.kind() || requested_rank != desc.rank().get() {
        return Err(AccessError::TypeKindRankMismatch {
            requested_kind,
            requested_rank,
            actual_kind: desc.kind(),
            actual_rank: desc.rank().get(),
        });
    }
    Ok(())
}

/// Hand out a typed view of `desc`.
///
/// The requested kind is `T::KIND`. With [`CopyFlag::Reference`] the view
/// aliases the live storage and is invalidated by deallocation; with
/// [`CopyFlag::Copy`] it owns a snapshot taken now.
pub fn get_view<T: BlockElement>(
    desc: &ArrayDescriptor,
    requested_rank: usize,
    flag: CopyFlag,
) -> Result<View<T>, AccessError> {
    check_contract(desc, T::KIND, requested_rank)?;
    let block = desc.block_as::<T>().ok_or(AccessError::DoubleFreeOrInvalidState {
        state: desc.state(),
    })?;
    view_of(block, desc.layout(), flag)
}

/// Hand out a view of `desc` for a kind known only at run time.
pub fn get_any_view(
    desc: &ArrayDescriptor,
    requested_kind: ElementKind,
    requested_rank: usize,
    flag: CopyFlag,
) -> Result<AnyView, AccessError> {
    check_contract(desc, requested_kind, requested_rank)?;
    let block = desc.block().ok_or(AccessError::DoubleFreeOrInvalidState {
        state: desc.state(),
    })?;
    let layout = desc.layout();
    Ok(match block {
        AnyBlock::Int8(b) => AnyView::Int8(view_of(b, layout, flag)?),
        AnyBlock::Int16(b) => AnyView::Int16(view_of(b, layout, flag)?),
        AnyBlock::Int32(b) => AnyView::Int32(view_of(b, layout, flag)?),
        AnyBlock::Int64(b) => AnyView::Int64(view_of(b, layout, flag)?),
        AnyBlock::Real32(b) => AnyView::Real32(view_of(b, layout, flag)?),
        AnyBlock::Real64(b) => AnyView::Real64(view_of(b, layout, flag)?),
    })
}

fn view_of<T: BlockElement>(
    block: &StorageBlock<T>,
    layout: ViewLayout,
    flag: CopyFlag,
) -> Result<View<T>, AccessError> {
    trace!(
        "{flag} view of {} rank {} ({} elements)",
        layout.kind(),
        layout.rank(),
        layout.len()
    );
    Ok(match flag {
        CopyFlag::Reference => View::Reference(RefView::new(block.downgrade(), layout)),
        CopyFlag::Copy => View::Copy(CopyView::new(block.snapshot()?, layout)),
    })
}
