//! Capacity growth.
//!
//! The default policy is exact fit plus constant headroom: a buffer that
//! needs `required` bytes is reallocated to `default_capacity + required`.
//! Every growth step is a full allocate + copy + release, so many small
//! appends that each cross the capacity cost quadratic time in total.
//! Callers that append in a tight loop can opt into [`GrowthPolicy::Doubling`]
//! instead, at the price of different capacity values.

use sevbuf_membrane::{Allocator, Block};

/// Reallocation policy used when an append does not fit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// New capacity is `default_capacity + required`.
    #[default]
    ExactFit,
    /// Capacity doubles from its current value until it covers `required`.
    Doubling,
}

impl GrowthPolicy {
    /// Capacity to allocate so that `required` bytes fit.
    ///
    /// Returns `None` when the computation overflows `usize`.
    #[must_use]
    pub fn next_capacity(
        self,
        current: usize,
        required: usize,
        default_capacity: usize,
    ) -> Option<usize> {
        match self {
            Self::ExactFit => default_capacity.checked_add(required),
            Self::Doubling => {
                let mut capacity = current.max(1);
                while capacity < required {
                    capacity = capacity.checked_mul(2)?;
                }
                Some(capacity)
            }
        }
    }
}

/// Move the first `text_len` bytes of `block` into a fresh allocation of
/// exactly `new_capacity` bytes and release the old one.
///
/// Returns `None` when the allocator refuses the request or hands back a
/// block of any other length; `block` is untouched in that case.
pub(crate) fn regrow<A: Allocator>(
    allocator: &A,
    block: &mut Block,
    text_len: usize,
    new_capacity: usize,
) -> Option<()> {
    let mut fresh = allocator.allocate(new_capacity)?;
    if fresh.len() != new_capacity || new_capacity <= text_len {
        allocator.release(fresh);
        return None;
    }
    let dst = fresh.as_mut_slice();
    dst[..text_len].copy_from_slice(&block.as_slice()[..text_len]);
    dst[text_len] = 0;
    let old = std::mem::replace(block, fresh);
    allocator.release(old);
    Some(())
}

/// Grow `block` so that it holds at least `required` bytes.
///
/// Returns the new capacity, or `None` if the capacity computation
/// overflows or the allocation fails.
pub(crate) fn grow_to<A: Allocator>(
    allocator: &A,
    policy: GrowthPolicy,
    default_capacity: usize,
    block: &mut Block,
    text_len: usize,
    required: usize,
) -> Option<usize> {
    let new_capacity = policy.next_capacity(block.len(), required, default_capacity)?;
    regrow(allocator, block, text_len, new_capacity)?;
    Some(new_capacity)
}
