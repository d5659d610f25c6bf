use core::sync::atomic::AtomicI32;

pub(super) const NAME: &str = "builtin";

/// Same contract as a `__sync_bool_compare_and_swap`: full barrier either way.
#[inline(always)]
pub(super) fn compare_and_swap(old_value: i32, new_value: i32, value: &AtomicI32) -> bool {
    super::seq_cst_cmpxchg(value, old_value, new_value).is_ok()
}
