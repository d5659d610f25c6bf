#![cfg(windows)]

use core::sync::atomic::AtomicI32;

pub(super) const NAME: &str = "interlocked";

/// `InterlockedCompareExchange(destination, exchange, comparand)`.
///
/// Returns the value `destination` held before the call; the exchange
/// happened iff that equals `comparand`. The Win32 interlocked family are
/// compiler intrinsics rather than DLL exports on x64 and ARM64, so this is
/// the shared full-fence `cmpxchg`, keeping the interlocked return contract.
#[inline(always)]
fn interlocked_compare_exchange(destination: &AtomicI32, exchange: i32, comparand: i32) -> i32 {
    match super::seq_cst_cmpxchg(destination, comparand, exchange) {
        Ok(initial) | Err(initial) => initial,
    }
}

#[inline(always)]
pub(super) fn compare_and_swap(old_value: i32, new_value: i32, value: &AtomicI32) -> bool {
    interlocked_compare_exchange(value, new_value, old_value) == old_value
}
