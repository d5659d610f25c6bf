//! 32-bit compare-and-swap.
//!
//! Exactly one backend is compiled per target, first match wins:
//!
//! 1. Windows: interlocked compare-exchange.
//! 2. Apple platforms: `OSAtomicCompareAndSwap32Barrier` from libSystem.
//! 3. Any target with native 32-bit atomics: the compiler's atomic builtin.
//!
//! Every backend is a full barrier, so all three order surrounding memory
//! operations the same way. A target with none of them fails to build.

use core::sync::atomic::AtomicI32;
#[cfg(any(windows, not(target_vendor = "apple")))]
use core::sync::atomic::Ordering;

#[cfg(windows)]
mod interlocked;
#[cfg(windows)]
use interlocked as backend;

#[cfg(all(not(windows), target_vendor = "apple"))]
mod os_atomic;
#[cfg(all(not(windows), target_vendor = "apple"))]
use os_atomic as backend;

#[cfg(all(not(windows), not(target_vendor = "apple"), target_has_atomic = "32"))]
mod builtin;
#[cfg(all(not(windows), not(target_vendor = "apple"), target_has_atomic = "32"))]
use builtin as backend;

#[cfg(not(any(windows, target_vendor = "apple", target_has_atomic = "32")))]
compile_error!("compare_and_swap_32 has no backend for this target: it needs Windows, an Apple OS, or native 32-bit atomics");

/// A full-fence 32-bit `cmpxchg`: `Ok(previous)` if it stored, `Err(actual)`
/// otherwise. The interlocked and builtin backends both lower to this.
#[cfg(any(windows, not(target_vendor = "apple")))]
#[inline(always)]
fn seq_cst_cmpxchg(value: &AtomicI32, current: i32, new: i32) -> Result<i32, i32> {
    value.compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
}

/// Name of the backend compiled for this target: `"interlocked"`,
/// `"os-atomic"` or `"builtin"`.
pub const BACKEND: &str = backend::NAME;

/// Atomically replaces `*value` with `new_value` if it currently equals
/// `old_value`. Returns whether the replacement happened.
///
/// One attempt, no retry: callers that need a read-modify-write loop around
/// it write their own.
///
/// # Examples
///
/// ```
/// use atomic_value::compare_and_swap_32;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let slot = AtomicI32::new(5);
/// assert!(compare_and_swap_32(5, 7, &slot));
/// assert!(!compare_and_swap_32(5, 9, &slot));
/// assert_eq!(slot.load(Ordering::SeqCst), 7);
/// ```
#[inline]
pub fn compare_and_swap_32(old_value: i32, new_value: i32, value: &AtomicI32) -> bool {
    backend::compare_and_swap(old_value, new_value, value)
}

/// [`compare_and_swap_32`] on memory not typed as an atomic.
///
/// # Safety
///
/// `value` must be non-null, aligned to 4 bytes and valid for reads and writes
/// for the duration of the call, and every concurrent access to it must be
/// atomic.
#[inline]
pub unsafe fn compare_and_swap_32_raw(old_value: i32, new_value: i32, value: *mut i32) -> bool {
    compare_and_swap_32(old_value, new_value, AtomicI32::from_ptr(value))
}
