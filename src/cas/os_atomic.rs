#![cfg(target_vendor = "apple")]

use core::sync::atomic::AtomicI32;

pub(super) const NAME: &str = "os-atomic";

// libkern/OSAtomic.h, exported by libSystem on every Apple OS.
extern "C" {
    fn OSAtomicCompareAndSwap32Barrier(old_value: i32, new_value: i32, the_value: *mut i32) -> bool;
}

#[inline]
pub(super) fn compare_and_swap(old_value: i32, new_value: i32, value: &AtomicI32) -> bool {
    // SAFETY: `as_ptr` is valid and aligned for the borrow, and the OS
    // primitive accesses it atomically.
    unsafe { OSAtomicCompareAndSwap32Barrier(old_value, new_value, value.as_ptr()) }
}
