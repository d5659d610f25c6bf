//! Blocking primitives backing the guarded storage.
//!
//! The lock parks on its own state word: a futex on Linux, `WaitOnAddress` on
//! Windows and a yield loop everywhere else. Under `--cfg loom` the atomics
//! come from `loom` and every wait becomes a `loom::thread::yield_now`.

mod reentrant;

pub use reentrant::{ReentrantLock, ReentrantLockGuard};

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicU32, AtomicUsize};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicU32, AtomicUsize};

#[cfg(all(windows, not(loom)))]
use windows_sys::Win32::System::Threading::{WaitOnAddress, WakeByAddressSingle};

#[cfg(all(target_os = "linux", not(loom)))]
#[inline]
fn futex(addr: &AtomicU32, op: libc::c_int, val: u32) {
    // Spurious returns (EINTR, EAGAIN) are fine: every caller re-checks the word.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            addr.as_ptr(),
            op | libc::FUTEX_PRIVATE_FLAG,
            val,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

/// Blocks while `addr` holds `expected`. May return spuriously.
#[inline]
pub(crate) fn wait_on_u32(addr: &AtomicU32, expected: u32) {
    #[cfg(loom)]
    {
        let _ = (addr, expected);
        loom::thread::yield_now();
    }
    #[cfg(all(windows, not(loom)))]
    unsafe {
        let expected_ptr = &expected as *const u32 as *const _;
        let addr_ptr = addr as *const AtomicU32 as *const _;
        WaitOnAddress(addr_ptr, expected_ptr, core::mem::size_of::<u32>(), u32::MAX);
    }
    #[cfg(all(target_os = "linux", not(loom)))]
    {
        if addr.load(core::sync::atomic::Ordering::Relaxed) == expected {
            futex(addr, libc::FUTEX_WAIT, expected);
        }
    }
    #[cfg(not(any(loom, windows, target_os = "linux")))]
    while addr.load(core::sync::atomic::Ordering::Acquire) == expected {
        std::thread::yield_now();
    }
}

/// Wakes at most one thread blocked in [`wait_on_u32`] on `addr`.
#[inline]
pub(crate) fn wake_one_u32(addr: &AtomicU32) {
    #[cfg(loom)]
    let _ = addr;
    #[cfg(all(windows, not(loom)))]
    unsafe {
        WakeByAddressSingle(addr as *const AtomicU32 as *const _);
    }
    #[cfg(all(target_os = "linux", not(loom)))]
    futex(addr, libc::FUTEX_WAKE, 1);
    #[cfg(not(any(loom, windows, target_os = "linux")))]
    let _ = addr;
}
