//! # `atomic-value` - Atomic Cells for Any Type
//!
//! [`AtomicValue<T>`] extends indivisible reads and writes to arbitrary value
//! types. For `Copy` types it is a pass-through to hardware atomics; for
//! everything else it falls back to a reentrant lock owned by the cell. Both
//! strategies expose the same interface and the same guarantee: every read
//! observes a value produced by some completed write, and no write is torn.
//!
//! ## Strategy Selection
//!
//! The strategy is picked per type, at compile time, by the [`Atomic`] trait:
//!
//! - **Lock-free** ([`LockFree<T>`]): `Copy` types. Backed by
//!   `crossbeam_utils::atomic::AtomicCell`, so loads, stores and swaps are
//!   single atomic instructions whenever `T` fits one.
//! - **Guarded** ([`Guarded<T>`]): `Clone` types with ownership, such as
//!   `String` or `Vec<T>`. Every operation holds the cell's
//!   [`ReentrantLock`](sync::ReentrantLock); operations spanning two cells
//!   lock both in a fixed address order, so they never deadlock.
//!
//! Primitives and common std types are covered out of the box. Opt your own
//! types in with [`lock_free!`] or [`guarded!`]. Using a type with no
//! strategy is a compile error.
//!
//! ## Guarantees
//!
//! - Each individual `load`, `store`, `swap` and `compare_exchange` is
//!   linearizable per cell.
//! - A `load` followed by a `store` is **not** atomic. Use
//!   [`AtomicValue::compare_exchange`] or [`AtomicValue::fetch_update`] for
//!   read-modify-write.
//! - Increment and decrement are inert stand-ins that leave the value alone.
//!
//! ## Compare-and-swap
//!
//! [`compare_and_swap_32`] is a standalone 32-bit CAS with one backend
//! compiled per platform (Windows interlocked, Apple `OSAtomic`, or the
//! compiler builtin). It is unrelated to `AtomicValue`.
//!
//! ## Example
//!
//! ```rust
//! use atomic_value::{swap, AtomicValue};
//!
//! let a = AtomicValue::new(String::from("left"));
//! let b = AtomicValue::new(String::from("right"));
//!
//! swap(&a, &b);
//! assert_eq!(a.load(), "right");
//!
//! let hits = AtomicValue::new(0_u32);
//! hits.fetch_update(|n| n.checked_add(1)).unwrap();
//! assert_eq!(hits.load(), 1);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cas;
pub mod sync;
pub mod value;

pub use cas::{compare_and_swap_32, compare_and_swap_32_raw};
pub use value::{swap, Atomic, AtomicValue, Guarded, LockFree, Storage};

// Compile-time layout checks.
#[cfg(not(loom))]
const _: () = {
    use core::mem;
    use crossbeam_utils::atomic::AtomicCell;

    // The lock-free path adds nothing on top of the atomic cell.
    assert!(mem::size_of::<AtomicValue<u64>>() == mem::size_of::<AtomicCell<u64>>());
    assert!(mem::align_of::<AtomicValue<u64>>() == mem::align_of::<AtomicCell<u64>>());
    assert!(mem::size_of::<AtomicValue<u32>>() == mem::size_of::<u32>());

    // Guarded cells carry the lock words next to the value.
    assert!(mem::size_of::<AtomicValue<String>>() <= mem::size_of::<String>() + mem::size_of::<usize>() * 4);
};
