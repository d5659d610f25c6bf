//! Strategy impls for core and std types.
//!
//! Generic containers whose `Copy`-ness depends on their parameters (tuples,
//! `Option<T>`) cannot pick a single strategy without specialization and have
//! no impl here. Arrays go lock-free because only `[T: Copy; N]` is covered.

use super::{Atomic, Guarded, LockFree};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::ffi::OsString;
use std::num::{
    NonZeroI128, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI8, NonZeroIsize, NonZeroU128,
    NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU8, NonZeroUsize,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

crate::lock_free!(
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64, bool, char, (),
    NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize,
    Duration, Instant, SystemTime,
);

crate::guarded!(String, PathBuf, OsString, Cow<'static, str>);

impl<T> Atomic for *const T {
    type Storage = LockFree<Self>;
}

impl<T> Atomic for *mut T {
    type Storage = LockFree<Self>;
}

impl<T: ?Sized> Atomic for &'static T {
    type Storage = LockFree<Self>;
}

impl<T: Copy, const N: usize> Atomic for [T; N] {
    type Storage = LockFree<Self>;
}

impl<T: Clone> Atomic for Vec<T> {
    type Storage = Guarded<Self>;
}

impl<T: Clone> Atomic for VecDeque<T> {
    type Storage = Guarded<Self>;
}

impl<T: Clone> Atomic for Box<T> {
    type Storage = Guarded<Self>;
}

impl<T: ?Sized> Atomic for Arc<T> {
    type Storage = Guarded<Self>;
}

impl<K: Clone, V: Clone> Atomic for BTreeMap<K, V> {
    type Storage = Guarded<Self>;
}

impl<T: Clone> Atomic for BTreeSet<T> {
    type Storage = Guarded<Self>;
}

impl<K: Clone, V: Clone, S: Clone> Atomic for HashMap<K, V, S> {
    type Storage = Guarded<Self>;
}

impl<T: Clone, S: Clone> Atomic for HashSet<T, S> {
    type Storage = Guarded<Self>;
}
