//! Atomic cells for arbitrary value types.
//!
//! [`AtomicValue<T>`] presents one interface over two strategies, chosen per
//! type at compile time through [`Atomic::Storage`]:
//!
//! - [`LockFree<T>`] for `Copy` types: every operation is a hardware atomic.
//! - [`Guarded<T>`] for everything else: every operation runs under a
//!   reentrant lock owned by the cell.
//!
//! In both cases each individual read and each individual write is
//! indivisible. A read followed by a write is *not*: `cell.store(cell.load() + 1)`
//! races with other writers. Build read-modify-write on
//! [`compare_exchange`](AtomicValue::compare_exchange) or
//! [`fetch_update`](AtomicValue::fetch_update).

mod macros;

mod guarded;
mod impls;
mod lock_free;
mod storage;

pub use guarded::Guarded;
pub use lock_free::LockFree;
pub use storage::{Atomic, Storage};

use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value of type `T` that many threads may read and write concurrently.
///
/// Every read observes the result of some completed write, and no write is
/// torn by another. The strategy is fixed by `T`'s [`Atomic`] impl; see the
/// [module docs](self).
///
/// # Examples
///
/// ```
/// use atomic_value::AtomicValue;
///
/// let count = AtomicValue::new(10_i32);
/// let name = AtomicValue::new(String::from("a"));
///
/// count.store(11);
/// name.store("b".into());
///
/// assert_eq!(count.load(), 11);
/// assert_eq!(name.load(), "b");
/// assert!(count.is_lock_free());
/// assert!(!name.is_lock_free());
/// ```
#[repr(transparent)]
pub struct AtomicValue<T: Atomic> {
    storage: T::Storage,
}

impl<T: Atomic> AtomicValue<T> {
    /// Creates a cell holding `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            storage: T::Storage::new(value),
        }
    }

    /// Returns a snapshot of the current value.
    #[inline]
    pub fn load(&self) -> T {
        self.storage.load()
    }

    /// Replaces the current value. Returns `self` for chaining.
    #[inline]
    pub fn store(&self, value: T) -> &Self {
        self.storage.store(value);
        self
    }

    /// Replaces the current value with a snapshot of `other`. Returns `self`.
    ///
    /// On the guarded path both cells stay locked for the whole copy. On the
    /// lock-free path this is a load of `other` followed by a separate store.
    #[inline]
    pub fn assign_from(&self, other: &Self) -> &Self {
        self.storage.assign_from(&other.storage);
        self
    }

    /// Stores `value` and returns the previous value, in one step.
    #[inline]
    pub fn swap(&self, value: T) -> T {
        self.storage.replace(value)
    }

    /// Exchanges the values of `self` and `other`.
    ///
    /// Swapping twice restores the original pairing. See [`swap`](fn@swap) for
    /// what concurrent swaps of the same pair guarantee.
    #[inline]
    pub fn swap_with(&self, other: &Self) {
        self.storage.exchange(&other.storage);
    }

    /// Stores `new` if the current value equals `current`.
    ///
    /// Returns `Ok(previous)` if the value was replaced and `Err(actual)` if it
    /// was not.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_value::AtomicValue;
    ///
    /// let cell = AtomicValue::new(5_u32);
    /// assert_eq!(cell.compare_exchange(5, 7), Ok(5));
    /// assert_eq!(cell.compare_exchange(5, 9), Err(7));
    /// ```
    #[inline]
    pub fn compare_exchange(&self, current: T, new: T) -> Result<T, T>
    where
        T: Eq,
    {
        self.storage.compare_exchange(current, new)
    }

    /// Applies `f` to the current value until the result is stored.
    ///
    /// Loops over [`load`](Self::load) and
    /// [`compare_exchange`](Self::compare_exchange). Returns `Ok(previous)`
    /// once a new value is stored, or `Err(current)` if `f` returns `None`.
    /// `f` may run several times under contention.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_value::AtomicValue;
    ///
    /// let cell = AtomicValue::new(1_u64);
    /// assert_eq!(cell.fetch_update(|v| Some(v * 3)), Ok(1));
    /// assert_eq!(cell.fetch_update(|v| (v < 3).then_some(0)), Err(3));
    /// assert_eq!(cell.load(), 3);
    /// ```
    pub fn fetch_update<F>(&self, mut f: F) -> Result<T, T>
    where
        T: Eq + Clone,
        F: FnMut(T) -> Option<T>,
    {
        let mut current = self.load();
        while let Some(next) = f(current.clone()) {
            match self.compare_exchange(current, next) {
                Ok(previous) => return Ok(previous),
                Err(actual) => current = actual,
            }
        }
        Err(current)
    }

    /// Moves the value out, leaving `T::default()` behind.
    #[inline]
    pub fn take(&self) -> T
    where
        T: Default,
    {
        self.swap(T::default())
    }

    /// Whether this cell's operations are hardware atomics.
    ///
    /// Always `false` on the guarded path. On the lock-free path, `false`
    /// means `T` has no native atomic of matching size and a global seqlock
    /// is used; behavior is the same either way.
    #[inline]
    pub fn is_lock_free(&self) -> bool {
        T::Storage::is_lock_free()
    }

    /// Prefix increment stand-in. Leaves the value unchanged and returns `self`.
    #[inline]
    pub fn increment(&self) -> &Self {
        self
    }

    /// Postfix increment stand-in. Leaves the value unchanged and returns a copy.
    #[inline]
    pub fn post_increment(&self) -> Self {
        self.clone()
    }

    /// Prefix decrement stand-in. Leaves the value unchanged and returns `self`.
    #[inline]
    pub fn decrement(&self) -> &Self {
        self
    }

    /// Postfix decrement stand-in. Leaves the value unchanged and returns a copy.
    #[inline]
    pub fn post_decrement(&self) -> Self {
        self.clone()
    }

    /// Returns a mutable reference to the value. No synchronization needed.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.storage.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.storage.into_inner()
    }
}

/// Exchanges the values of two cells.
///
/// On the guarded path both locks are taken in a fixed global order, so
/// `swap(&a, &b)` and `swap(&b, &a)` running concurrently cannot deadlock, and
/// the pair always holds its two original values.
///
/// On the lock-free path the exchange is a load of `b`, a swap into `a` and a
/// store into `b`. Two racing swaps of the same pair can interleave between
/// those steps: one value may then end up in both cells and the other be
/// lost. Each cell still only ever holds a value that was stored into the
/// pair. Use a guarded type when the pair must be exchanged as a unit.
#[inline]
pub fn swap<T: Atomic>(a: &AtomicValue<T>, b: &AtomicValue<T>) {
    a.swap_with(b);
}

impl<T: Atomic> Clone for AtomicValue<T> {
    /// Copy construction: reads the source through its own synchronization.
    #[inline]
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.duplicate(),
        }
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<T: Atomic + Default> Default for AtomicValue<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Atomic> From<T> for AtomicValue<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Atomic + fmt::Debug> fmt::Debug for AtomicValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicValue")
            .field("value", &self.load())
            .finish()
    }
}

impl<T: Atomic + Serialize> Serialize for AtomicValue<T> {
    /// Serializes a snapshot of the current value.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.load().serialize(serializer)
    }
}

impl<'de, T: Atomic + Deserialize<'de>> Deserialize<'de> for AtomicValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}
