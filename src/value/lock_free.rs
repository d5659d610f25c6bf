use super::storage::{Sealed, Storage};
use core::fmt;
use core::ptr;
use crossbeam_utils::atomic::AtomicCell;

/// Storage for `Copy` types: a pass-through to hardware atomics.
///
/// Backed by [`AtomicCell`], which uses native atomic instructions whenever `T`
/// matches the size and alignment of one, and a global seqlock otherwise.
/// [`is_lock_free`](Storage::is_lock_free) tells the two apart.
///
/// The two-cell operations are not atomic as a pair: `assign_from` is a load
/// of `other` followed by a store to `self`, and `exchange` is a load, a swap
/// and a store. A third thread may observe either cell between the steps, and
/// two racing `exchange` calls on the same pair may leave one value in both
/// cells and lose the other.
#[repr(transparent)]
pub struct LockFree<T>(AtomicCell<T>);

impl<T> Sealed for LockFree<T> {}

impl<T: Copy> Storage<T> for LockFree<T> {
    #[inline]
    fn is_lock_free() -> bool {
        AtomicCell::<T>::is_lock_free()
    }

    #[inline(always)]
    fn new(value: T) -> Self {
        Self(AtomicCell::new(value))
    }

    #[inline(always)]
    fn load(&self) -> T {
        self.0.load()
    }

    #[inline(always)]
    fn store(&self, value: T) {
        self.0.store(value);
    }

    #[inline(always)]
    fn replace(&self, value: T) -> T {
        self.0.swap(value)
    }

    #[inline]
    fn duplicate(&self) -> Self {
        Self::new(self.0.load())
    }

    #[inline]
    fn assign_from(&self, other: &Self) {
        self.0.store(other.0.load());
    }

    fn exchange(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }
        let theirs = other.0.load();
        let mine = self.0.swap(theirs);
        other.0.store(mine);
    }

    #[inline]
    fn compare_exchange(&self, current: T, new: T) -> Result<T, T>
    where
        T: Eq,
    {
        self.0.compare_exchange(current, new)
    }

    #[inline]
    fn get_mut(&mut self) -> &mut T {
        // SAFETY: `&mut self` excludes every other access to the cell.
        unsafe { &mut *self.0.as_ptr() }
    }

    #[inline]
    fn into_inner(self) -> T {
        self.0.into_inner()
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for LockFree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LockFree").field(&self.0.load()).finish()
    }
}
