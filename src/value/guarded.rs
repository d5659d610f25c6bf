use super::storage::{Sealed, Storage};
use crate::sync::ReentrantLock;
use core::cell::RefCell;
use core::fmt;
use core::mem;
use core::ptr;

/// Storage for types that cannot be copied bit-for-bit.
///
/// Every access runs under a [`ReentrantLock`] owned by the instance. The value
/// sits in a `RefCell` so that `T::clone` or `T::drop` re-entering the same
/// cell panics instead of aliasing. Values being replaced are dropped only
/// after the lock is released.
///
/// Operations on two cells lock both, lower address first, for the whole
/// operation; concurrent reverse-order calls on the same pair cannot deadlock.
/// Blocking lasts as long as the competing critical section, which includes a
/// `T::clone`. An expensive clone makes every other caller wait for it.
pub struct Guarded<T> {
    cell: ReentrantLock<RefCell<T>>,
}

impl<T> Sealed for Guarded<T> {}

impl<T: Clone> Storage<T> for Guarded<T> {
    #[inline]
    fn is_lock_free() -> bool {
        false
    }

    fn new(value: T) -> Self {
        Self {
            cell: ReentrantLock::new(RefCell::new(value)),
        }
    }

    fn load(&self) -> T {
        self.cell.lock().borrow().clone()
    }

    fn store(&self, value: T) {
        drop(self.replace(value));
    }

    fn replace(&self, value: T) -> T {
        self.cell.lock().replace(value)
    }

    fn duplicate(&self) -> Self {
        Self::new(self.load())
    }

    fn assign_from(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }
        let previous = {
            let (mine, theirs) = ReentrantLock::lock_both(&self.cell, &other.cell);
            let snapshot = theirs.borrow().clone();
            mine.replace(snapshot)
        };
        drop(previous);
    }

    fn exchange(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }
        let (mine, theirs) = ReentrantLock::lock_both(&self.cell, &other.cell);
        mine.swap(&theirs);
    }

    fn compare_exchange(&self, current: T, new: T) -> Result<T, T>
    where
        T: Eq,
    {
        let guard = self.cell.lock();
        let mut value = guard.borrow_mut();
        if *value == current {
            Ok(mem::replace(&mut *value, new))
        } else {
            Err(value.clone())
        }
    }

    fn get_mut(&mut self) -> &mut T {
        self.cell.get_mut().get_mut()
    }

    fn into_inner(self) -> T {
        self.cell.into_inner().into_inner()
    }
}

impl<T: fmt::Debug> fmt::Debug for Guarded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guarded").field(&self.cell).finish()
    }
}
