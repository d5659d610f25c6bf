use super::{wait_on_u32, wake_one_u32, AtomicU32, AtomicUsize};
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::sync::atomic::Ordering;
#[cfg(not(loom))]
use crossbeam_utils::Backoff;

/// A reentrant mutual-exclusion lock.
///
/// The owning thread may call [`lock`](Self::lock) again without blocking; the
/// lock is released once every guard it handed out has been dropped. Guards
/// only give shared access, so wrap the data in a `RefCell` to mutate it.
///
/// # States
/// - 0: Unlocked
/// - 1: Locked, no waiters (likely)
/// - 2: Locked, waiters exist (contended)
pub struct ReentrantLock<T: ?Sized> {
    state: AtomicU32,
    owner: AtomicUsize,
    count: Cell<u32>,
    data: T,
}

// Safety: `count` is only touched by the thread recorded in `owner`, and
// `data` is only reachable through a guard, i.e. from the owning thread.
unsafe impl<T: ?Sized + Send> Send for ReentrantLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for ReentrantLock<T> {}

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// Spin rounds before a waiter parks. `Backoff::spin` doubles its pause per
/// round up to a cap, so this bounds the spin to a few thousand pause hints.
#[cfg(not(loom))]
const SPIN_LIMIT: u32 = 40;

/// No thread ever gets this id.
const NO_OWNER: usize = 0;

/// A process-unique, non-zero id for the calling thread.
fn current_thread() -> usize {
    static NEXT_ID: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(1);

    #[cfg(not(loom))]
    std::thread_local! {
        static ID: usize = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }
    #[cfg(loom)]
    loom::thread_local! {
        static ID: usize = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }

    ID.with(|id| *id)
}

impl<T> ReentrantLock<T> {
    /// Creates an unlocked lock around `data`.
    pub fn new(data: T) -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
            owner: AtomicUsize::new(NO_OWNER),
            count: Cell::new(0),
            data,
        }
    }

    /// Consumes the lock, returning the protected data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Locks `first` and `second` in ascending address order and returns their
    /// guards as `(first, second)`.
    ///
    /// Every caller uses the same order, so two threads locking the same pair
    /// with the arguments reversed cannot deadlock. Passing the same lock twice
    /// just re-enters it.
    pub fn lock_both<'a>(
        first: &'a Self,
        second: &'a Self,
    ) -> (ReentrantLockGuard<'a, T>, ReentrantLockGuard<'a, T>) {
        if (first as *const Self) <= (second as *const Self) {
            let a = first.lock();
            let b = second.lock();
            (a, b)
        } else {
            let b = second.lock();
            let a = first.lock();
            (a, b)
        }
    }
}

impl<T: ?Sized> ReentrantLock<T> {
    /// Acquires the lock, blocking until it is available.
    ///
    /// # Panics
    /// If the owning thread re-enters more than `u32::MAX` times.
    #[inline]
    pub fn lock(&self) -> ReentrantLockGuard<'_, T> {
        let this_thread = current_thread();
        // Only this thread ever stores its own id, so a relaxed read is enough
        // to tell whether we already hold the lock.
        if self.owner.load(Ordering::Relaxed) == this_thread {
            self.reenter();
        } else {
            self.raw_lock();
            self.owner.store(this_thread, Ordering::Relaxed);
            self.count.set(1);
        }
        ReentrantLockGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Acquires the lock if it is free or already held by this thread.
    pub fn try_lock(&self) -> Option<ReentrantLockGuard<'_, T>> {
        let this_thread = current_thread();
        if self.owner.load(Ordering::Relaxed) == this_thread {
            self.reenter();
        } else if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.owner.store(this_thread, Ordering::Relaxed);
            self.count.set(1);
        } else {
            return None;
        }
        Some(ReentrantLockGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }

    /// Returns whether some thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNLOCKED
    }

    /// Exclusive access needs no locking.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.data
    }

    fn reenter(&self) {
        let count = self
            .count
            .get()
            .checked_add(1)
            .expect("reentrant lock recursion count overflowed");
        self.count.set(count);
    }

    #[inline]
    fn raw_lock(&self) {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.raw_lock_contended();
        }
    }

    #[cold]
    fn raw_lock_contended(&self) {
        let mut state = self.spin();

        if state == UNLOCKED {
            match self
                .state
                .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(s) => state = s,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(target: "atomic_value::sync", lock = ?(self as *const Self as *const ()), "contended, parking");

        loop {
            // Marking the word contended before sleeping makes the holder's
            // unlock issue a wake.
            if state != CONTENDED && self.state.swap(CONTENDED, Ordering::Acquire) == UNLOCKED {
                return;
            }
            wait_on_u32(&self.state, CONTENDED);
            state = self.spin();
        }
    }

    /// Spins while the lock is held without waiters, at most [`SPIN_LIMIT`]
    /// rounds, then returns the last observed state.
    #[cfg(not(loom))]
    fn spin(&self) -> u32 {
        let backoff = Backoff::new();
        let mut rounds = 0;
        loop {
            let state = self.state.load(Ordering::Relaxed);
            if state != LOCKED || rounds == SPIN_LIMIT {
                return state;
            }
            rounds += 1;
            backoff.spin();
        }
    }

    // Loom explores every spin iteration as a branch; park straight away.
    #[cfg(loom)]
    fn spin(&self) -> u32 {
        self.state.load(Ordering::Relaxed)
    }

    #[inline]
    fn raw_unlock(&self) {
        if self.state.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            wake_one_u32(&self.state);
        }
    }
}

impl<T: Default> Default for ReentrantLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ReentrantLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ReentrantLock");
        match self.try_lock() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

/// Shared access to the data of a held [`ReentrantLock`].
///
/// Dropping the last guard of the owning thread releases the lock.
#[must_use = "if unused the lock is released immediately"]
pub struct ReentrantLockGuard<'a, T: ?Sized> {
    lock: &'a ReentrantLock<T>,
    // Release must happen on the owning thread.
    _not_send: PhantomData<*const ()>,
}

impl<T: ?Sized> Deref for ReentrantLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.lock.data
    }
}

impl<T: ?Sized> Drop for ReentrantLockGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        let count = self.lock.count.get() - 1;
        self.lock.count.set(count);
        if count == 0 {
            self.lock.owner.store(NO_OWNER, Ordering::Relaxed);
            self.lock.raw_unlock();
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ReentrantLockGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
