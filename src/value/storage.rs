//! Strategy selection for [`AtomicValue`](super::AtomicValue).

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// Picks the storage strategy backing `AtomicValue<Self>`.
///
/// Every type chooses exactly one storage, once, at its impl:
/// [`LockFree<Self>`](super::LockFree) for `Copy` types, [`Guarded<Self>`](super::Guarded)
/// for everything else. `LockFree` refuses non-`Copy` types, so a type with
/// ownership or custom clone logic cannot end up on the hardware path.
///
/// Implement it for your own types with [`lock_free!`](crate::lock_free) or
/// [`guarded!`](crate::guarded). A type without an impl cannot be stored:
///
/// ```compile_fail
/// use atomic_value::AtomicValue;
///
/// #[derive(Clone)]
/// struct Unregistered(u32);
///
/// let cell = AtomicValue::new(Unregistered(1));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no atomic storage strategy",
    label = "`AtomicValue<{Self}>` needs `{Self}: Atomic`",
    note = "use `atomic_value::lock_free!({Self})` for `Copy` types or `atomic_value::guarded!({Self})` for `Clone` types"
)]
pub trait Atomic: Sized {
    /// The storage `AtomicValue<Self>` is built on.
    type Storage: Storage<Self>;
}

/// The operations both storages provide. Sealed: the crate owns exactly two.
///
/// Every method is one indivisible step with respect to other calls on the
/// same storage, except the two-storage ones on [`LockFree`](super::LockFree),
/// which are documented there.
pub trait Storage<T>: Sealed + Sized {
    /// Whether operations go through hardware atomics for this `T`.
    fn is_lock_free() -> bool;

    /// Wraps `value`. Nothing is published yet, so no synchronization.
    fn new(value: T) -> Self;

    /// Returns a snapshot of the stored value.
    fn load(&self) -> T;

    /// Replaces the stored value.
    fn store(&self, value: T);

    /// Replaces the stored value, returning the previous one.
    fn replace(&self, value: T) -> T;

    /// Builds a new storage holding a snapshot of `self`.
    fn duplicate(&self) -> Self;

    /// Stores a snapshot of `other` into `self`.
    fn assign_from(&self, other: &Self);

    /// Exchanges the values of `self` and `other`.
    fn exchange(&self, other: &Self);

    /// Stores `new` if the current value equals `current`.
    ///
    /// Returns `Ok(previous)` on success and `Err(actual)` otherwise.
    fn compare_exchange(&self, current: T, new: T) -> Result<T, T>
    where
        T: Eq;

    /// Exclusive access needs no synchronization.
    fn get_mut(&mut self) -> &mut T;

    /// Consumes the storage, returning the value.
    fn into_inner(self) -> T;
}
