/// Puts `Copy` types on the lock-free path.
///
/// Expands to `impl Atomic for $ty { type Storage = LockFree<$ty>; }` for each
/// listed type. Fails to compile for a type that is not `Copy`.
///
/// # Examples
///
/// ```
/// use atomic_value::{lock_free, AtomicValue};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// lock_free!(Point);
///
/// let p = AtomicValue::new(Point { x: 1, y: 2 });
/// p.store(Point { x: 3, y: 4 });
/// assert_eq!(p.load(), Point { x: 3, y: 4 });
/// ```
///
/// ```compile_fail
/// use atomic_value::lock_free;
///
/// #[derive(Clone)]
/// struct Owned(String);
///
/// lock_free!(Owned);
/// ```
#[macro_export]
macro_rules! lock_free {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Atomic for $ty {
                type Storage = $crate::LockFree<$ty>;
            }
        )+
    };
}

/// Puts `Clone` types on the guarded (locked) path.
///
/// Expands to `impl Atomic for $ty { type Storage = Guarded<$ty>; }` for each
/// listed type.
///
/// # Examples
///
/// ```
/// use atomic_value::{guarded, AtomicValue};
///
/// #[derive(Clone, Debug, PartialEq, Eq)]
/// struct Config {
///     name: String,
///     retries: u32,
/// }
///
/// guarded!(Config);
///
/// let c = AtomicValue::new(Config { name: "a".into(), retries: 1 });
/// assert!(!c.is_lock_free());
/// assert_eq!(c.load().name, "a");
/// ```
#[macro_export]
macro_rules! guarded {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Atomic for $ty {
                type Storage = $crate::Guarded<$ty>;
            }
        )+
    };
}
