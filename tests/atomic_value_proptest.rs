use atomic_value::{compare_and_swap_32, swap, AtomicValue};
use proptest::prelude::*;
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Debug, Clone)]
enum Operation {
    Store(i64),
    Swap(i64),
    CompareExchange(i64, i64),
    Increment,
    Decrement,
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        any::<i64>().prop_map(Operation::Store),
        any::<i64>().prop_map(Operation::Swap),
        (any::<i64>(), any::<i64>()).prop_map(|(c, n)| Operation::CompareExchange(c, n)),
        Just(Operation::Increment),
        Just(Operation::Decrement),
    ]
}

proptest! {
    #[test]
    fn test_swap_twice_restores_lock_free(v1 in any::<u64>(), v2 in any::<u64>()) {
        let a = AtomicValue::new(v1);
        let b = AtomicValue::new(v2);
        swap(&a, &b);
        prop_assert_eq!((a.load(), b.load()), (v2, v1));
        swap(&a, &b);
        prop_assert_eq!((a.load(), b.load()), (v1, v2));
    }

    #[test]
    fn test_swap_twice_restores_guarded(v1 in ".*", v2 in ".*") {
        let a = AtomicValue::new(v1.clone());
        let b = AtomicValue::new(v2.clone());
        swap(&a, &b);
        swap(&a, &b);
        prop_assert_eq!(a.load(), v1);
        prop_assert_eq!(b.load(), v2);
    }

    #[test]
    fn test_increment_decrement_inert(v in any::<i32>(), s in any::<Vec<u8>>()) {
        let n = AtomicValue::new(v);
        n.increment();
        let _ = n.post_increment();
        n.decrement();
        let _ = n.post_decrement();
        prop_assert_eq!(n.load(), v);

        let bytes = AtomicValue::new(s.clone());
        bytes.increment().decrement();
        prop_assert_eq!(bytes.load(), s);
    }

    #[test]
    fn test_cell_matches_plain_model(ops in proptest::collection::vec(operation(), 1..64)) {
        let cell = AtomicValue::new(0_i64);
        let text = AtomicValue::new(String::from("0"));
        let mut model = 0_i64;

        for op in ops {
            match op {
                Operation::Store(v) => {
                    cell.store(v);
                    text.store(v.to_string());
                    model = v;
                }
                Operation::Swap(v) => {
                    prop_assert_eq!(cell.swap(v), model);
                    prop_assert_eq!(text.swap(v.to_string()), model.to_string());
                    model = v;
                }
                Operation::CompareExchange(current, new) => {
                    let expected = if current == model { Ok(model) } else { Err(model) };
                    prop_assert_eq!(cell.compare_exchange(current, new), expected);
                    let expected_text = expected.map(|v| v.to_string()).map_err(|v| v.to_string());
                    prop_assert_eq!(text.compare_exchange(current.to_string(), new.to_string()), expected_text);
                    if current == model {
                        model = new;
                    }
                }
                Operation::Increment => {
                    cell.increment();
                    text.increment();
                }
                Operation::Decrement => {
                    cell.decrement();
                    text.decrement();
                }
            }
            prop_assert_eq!(cell.load(), model);
            prop_assert_eq!(text.load(), model.to_string());
        }
    }

    #[test]
    fn test_cas32_matches_model(start in any::<i32>(), attempts in proptest::collection::vec((any::<bool>(), any::<i32>()), 1..32)) {
        let slot = AtomicI32::new(start);
        let mut model = start;
        for (use_current, new) in attempts {
            let old = if use_current { model } else { model.wrapping_add(1) };
            let swapped = compare_and_swap_32(old, new, &slot);
            prop_assert_eq!(swapped, use_current);
            if swapped {
                model = new;
            }
            prop_assert_eq!(slot.load(Ordering::SeqCst), model);
        }
    }
}
