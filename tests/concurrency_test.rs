use atomic_value::{compare_and_swap_32, lock_free, swap, AtomicValue};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Two words written together; a torn read shows them disagreeing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(16))]
struct Pair {
    lo: u64,
    hi: u64,
}

/// Too wide for any native atomic, so it goes through the seqlock fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Quad([u64; 4]);

lock_free!(Pair, Quad);

const WRITERS: u64 = 4;
const WRITES: u64 = 2_000;

/// Runs `body` on its own thread and fails if it does not finish in time.
fn with_timeout<F: FnOnce() + Send + 'static>(limit: Duration, body: F) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        body();
        let _ = tx.send(());
    });
    match rx.recv_timeout(limit) {
        Ok(()) => handle.join().unwrap(),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // The body panicked; surface its message.
            handle.join().unwrap();
        }
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("timed out after {limit:?}, likely deadlock"),
    }
}

fn pattern(writer: u64, i: u64) -> u64 {
    (writer << 32) | i
}

#[test]
fn test_no_torn_reads_u64() {
    let cell = AtomicValue::new(pattern(0, 0));
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        for w in 1..=WRITERS {
            let cell = &cell;
            s.spawn(move || {
                for i in 0..WRITES {
                    cell.store(pattern(w, i));
                }
            });
        }
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                let v = cell.load();
                assert!(v >> 32 <= WRITERS && (v & 0xFFFF_FFFF) < WRITES, "torn value {v:#x}");
            }
        });
        thread::sleep(Duration::from_millis(20));
        done.store(true, Ordering::Relaxed);
    });

    let last = cell.load();
    assert!((1..=WRITERS).contains(&(last >> 32)));
    assert_eq!(last & 0xFFFF_FFFF, WRITES - 1);
}

#[test]
fn test_no_torn_reads_wide_copy_types() {
    let pair = AtomicValue::new(Pair { lo: 0, hi: 0 });
    let quad = AtomicValue::new(Quad([0; 4]));
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        for w in 1..=WRITERS {
            let (pair, quad) = (&pair, &quad);
            s.spawn(move || {
                for i in 0..WRITES {
                    let v = pattern(w, i);
                    pair.store(Pair { lo: v, hi: v });
                    quad.store(Quad([v; 4]));
                }
            });
        }
        for _ in 0..2 {
            let (pair, quad, stop) = (&pair, &quad, &stop);
            s.spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let p = pair.load();
                    assert_eq!(p.lo, p.hi, "torn pair");
                    let q = quad.load();
                    assert!(q.0.iter().all(|&x| x == q.0[0]), "torn quad {q:?}");
                }
            });
        }
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
    });

    let p = pair.load();
    assert_eq!(p.lo & 0xFFFF_FFFF, WRITES - 1);
}

#[test]
fn test_no_torn_reads_guarded() {
    let cell = AtomicValue::new(vec![0_u64; 32]);
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        for w in 1..=WRITERS {
            let cell = &cell;
            s.spawn(move || {
                for i in 0..WRITES / 4 {
                    cell.store(vec![pattern(w, i); 32]);
                }
            });
        }
        s.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                let v = cell.load();
                assert_eq!(v.len(), 32);
                assert!(v.iter().all(|&x| x == v[0]), "torn vec");
            }
        });
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
    });
}

#[test]
fn test_reverse_assignment_does_not_deadlock() {
    with_timeout(Duration::from_secs(30), || {
        let a = Arc::new(AtomicValue::new(String::from("a")));
        let b = Arc::new(AtomicValue::new(String::from("b")));
        let start = Arc::new(Barrier::new(2));

        let forward = {
            let (a, b, start) = (a.clone(), b.clone(), start.clone());
            thread::spawn(move || {
                start.wait();
                for _ in 0..20_000 {
                    a.assign_from(&b);
                }
            })
        };
        let backward = {
            let (a, b, start) = (a.clone(), b.clone(), start.clone());
            thread::spawn(move || {
                start.wait();
                for _ in 0..20_000 {
                    b.assign_from(&a);
                }
            })
        };

        forward.join().unwrap();
        backward.join().unwrap();
        let (x, y) = (a.load(), b.load());
        assert!(x == "a" || x == "b");
        assert!(y == "a" || y == "b");
    });
}

#[test]
fn test_reverse_swap_does_not_deadlock() {
    with_timeout(Duration::from_secs(30), || {
        let a = Arc::new(AtomicValue::new(vec![1_u8]));
        let b = Arc::new(AtomicValue::new(vec![2_u8]));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let (a, b) = (a.clone(), b.clone());
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        if t % 2 == 0 {
                            swap(&a, &b);
                        } else {
                            swap(&b, &a);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Guarded swaps are atomic across the pair: nothing lost or duplicated.
        let mut values = vec![a.load(), b.load()];
        values.sort();
        assert_eq!(values, vec![vec![1], vec![2]]);
    });
}

#[test]
fn test_racing_lock_free_swaps_keep_only_stored_values() {
    let a = AtomicValue::new(1_u64);
    let b = AtomicValue::new(2_u64);
    thread::scope(|s| {
        for t in 0..4 {
            let (a, b) = (&a, &b);
            s.spawn(move || {
                for _ in 0..10_000 {
                    if t % 2 == 0 {
                        swap(a, b);
                    } else {
                        swap(b, a);
                    }
                }
            });
        }
    });

    // Not atomic as a pair: a value may be duplicated, but nothing new appears.
    let (x, y) = (a.load(), b.load());
    assert!(x == 1 || x == 2);
    assert!(y == 1 || y == 2);

    // Without contention the exchange is exact.
    a.store(1);
    b.store(2);
    swap(&a, &b);
    assert_eq!((a.load(), b.load()), (2, 1));
}

#[test]
fn test_hundred_thread_compare_exchange_increments() {
    let cell = Arc::new(AtomicValue::new(10_i32));
    let handles: Vec<_> = (0..100)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || loop {
                let current = cell.load();
                if cell.compare_exchange(current, current + 1).is_ok() {
                    break;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cell.load(), 110);
}

#[test]
fn test_hundred_thread_fetch_update_guarded() {
    let cell = Arc::new(AtomicValue::new(String::new()));
    let handles: Vec<_> = (0..100)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || {
                cell.fetch_update(|mut s| {
                    s.push('x');
                    Some(s)
                })
                .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cell.load().len(), 100);
}

#[test]
fn test_hundred_thread_cas32_retry_loop() {
    let slot = Arc::new(AtomicI32::new(10));
    let handles: Vec<_> = (0..100)
        .map(|_| {
            let slot = slot.clone();
            thread::spawn(move || loop {
                let current = slot.load(Ordering::SeqCst);
                if compare_and_swap_32(current, current + 1, &slot) {
                    break;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(slot.load(Ordering::SeqCst), 110);
}

#[test]
fn test_clone_under_concurrent_writes() {
    let cell = AtomicValue::new(vec![0_u32; 16]);
    let stop = AtomicBool::new(false);
    thread::scope(|s| {
        s.spawn(|| {
            let mut i = 0;
            while !stop.load(Ordering::Relaxed) {
                i += 1;
                cell.store(vec![i; 16]);
            }
        });
        for _ in 0..1_000 {
            let copy = cell.clone().into_inner();
            assert!(copy.iter().all(|&x| x == copy[0]));
        }
        stop.store(true, Ordering::Relaxed);
    });
}
