//! Concurrent key pool stress tests.
//!
//! Many handshakes race on the first `acquire` of an unfilled pool. The pool
//! must be generated exactly once, every caller must get a fully generated
//! key, and every served key must belong to the single published list.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use tlskeys_tls::config::KeyPoolConfig;
use tlskeys_tls::crypt::NamedGroup;
use tlskeys_tls::handshake::KeyPoolSet;

const NUM_THREADS: usize = 32;
const ACQUIRES_PER_THREAD: usize = 20;
const CAPACITY: usize = 16;

fn set(lazy_fill: bool) -> Arc<KeyPoolSet> {
    Arc::new(KeyPoolSet::new(
        &KeyPoolConfig::builder()
            .capacity(CAPACITY)
            .groups(&[NamedGroup::X25519, NamedGroup::SECP256R1])
            .lazy_fill(lazy_fill)
            .build(),
    ))
}

#[test]
fn test_concurrent_first_acquire_publishes_once() {
    let pools = set(true);
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let pools = Arc::clone(&pools);
            let barrier = Arc::clone(&barrier);
            let group = if i % 2 == 0 {
                NamedGroup::X25519
            } else {
                NamedGroup::SECP256R1
            };
            thread::spawn(move || {
                barrier.wait();
                (0..ACQUIRES_PER_THREAD)
                    .map(|_| {
                        let key = pools.acquire(group).unwrap();
                        assert_eq!(key.group(), group);
                        (group, key.public_key_bytes().to_vec())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut served: HashSet<(NamedGroup, Vec<u8>)> = HashSet::new();
    for h in handles {
        served.extend(h.join().unwrap());
    }

    for group in [NamedGroup::X25519, NamedGroup::SECP256R1] {
        let pool = pools.pool(group).unwrap();
        assert_eq!(pool.len(), CAPACITY);
        let distinct = served.iter().filter(|(g, _)| *g == group).count();
        // All served keys come from one published list of CAPACITY keys
        assert!(distinct <= CAPACITY, "{group:?}: {distinct} distinct keys");
    }
}

#[test]
fn test_concurrent_acquire_with_eager_fill() {
    let pools = set(false);
    let barrier = Arc::new(Barrier::new(NUM_THREADS + 1));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let pools = Arc::clone(&pools);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ACQUIRES_PER_THREAD {
                    let key = pools.acquire(NamedGroup::X25519).unwrap();
                    assert_eq!(key.public_key_bytes().len(), 32);
                }
            })
        })
        .collect();

    // Fill races with readers that fall back to direct generation
    barrier.wait();
    pools.initialize_all();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(pools.pool(NamedGroup::X25519).unwrap().len(), CAPACITY);
}

#[test]
fn test_pooled_keys_agree_across_threads() {
    let pools = set(true);
    let server = pools.acquire(NamedGroup::SECP256R1).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pools = Arc::clone(&pools);
            let server = Arc::clone(&server);
            thread::spawn(move || {
                let client = pools.acquire(NamedGroup::SECP256R1).unwrap();
                let c = client.compute_shared_secret(server.public_key_bytes()).unwrap();
                let s = server.compute_shared_secret(client.public_key_bytes()).unwrap();
                assert_eq!(c, s);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
