//! Pooled vs. direct ephemeral key acquisition.
//!
//! Run with: cargo bench -p tlskeys-tls

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tlskeys_tls::config::KeyPoolConfig;
use tlskeys_tls::crypt::NamedGroup;
use tlskeys_tls::handshake::{KeyExchange, KeyPoolSet};

const GROUPS: [(&str, NamedGroup); 4] = [
    ("x25519", NamedGroup::X25519),
    ("secp256r1", NamedGroup::SECP256R1),
    ("secp384r1", NamedGroup::SECP384R1),
    ("secp521r1", NamedGroup::SECP521R1),
];

fn bench_acquire(c: &mut Criterion) {
    let pools = KeyPoolSet::new(&KeyPoolConfig::default());
    pools.initialize_all();

    let mut group = c.benchmark_group("key_share");
    for (name, named_group) in GROUPS {
        group.bench_with_input(BenchmarkId::new("pooled", name), &named_group, |b, &g| {
            b.iter(|| pools.acquire(black_box(g)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("direct", name), &named_group, |b, &g| {
            b.iter(|| KeyExchange::generate(black_box(g)).unwrap())
        });
    }
    group.finish();
}

fn bench_fill(c: &mut Criterion) {
    let config = KeyPoolConfig::builder()
        .groups(&[NamedGroup::X25519])
        .build();
    c.bench_function("fill_x25519_pool", |b| {
        b.iter(|| {
            let pools = KeyPoolSet::new(&config);
            pools.initialize_all();
            pools
        })
    });
}

criterion_group!(benches, bench_acquire, bench_fill);
criterion_main!(benches);
