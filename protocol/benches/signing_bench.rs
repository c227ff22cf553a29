// Authorization signing & recovery benchmarks for the PEGCOIN protocol.
//
// Covers keypair generation, digest construction, envelope signing, and
// signer recovery for single requests and bursts of oracle approvals.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pegcoin_protocol::config::PURPOSE_MINT;
use pegcoin_protocol::crypto::keys::{Address, Keypair};
use pegcoin_protocol::crypto::signatures::{authorization_digest, sign_authorization, verify};

fn recipient() -> Address {
    Address::from_bytes([0x42; 32])
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(Keypair::generate);
    });
}

fn bench_authorization_digest(c: &mut Criterion) {
    let to = recipient();
    c.bench_function("auth/digest", |b| {
        b.iter(|| authorization_digest(PURPOSE_MINT, &to, 1_000_000));
    });
}

fn bench_sign_authorization(c: &mut Criterion) {
    let oracle = Keypair::generate();
    let to = recipient();
    c.bench_function("auth/sign_envelope", |b| {
        b.iter(|| sign_authorization(&oracle, PURPOSE_MINT, &to, 1_000_000));
    });
}

fn bench_recover_signer(c: &mut Criterion) {
    let oracle = Keypair::generate();
    let to = recipient();
    let envelope = sign_authorization(&oracle, PURPOSE_MINT, &to, 1_000_000);
    c.bench_function("auth/recover_signer", |b| {
        b.iter(|| verify(PURPOSE_MINT, &to, 1_000_000, &envelope).unwrap());
    });
}

fn bench_recover_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("auth/recover_burst");
    let oracle = Keypair::generate();

    for size in [10, 100, 500] {
        let items: Vec<_> = (0..size)
            .map(|i| {
                let to = Address::from_bytes([i as u8; 32]);
                let amount = 1_000 + i as u64;
                (to, amount, sign_authorization(&oracle, PURPOSE_MINT, &to, amount))
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| {
                for (to, amount, env) in items {
                    verify(PURPOSE_MINT, to, *amount, env).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_authorization_digest,
    bench_sign_authorization,
    bench_recover_signer,
    bench_recover_burst,
);
criterion_main!(benches);
