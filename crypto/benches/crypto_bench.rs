use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn ed25519_sign_bench(c: &mut Criterion) {
    let kp = tally_crypto::keypair_from_seed(&[1u8; 32]);
    let msg = [42u8; 64];

    c.bench_function("ed25519_sign_fact_message", |b| {
        b.iter(|| tally_crypto::sign_message(black_box(&msg), &kp.private))
    });
}

fn ed25519_verify_bench(c: &mut Criterion) {
    let kp = tally_crypto::keypair_from_seed(&[2u8; 32]);
    let msg = [42u8; 64];
    let sig = tally_crypto::sign_message(&msg, &kp.private);

    c.bench_function("ed25519_verify_fact_message", |b| {
        b.iter(|| tally_crypto::verify_signature(black_box(&msg), &sig, &kp.public))
    });
}

fn hash_fact_bench(c: &mut Criterion) {
    let data = [0xABu8; 512];

    c.bench_function("hash_fact_512B", |b| {
        b.iter(|| tally_crypto::hash_fact(black_box(&data)))
    });
}

fn derive_address_bench(c: &mut Criterion) {
    let keys_hash = tally_crypto::blake2b_256(b"keys");

    c.bench_function("derive_address", |b| {
        b.iter(|| tally_crypto::derive_address(black_box(&keys_hash)))
    });
}

criterion_group!(
    benches,
    ed25519_sign_bench,
    ed25519_verify_bench,
    hash_fact_bench,
    derive_address_bench
);
criterion_main!(benches);
