use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use buckaroo_lib::codec;
use buckaroo_lib::signature::constant_time_eq;
use buckaroo_lib::{HashMethod, ParameterSet, Signer};

fn callback_params() -> ParameterSet {
    let mut params = ParameterSet::new();
    params.insert("brq_amount", "10.00");
    params.insert("brq_currency", "EUR");
    params.insert("brq_customer_name", "J. de Tester");
    params.insert("brq_invoicenumber", "12345");
    params.insert("brq_payment", "E86256B2787EE7FF0C33D0D4C6159CD922227B79");
    params.insert("brq_service_ideal_consumerbic", "RABONL2U");
    params.insert("brq_service_ideal_consumeriban", "NL44RABO0123456789");
    params.insert("brq_statuscode", "190");
    params.insert("brq_timestamp", "2014-11-05 13:10:42");
    params.insert("brq_transaction_method", "ideal");
    params.insert("brq_transaction_type", "C021");
    params.insert("brq_transactions", "41C48B55FA9164E123CC73B1157459E840BE5D24");
    params.insert("brq_websitekey", "12345678");
    params
}

fn signing_benchmark(c: &mut Criterion) {
    let params = callback_params();

    let mut group = c.benchmark_group("sign");
    for method in [HashMethod::Sha1, HashMethod::Sha256, HashMethod::Sha512] {
        let signer = Signer::new("7C222FB2927D828AF22F592134E8932480637C0D", method);
        group.bench_with_input(BenchmarkId::from_parameter(method), &params, |b, params| {
            b.iter(|| signer.sign(black_box(params)))
        });
    }
    group.finish();

    let signer = Signer::new("7C222FB2927D828AF22F592134E8932480637C0D", HashMethod::Sha1);
    let mut signed = params.clone();
    signer.append_signature(&mut signed);
    let body = codec::encode_to_bytes(&signed);

    c.bench_function("decode_and_verify", |b| {
        b.iter(|| {
            let decoded = codec::decode(black_box(&body));
            signer.verify(&decoded)
        })
    });
}

/// Mismatches in the first and last byte should take the same time.
fn comparison_benchmark(c: &mut Criterion) {
    let expected = [b'a'; 128];
    let mut first = expected;
    first[0] = b'b';
    let mut last = expected;
    last[127] = b'b';

    let mut group = c.benchmark_group("constant_time_eq");
    group.bench_function("equal", |b| {
        b.iter(|| constant_time_eq(black_box(&expected), black_box(&expected)))
    });
    group.bench_function("first_byte_differs", |b| {
        b.iter(|| constant_time_eq(black_box(&expected), black_box(&first)))
    });
    group.bench_function("last_byte_differs", |b| {
        b.iter(|| constant_time_eq(black_box(&expected), black_box(&last)))
    });
    group.finish();
}

criterion_group!(benches, signing_benchmark, comparison_benchmark);
criterion_main!(benches);
