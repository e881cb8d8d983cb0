use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rowdelta::{decode, Encoder, EncoderConfig, Variant};

const COLUMNS: u8 = 8;

/// Slowly drifting channels with rare large jumps
fn sample_rows(count: usize) -> Vec<Vec<u32>> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut cur: Vec<u32> = (0..COLUMNS).map(|c| 1_000_000 + u32::from(c) * 50_000).collect();
    (0..count)
        .map(|_| {
            for v in &mut cur {
                let step: i64 = if rng.random_ratio(1, 100) {
                    rng.random_range(-5_000_000..5_000_000)
                } else {
                    rng.random_range(-50..50)
                };
                *v = (i64::from(*v) + step).clamp(0, 0x7FFF_FFFF) as u32;
            }
            cur.clone()
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for count in [100usize, 1000, 10000] {
        let rows = sample_rows(count);
        let mut storage = vec![0u8; count * usize::from(COLUMNS) * 4];
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("{count}_rows"), |b| {
            b.iter(|| {
                let mut enc = Encoder::with_columns(COLUMNS, 64, &mut storage[..]).unwrap();
                for row in &rows {
                    enc.write_row(black_box(row)).unwrap();
                }
                black_box(enc.size())
            })
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    // Pre-encode data
    let rows = sample_rows(10000);
    let mut enc = Encoder::with_columns(COLUMNS, 64, vec![0u8; rows.len() * usize::from(COLUMNS) * 4]).unwrap();
    for row in &rows {
        enc.write_row(row).unwrap();
    }
    let bytes = enc.as_bytes().to_vec();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(10000));
    group.bench_function("10000_rows", |b| b.iter(|| black_box(decode(black_box(&bytes), COLUMNS, Variant::Rdes2))));
    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let rows = sample_rows(1000);
    let mut group = c.benchmark_group("roundtrip");
    group.throughput(Throughput::Elements(1000));
    for variant in [Variant::Rdes1, Variant::Rdes2, Variant::Rdes3] {
        let config = EncoderConfig::new(COLUMNS).with_variant(variant);
        group.bench_function(format!("1000_rows_{variant}"), |b| {
            b.iter(|| {
                let mut enc = Encoder::new(config, vec![0u8; 1000 * usize::from(COLUMNS) * 4]).unwrap();
                for row in &rows {
                    enc.write_row(row).unwrap();
                }
                black_box(decode(enc.as_bytes(), COLUMNS, variant))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_roundtrip);
criterion_main!(benches);
