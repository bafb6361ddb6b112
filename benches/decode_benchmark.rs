use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use tempfile::NamedTempFile;
use textreader::{count_rows, read_rows, FieldTypeLayout, ReadOptions};

fn numeric_file(rows: usize) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    for i in 0..rows {
        writeln!(temp, "{},{},{:.6},\"label {}\"", i, i * 100, i as f64 / 7.0, i % 97).unwrap();
    }
    temp.flush().unwrap();
    temp
}

fn benchmark_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_rows");

    for size in [1000, 10000, 100000].iter() {
        let temp = numeric_file(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let file = temp.reopen().unwrap();
                black_box(count_rows(&file, &ReadOptions::default()).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let format = "2q1d8s";
    let stride = FieldTypeLayout::parse(format).unwrap().stride();

    for size in [1000, 10000, 100000].iter() {
        let temp = numeric_file(*size);
        let mut dest = vec![0u8; stride * size];

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let file = temp.reopen().unwrap();
                let rows = read_rows(&file, format, &ReadOptions::default(), &mut dest).unwrap();
                black_box(rows);
            });
        });
    }

    group.finish();
}

fn benchmark_locale_floats(c: &mut Criterion) {
    let mut group = c.benchmark_group("locale_floats");
    let temp = {
        let mut temp = NamedTempFile::new().unwrap();
        for i in 0..10000 {
            writeln!(temp, "{},5D{};{},25", i, i % 10, i).unwrap();
        }
        temp.flush().unwrap();
        temp
    };
    let options = ReadOptions::default()
        .delimiter(b';')
        .decimal(b',')
        .exponent(b'D');
    let mut dest = vec![0u8; 16 * 10000];

    group.bench_function("10000_rows", |b| {
        b.iter(|| {
            let file = temp.reopen().unwrap();
            black_box(read_rows(&file, "2d", &options, &mut dest).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_count, benchmark_decode, benchmark_locale_floats);
criterion_main!(benches);
