//! Benchmark tests for the scanner

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use space_hogs::report::top_k;
use space_hogs::scanner::{scan, ReaderKind, ScanOptions, SizeRecord};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a benchmark tree with the given number of files spread across
/// the given number of directories
fn create_benchmark_dir(file_count: usize, dir_count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let files_per_dir = if dir_count > 0 {
        file_count / dir_count
    } else {
        file_count
    };

    for d in 0..dir_count {
        let subdir = root.join(format!("dir{}", d));
        fs::create_dir(&subdir).unwrap();

        for f in 0..files_per_dir {
            let mut file = File::create(subdir.join(format!("file{}.txt", f))).unwrap();
            file.write_all(&vec![b'x'; 1024]).unwrap();
        }
    }

    // Create remaining files in root if needed
    let remaining = file_count - (files_per_dir * dir_count);
    for f in 0..remaining {
        let mut file = File::create(root.join(format!("root_file{}.txt", f))).unwrap();
        file.write_all(&vec![b'y'; 1024]).unwrap();
    }

    dir
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [100, 500, 1000].iter() {
        let dir = create_benchmark_dir(*size, 10);
        let serial = ScanOptions::new().with_jobs(1);
        let pooled = ScanOptions::new();

        group.bench_with_input(BenchmarkId::new("single_worker", size), size, |b, _| {
            b.iter(|| scan(black_box(dir.path()), &serial).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("pooled", size), size, |b, _| {
            b.iter(|| scan(black_box(dir.path()), &pooled).unwrap())
        });
    }

    group.finish();
}

fn benchmark_deep_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_scan");

    // Create 20 levels deep with 10 files each
    let dir = TempDir::new().unwrap();
    let mut current = dir.path().to_path_buf();
    for level in 0..20 {
        current = current.join(format!("level{}", level));
        fs::create_dir(&current).unwrap();

        for f in 0..10 {
            let mut file = File::create(current.join(format!("file{}.txt", f))).unwrap();
            file.write_all(&vec![b'z'; 512]).unwrap();
        }
    }

    let options = ScanOptions::new();

    group.bench_function("pooled", |b| {
        b.iter(|| scan(black_box(dir.path()), &options).unwrap())
    });

    group.finish();
}

fn benchmark_reader_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader");

    let dir = create_benchmark_dir(1000, 20);
    let raw = ScanOptions::new();
    let portable = ScanOptions::new().with_reader(ReaderKind::Portable);

    group.bench_function("raw", |b| {
        b.iter(|| scan(black_box(dir.path()), &raw).unwrap())
    });

    group.bench_function("portable", |b| {
        b.iter(|| scan(black_box(dir.path()), &portable).unwrap())
    });

    group.finish();
}

fn benchmark_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k");

    for size in [1_000usize, 100_000].iter() {
        let records: Vec<SizeRecord> = (0..*size)
            .map(|i| SizeRecord {
                path: PathBuf::from(format!("/bench/file-{}", i)),
                size: (i as u64 * 7919) % 1_000_003,
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| top_k(black_box(records.clone()), 10))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_scan,
    benchmark_deep_scan,
    benchmark_reader_backends,
    benchmark_top_k
);
criterion_main!(benches);
