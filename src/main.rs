//! lidl - micro-benchmark driver
//!
//! Mengukur jalur panas tanpa criterion:
//! - Builder: bump allocation
//! - Struct encode/decode in-place
//! - Vector & String encode/decode
//! - Mmap-backed region
//!
//! Log level lewat `RUST_LOG` (default: warn).

use std::error::Error;
use std::path::Path;
use std::time::Instant;

use lidl::{Builder, Decode, Memory, Vector, F32, I32, U64, U8};
use tracing_subscriber::EnvFilter;

lidl::lidl_struct! {
    struct Vec3f(size = 12, align = 4) {
        [0] x: F32 => set_x,
        [4] y: F32 => set_y,
        [8] z: F32 => set_z,
    }
}

lidl::lidl_struct! {
    struct Sample(size = 32, align = 8) {
        [0] id: I32 => set_id,
        [8] stamp: U64 => set_stamp,
        [16] position: Vec3f => set_position,
    }
}

const REGION_SIZE: usize = 64 * 1024 * 1024;

type BenchResult<T = ()> = Result<T, Box<dyn Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("🚀 lidl - Zero-Copy Schema Encoding");
    println!("===================================\n");

    if let Err(e) = run() {
        eprintln!("❌ Benchmark failed: {}", e);
        std::process::exit(1);
    }

    println!("\n✅ All benchmarks complete!");
    println!("\nTo start server: cargo run --release --bin lidl_calc -- server --addr 127.0.0.1:9999");
}

fn run() -> BenchResult {
    benchmark_builder()?;
    benchmark_struct()?;
    benchmark_vector_string()?;
    benchmark_mmap_region()?;
    Ok(())
}

fn report(label: &str, ops: usize, duration: std::time::Duration) {
    let ns = duration.as_nanos() as f64 / ops as f64;
    println!("  {:<16} {:>8.2} ns/op ({:.3} μs/op)", label, ns, ns / 1000.0);
}

fn benchmark_builder() -> lidl::Result<()> {
    println!("📊 Builder Benchmark (Bump Allocation)");
    println!("--------------------------------------");

    const ITERATIONS: usize = 1_000_000;
    let region = Memory::zeroed(REGION_SIZE);

    let mut builder = Builder::new(region.clone());
    let start = Instant::now();
    for i in 0..ITERATIONS {
        if builder.available() < 64 {
            builder = Builder::new(region.clone());
        }
        builder.allocate(8 + i % 8, 8)?;
    }
    let duration = start.elapsed();

    println!("  Operations: {}", ITERATIONS);
    report("Allocate:", ITERATIONS, duration);
    println!(
        "  Throughput:      {:.2} M ops/sec\n",
        ITERATIONS as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    Ok(())
}

fn benchmark_struct() -> lidl::Result<()> {
    println!("📊 Struct Benchmark (In-Place Encoding)");
    println!("---------------------------------------");

    const ITERATIONS: usize = 500_000;
    let region = Memory::zeroed(REGION_SIZE);
    let mut builder = Builder::new(region.clone());

    let mut samples = Vec::with_capacity(ITERATIONS);
    let start = Instant::now();
    for i in 0..ITERATIONS {
        let position = Vec3f::create(&mut builder, i as f32, 1.0f32, -1.0f32)?;
        samples.push(Sample::create(&mut builder, i as i32, i as u64, position)?);
    }
    let encode = start.elapsed();

    let start = Instant::now();
    let mut checksum = 0f64;
    for sample in &samples {
        checksum += sample.position()?.x()?.get() as f64 + sample.id()?.get() as f64;
    }
    let decode = start.elapsed();

    println!("  Struct size: 32 bytes (+12 nested)");
    println!("  Operations: {}", ITERATIONS);
    report("Encode:", ITERATIONS, encode);
    report("Decode:", ITERATIONS, decode);
    println!("  Checksum:        {:.0}\n", checksum);
    Ok(())
}

fn benchmark_vector_string() -> lidl::Result<()> {
    println!("📊 Vector & String Benchmark");
    println!("----------------------------");

    const ITERATIONS: usize = 200_000;
    const PAYLOAD_SIZE: usize = 64;

    let region = Memory::zeroed(REGION_SIZE);
    let mut builder = Builder::new(region.clone());
    let payload = vec![0xABu8; PAYLOAD_SIZE];

    let start = Instant::now();
    let mut vectors = Vec::with_capacity(ITERATIONS);
    for _ in 0..ITERATIONS {
        vectors.push(Vector::<U8>::create(&mut builder, payload.iter().copied())?);
    }
    let vector_encode = start.elapsed();

    let start = Instant::now();
    let mut total = 0usize;
    for vector in &vectors {
        total += vector.decode()?.len();
    }
    let vector_decode = start.elapsed();

    let mut builder = Builder::new(region);
    let start = Instant::now();
    let mut strings = Vec::with_capacity(ITERATIONS);
    for _ in 0..ITERATIONS {
        strings.push(lidl::String::create(&mut builder, "the quick brown fox")?);
    }
    let string_encode = start.elapsed();

    let start = Instant::now();
    for string in &strings {
        total += string.value()?.len();
    }
    let string_decode = start.elapsed();

    println!("  Payload size: {} bytes", PAYLOAD_SIZE);
    println!("  Operations: {}", ITERATIONS);
    report("Vector encode:", ITERATIONS, vector_encode);
    report("Vector decode:", ITERATIONS, vector_decode);
    report("String encode:", ITERATIONS, string_encode);
    report("String decode:", ITERATIONS, string_decode);
    println!("  Bytes decoded:   {}\n", total);
    Ok(())
}

/// Region di atas file; kegagalan mmap dilaporkan bersama path-nya
fn open_region(path: &Path, len: usize) -> BenchResult<Memory> {
    Memory::map_file(path, len).map_err(|e| format!("map {}: {}", path.display(), e).into())
}

fn benchmark_mmap_region() -> BenchResult {
    println!("📊 Mmap Region Benchmark (Zero-Copy)");
    println!("------------------------------------");

    const ITERATIONS: usize = 100_000;
    let path = Path::new("lidl_bench.dat");

    let region = open_region(path, REGION_SIZE)?;
    let mut builder = Builder::new(region.clone());

    let start = Instant::now();
    for i in 0..ITERATIONS {
        let position = Vec3f::create(&mut builder, 0.5f32, 0.25f32, i as f32)?;
        Sample::create(&mut builder, i as i32, 0u64, position)?;
    }
    let write = start.elapsed();

    let start = Instant::now();
    region
        .flush()
        .map_err(|e| format!("flush {}: {}", path.display(), e))?;
    let flush = start.elapsed();

    let written = builder.position();
    println!("  Operations: {}", ITERATIONS);
    report("Write:", ITERATIONS, write);
    println!("  Flush:           {:?}", flush);
    println!(
        "  Write throughput: {:.2} MB/sec",
        written as f64 / write.as_secs_f64() / 1_000_000.0
    );

    drop(builder);
    drop(region);
    std::fs::remove_file(path).ok();
    Ok(())
}
