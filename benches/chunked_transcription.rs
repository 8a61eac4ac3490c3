use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use offscribe::TranscriptionPipeline;
use offscribe::engine::mock::MockEngine;
use std::hint::black_box;
use std::path::PathBuf;

/// Write `seconds` of 16 kHz 16-bit audio with one spoken phrase in the middle.
fn write_audio(dir: &tempfile::TempDir, seconds: usize) -> PathBuf {
    let total = seconds * 16000 * 2;
    let mut bytes = vec![0u8; total / 2];
    bytes.extend_from_slice(b"the quick brown fox");
    bytes.resize(total, 0);

    let path = dir.path().join(format!("{seconds}s.raw"));
    std::fs::write(&path, bytes).expect("Failed to write bench audio");
    path
}

/// Chunking and per-call session overhead of the pipeline itself.
fn criterion_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let model = dir.path().join("model");
    std::fs::create_dir_all(&model).expect("Failed to create model dir");

    let pipeline = TranscriptionPipeline::new(MockEngine::new());
    pipeline.load_model(&model).expect("Failed to load mock model");

    let mut group = c.benchmark_group("chunked_transcription");
    for seconds in [1usize, 10, 60] {
        let audio = write_audio(&dir, seconds);
        group.throughput(Throughput::Bytes((seconds * 16000 * 2) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{seconds}s")),
            &audio,
            |b, audio| {
                b.iter(|| {
                    pipeline
                        .transcribe(black_box(audio))
                        .expect("Transcription failed")
                });
            },
        );
    }
    group.finish();

    c.bench_function("load_model", |b| {
        b.iter(|| pipeline.load_model(black_box(&model)).expect("Failed to load mock model"));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
