//! Criterion benchmarks for the QuizLink text codec.
//!
//! Every inbound frame passes through `decode_frame` on the hub's single
//! dispatch task, so its latency bounds how quickly a verdict reaches both
//! peers.
//!
//! Run with:
//! ```bash
//! cargo bench --package quizlink-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quizlink_core::{decode_frame, encode_frame, Outbound, Verdict};
use serde_json::json;

// ── Frame fixtures ────────────────────────────────────────────────────────────

const IDENTIFY: &str = r#"{"type":"device"}"#;
const CHECK: &str = r#"{"command":"check","tag_id":"04A1B2C3D4"}"#;
const LOG: &str = r#"{"command":"log","message":"battery 87%"}"#;
const START: &str = r#"{"command":"start","message":{"question":"Which planet is largest?","options":["Mars","Jupiter","Venus","Earth"],"image":"planets.png"},"correctAnswer":"04A1B2C3D4"}"#;
const UNKNOWN: &str = r#"{"command":"reboot","delay":5}"#;

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");
    for (name, frame) in [
        ("identify", IDENTIFY),
        ("check", CHECK),
        ("log", LOG),
        ("start", START),
        ("unknown", UNKNOWN),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), frame, |b, frame| {
            b.iter(|| decode_frame(black_box(frame)))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    let frames = [
        ("start_input", Outbound::start_input(json!({"question": "Q1"}))),
        ("device_verdict", Outbound::device_verdict(Verdict::Correct)),
        (
            "controller_verdict",
            Outbound::controller_verdict(Verdict::Incorrect, "04A1B2C3D4"),
        ),
        ("ping", Outbound::ping()),
    ];
    for (name, frame) in &frames {
        group.bench_with_input(BenchmarkId::from_parameter(name), frame, |b, frame| {
            b.iter(|| encode_frame(black_box(frame)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
