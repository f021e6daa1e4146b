// Demultiplexer throughput benchmark
// Measures decoding of a captured sandbox stream fed in engine-sized chunks
// Target: p50 < 5ms for 4 MiB of mixed stdout/stderr frames

use benchbox::core::framing::{encode_frame, Channel, Demuxer};
use benchbox::StreamSelection;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Benchmark configuration
const ITERATIONS: usize = 100;
const WARMUP_ITERATIONS: usize = 10;
const STREAM_BYTES: usize = 4 * 1024 * 1024;

/// Latency percentiles
struct LatencyStats {
    p50: Duration,
    p95: Duration,
    min: Duration,
    max: Duration,
    mean: Duration,
}

impl LatencyStats {
    fn from_samples(mut samples: Vec<Duration>) -> Self {
        samples.sort();
        let len = samples.len();

        let sum: Duration = samples.iter().sum();

        Self {
            p50: samples[(len as f64 * 0.50) as usize],
            p95: samples[(len as f64 * 0.95) as usize],
            min: samples[0],
            max: samples[len - 1],
            mean: sum / len as u32,
        }
    }

    fn print(&self, label: &str) {
        println!("\n=== {} ===", label);
        println!("  p50: {:?}", self.p50);
        println!("  p95: {:?}", self.p95);
        println!("  min: {:?}", self.min);
        println!("  max: {:?}", self.max);
        println!("  mean: {:?}", self.mean);
    }
}

/// Alternating stdout/stderr frames of varying size
fn captured_stream() -> Vec<u8> {
    let mut stream = Vec::with_capacity(STREAM_BYTES);
    let mut size = 1;
    while stream.len() < STREAM_BYTES {
        let channel = if size % 2 == 0 { Channel::Stdout } else { Channel::Stderr };
        let payload = vec![b'x'; size];
        stream.extend(encode_frame(channel, &payload).expect("frame fits"));
        size = size % 8191 + 97;
    }
    stream
}

fn measure(stream: &[u8], chunk: usize, selection: StreamSelection) -> LatencyStats {
    let run = || {
        let mut demuxer = Demuxer::new(selection).with_limit(usize::MAX);
        for piece in stream.chunks(chunk) {
            demuxer.push(piece);
        }
        black_box(demuxer.finish())
    };

    for _ in 0..WARMUP_ITERATIONS {
        run();
    }

    let samples = (0..ITERATIONS)
        .map(|_| {
            let start = Instant::now();
            run();
            start.elapsed()
        })
        .collect();

    LatencyStats::from_samples(samples)
}

fn main() {
    println!("Demux throughput ({} MiB stream)", STREAM_BYTES / (1024 * 1024));
    let stream = captured_stream();

    let scenarios = [
        ("8 KiB chunks, both channels", 8 * 1024, StreamSelection::all()),
        ("8 KiB chunks, stderr only", 8 * 1024, StreamSelection::stderr_only()),
        ("64 KiB chunks, both channels", 64 * 1024, StreamSelection::all()),
        ("13 byte chunks, both channels", 13, StreamSelection::all()),
    ];

    let mut failed = false;
    for (label, chunk, selection) in scenarios {
        let stats = measure(&stream, chunk, selection);
        stats.print(label);
        if chunk >= 8 * 1024 && stats.p50 >= Duration::from_millis(5) {
            println!("❌ FAIL: p50={:?} (target <5ms)", stats.p50);
            failed = true;
        } else {
            println!("✅ PASS");
        }
    }

    if failed {
        std::process::exit(1);
    }
}
