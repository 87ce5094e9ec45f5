use std::time::{Duration, Instant};

use tracing::warn;

use crate::conv::{conv_convert, conv_convert_stream, validate, window_len};
use crate::fifo::Fifo;
use crate::network::{FeatureShape, Network};
use crate::tensor::Matrix;
use super::{synthetic_input, synthetic_kernel};

/// Per-layer timing and working-set figures.
pub struct LayerMetrics {
    pub layer_idx: usize,
    pub input: FeatureShape,
    pub kernel_size: usize,
    pub batch_time: Duration,
    pub stream_time: Duration,
    /// Elements held by the batch path: padded copy plus `input_matrix`.
    pub batch_mem: usize,
    /// Elements held by the streaming window.
    pub stream_mem: usize,
    pub output_elements: usize,
}

/// Aggregate results across every convertible layer of a network.
pub struct BenchmarkResult {
    pub layer_metrics: Vec<LayerMetrics>,
    pub batch_total_time: Duration,
    pub stream_total_time: Duration,
    pub iterations: usize,
}

/// Times both conversion paths on every layer, averaging over `iterations`.
///
/// Each layer uses its own recorded padding and stride. Layers whose geometry
/// the batch conversion rejects are skipped with a warning.
pub fn run_benchmark(net: &Network, iterations: usize) -> BenchmarkResult {
    let iterations = iterations.max(1);
    let mut layer_metrics = Vec::new();
    let mut batch_total_time = Duration::ZERO;
    let mut stream_total_time = Duration::ZERO;

    for (idx, layer) in net.layers().iter().enumerate() {
        let input = synthetic_input::<f32>(layer);
        let kernel = synthetic_kernel::<f32>(layer);
        let geom = match validate(&input, &kernel, layer.padding, layer.stride) {
            Ok(geom) => geom,
            Err(err) => {
                warn!(layer = idx, "skipping layer: {err}");
                continue;
            }
        };

        let mut input_matrix = Matrix::empty();
        let mut kernel_matrix = Matrix::empty();
        let mut batch_time = Duration::ZERO;
        for _ in 0..iterations {
            let start = Instant::now();
            if let Err(err) = conv_convert(
                &input,
                &kernel,
                layer.padding,
                layer.stride,
                &mut input_matrix,
                &mut kernel_matrix,
            ) {
                warn!(layer = idx, "batch conversion failed: {err}");
            }
            batch_time += start.elapsed();
        }

        let mut stream_time = Duration::ZERO;
        let mut output_elements = 0;
        for _ in 0..iterations {
            let mut source: Fifo<f32> = input.data.iter().copied().collect();
            let mut sink = Fifo::<f32>::new();
            let start = Instant::now();
            let stats = conv_convert_stream(layer, layer.padding, layer.stride, &mut source, &mut sink);
            stream_time += start.elapsed();
            output_elements = stats.elements_written;
        }

        let padded = (layer.input_height + 2 * layer.padding)
            * (layer.input_width + 2 * layer.padding)
            * layer.input_channels;
        let metrics = LayerMetrics {
            layer_idx: idx,
            input: layer.input_shape(),
            kernel_size: layer.kernel_size,
            batch_time: per_iteration(batch_time, iterations),
            stream_time: per_iteration(stream_time, iterations),
            batch_mem: padded + geom.positions() * geom.patch_len(),
            stream_mem: window_len(layer, layer.padding),
            output_elements,
        };
        batch_total_time += metrics.batch_time;
        stream_total_time += metrics.stream_time;
        layer_metrics.push(metrics);
    }

    BenchmarkResult {
        layer_metrics,
        batch_total_time,
        stream_total_time,
        iterations,
    }
}

/// Mean duration of one iteration. Counts beyond `u32::MAX` saturate.
fn per_iteration(total: Duration, iterations: usize) -> Duration {
    total / u32::try_from(iterations.max(1)).unwrap_or(u32::MAX)
}

/// Print a formatted benchmark report to stdout.
pub fn print_report(result: &BenchmarkResult) {
    println!("\n=== Per-Layer Metrics ({} iterations) ===", result.iterations);
    println!(
        "{:<6} {:<14} {:>6} {:>11} {:>11} {:>12} {:>12} {:>12}",
        "Layer", "Input", "Kernel", "Batch Time", "Stream Time", "Batch Mem", "Window Mem", "Output"
    );

    for m in &result.layer_metrics {
        let batch_ms = m.batch_time.as_micros() as f64 / 1000.0;
        let stream_ms = m.stream_time.as_micros() as f64 / 1000.0;

        println!(
            "{:<6} {:<14} {:>6} {:>9.2}ms {:>9.2}ms {:>12} {:>12} {:>12}",
            m.layer_idx,
            m.input.to_string(),
            m.kernel_size,
            batch_ms,
            stream_ms,
            m.batch_mem,
            m.stream_mem,
            m.output_elements
        );
    }

    let batch_total_ms = result.batch_total_time.as_micros() as f64 / 1000.0;
    let stream_total_ms = result.stream_total_time.as_micros() as f64 / 1000.0;
    let peak_batch = result.layer_metrics.iter().map(|m| m.batch_mem).max().unwrap_or(0);
    let peak_stream = result.layer_metrics.iter().map(|m| m.stream_mem).max().unwrap_or(0);
    let savings = if peak_batch > 0 {
        (1.0 - peak_stream as f64 / peak_batch as f64) * 100.0
    } else {
        0.0
    };

    println!("\n=== Totals ===");
    println!("Batch:  {:.1}ms  peak {} elements", batch_total_ms, peak_batch);
    println!(
        "Stream: {:.1}ms  peak {} elements    Savings: {:.0}%",
        stream_total_ms, peak_stream, savings
    );
}
