use convunroll::conv::{conv_convert, conv_convert_stream, window_len, StreamStats};
use convunroll::fifo::{Fifo, StreamSource};
use convunroll::metrics::verify::check_layer;
use convunroll::network::{LayerDescriptor, Network};
use convunroll::tensor::{Matrix, Tensor3, Tensor4};
use convunroll::NetworkError;

/// Source that counts reads and fails the test on a read while empty.
struct CountingSource {
    inner: Fifo<i64>,
    reads: usize,
}

impl CountingSource {
    fn new(values: impl IntoIterator<Item = i64>) -> Self {
        CountingSource {
            inner: values.into_iter().collect(),
            reads: 0,
        }
    }
}

impl StreamSource<i64> for CountingSource {
    fn is_empty(&self) -> bool {
        StreamSource::is_empty(&self.inner)
    }

    fn read(&mut self) -> Option<i64> {
        assert!(!StreamSource::is_empty(&self.inner), "read issued on an empty stream");
        self.reads += 1;
        self.inner.read()
    }
}

fn layer(h: usize, w: usize, c: usize, k: usize) -> LayerDescriptor {
    LayerDescriptor {
        input_height: h,
        input_width: w,
        input_channels: c,
        filters: 1,
        kernel_size: k,
        kernel_channels: c,
        output_height: 0,
        output_width: 0,
        output_channels: 1,
        padding: 0,
        stride: 1,
    }
}

/// Distinct values so any misplaced element shows up.
fn input_values(n: usize) -> Vec<i64> {
    (1..=n as i64).collect()
}

fn batch_patches(desc: &LayerDescriptor, data: Vec<i64>, padding: usize, stride: usize) -> Vec<i64> {
    let input = Tensor3::from_vec(desc.input_height, desc.input_width, desc.input_channels, data);
    let kernel = Tensor4::<i64>::new(1, desc.kernel_size, desc.kernel_size, desc.input_channels);
    let mut input_matrix = Matrix::empty();
    let mut kernel_matrix = Matrix::empty();
    conv_convert(&input, &kernel, padding, stride, &mut input_matrix, &mut kernel_matrix).unwrap();
    input_matrix.data
}

fn stream_patches(desc: &LayerDescriptor, data: Vec<i64>, padding: usize, stride: usize) -> (Vec<i64>, StreamStats) {
    let mut source: Fifo<i64> = data.into_iter().collect();
    let mut sink = Fifo::new();
    let stats = conv_convert_stream(desc, padding, stride, &mut source, &mut sink);
    (sink.drain(), stats)
}

#[test]
fn stream_matches_batch() {
    // (h, w, c, kernel, padding, stride)
    let cases = [
        (5, 5, 1, 3, 0, 1),
        (5, 5, 1, 3, 1, 1),
        (6, 4, 3, 3, 1, 2),
        (7, 7, 2, 2, 0, 3),
        (8, 5, 2, 3, 2, 3),
        (4, 4, 2, 1, 0, 1),
        (3, 3, 1, 3, 3, 2),
        (9, 9, 3, 5, 2, 1),
        (2, 6, 1, 4, 1, 1),
    ];
    for (h, w, c, k, pad, stride) in cases {
        let desc = layer(h, w, c, k);
        let data = input_values(h * w * c);
        let expected = batch_patches(&desc, data.clone(), pad, stride);
        let (streamed, stats) = stream_patches(&desc, data, pad, stride);
        assert_eq!(
            streamed, expected,
            "stream/batch mismatch for {}x{}x{} k={} pad={} stride={}",
            h, w, c, k, pad, stride
        );
        assert_eq!(stats.elements_written, expected.len());
        assert_eq!(stats.underrun, 0);
    }
}

#[test]
fn never_reads_past_the_layer_input() {
    for (h, w, c, k, pad, stride) in [(5, 5, 2, 3, 1, 1), (6, 6, 1, 2, 0, 2), (4, 7, 3, 3, 2, 3)] {
        let desc = layer(h, w, c, k);
        let total = h * w * c;
        // Trailing sentinels belong to the next layer's input.
        let mut source = CountingSource::new(input_values(total).into_iter().chain([-1, -2, -3]));
        let mut sink = Vec::new();
        let stats = conv_convert_stream(&desc, pad, stride, &mut source, &mut sink);

        assert!(source.reads <= total, "read {} of {} elements", source.reads, total);
        assert_eq!(stats.elements_read, source.reads);
        assert!(!sink.contains(&-1));
        assert_eq!(source.inner.read(), if source.reads == total { Some(-1) } else { Some(source.reads as i64 + 1) });
    }
}

#[test]
fn full_stride_one_reads_everything() {
    let desc = layer(5, 5, 2, 3);
    let mut source = CountingSource::new(input_values(50));
    let mut sink = Vec::new();
    conv_convert_stream(&desc, 1, 1, &mut source, &mut sink);
    assert_eq!(source.reads, 50);
    assert!(StreamSource::is_empty(&source));
}

#[test]
fn underrun_reads_as_zero() {
    let desc = layer(4, 4, 1, 3);
    let available = 9;
    let (streamed, stats) = stream_patches(&desc, input_values(available), 1, 1);

    let mut padded_data = input_values(available);
    padded_data.resize(16, 0);
    let expected = batch_patches(&desc, padded_data, 1, 1);

    assert_eq!(streamed, expected);
    assert_eq!(stats.elements_read, available);
    assert_eq!(stats.underrun, 16 - available);
}

#[test]
fn empty_input_emits_zero_windows() {
    let desc = layer(3, 3, 2, 3);
    let (streamed, stats) = stream_patches(&desc, Vec::new(), 1, 1);
    assert_eq!(streamed.len(), 9 * 18);
    assert!(streamed.iter().all(|&v| v == 0));
    assert_eq!(stats.elements_read, 0);
    assert_eq!(stats.underrun, 18);
}

#[test]
fn kernel_larger_than_padded_input_emits_nothing() {
    let desc = layer(2, 2, 1, 5);
    let mut source = CountingSource::new(input_values(4));
    let mut sink = Vec::new();
    let stats = conv_convert_stream(&desc, 1, 1, &mut source, &mut sink);
    assert!(sink.is_empty());
    assert_eq!(source.reads, 0);
    assert_eq!(stats, StreamStats::default());
}

#[test]
fn window_holds_kernel_size_rows() {
    let desc = layer(416, 416, 3, 3);
    assert_eq!(window_len(&desc, 1), 3 * 418 * 3);
    assert_eq!(window_len(&desc, 0), 3 * 416 * 3);
}

#[test]
fn window_rows_follow_stride() {
    // Stride larger than the kernel: padded row r holds r + 1 in both columns.
    let desc = layer(9, 2, 1, 2);
    let mut source: Fifo<i64> = (0..9).flat_map(|r| [r + 1, r + 1]).collect();
    let mut sink = Vec::new();
    conv_convert_stream(&desc, 0, 3, &mut source, &mut sink);
    // 3x1 outputs; output row i covers padded rows 3i and 3i + 1
    assert_eq!(sink, vec![1, 1, 2, 2, 4, 4, 5, 5, 7, 7, 8, 8]);
}

#[test]
fn narrower_than_kernel_emits_nothing() {
    let desc = layer(9, 1, 1, 2);
    let (streamed, stats) = stream_patches(&desc, input_values(9), 0, 1);
    assert!(streamed.is_empty());
    assert_eq!(stats.elements_read, 0);
}

const CONFIG: &str = "\
[net]
height=6
width=6
channels=2
[convolutional]
filters=3
size=3
stride=1
pad=1
[maxpool]
size=2
stride=2
[convolutional]
filters=4
size=3
stride=2
pad=1
";

#[test]
fn network_streams_recorded_layers() {
    let net = Network::from_lines(CONFIG.lines());
    let desc = *net.layer(1).unwrap();
    assert_eq!(desc.input_shape().to_string(), "3x3x3");

    let data = input_values(27);
    let expected = batch_patches(&desc, data.clone(), desc.padding, desc.stride);
    let mut source: Fifo<i64> = data.into_iter().collect();
    let mut sink = Vec::new();
    let stats = net
        .conv_convert_stream(1, desc.padding, desc.stride, &mut source, &mut sink)
        .unwrap();
    assert_eq!(sink, expected);
    assert_eq!(stats.elements_written, 2 * 2 * 27);
}

#[test]
fn unknown_layer_is_reported() {
    let net = Network::from_lines(CONFIG.lines());
    let mut source: Fifo<i64> = Fifo::new();
    let mut sink: Vec<i64> = Vec::new();
    let err = net.conv_convert_stream(2, 1, 1, &mut source, &mut sink).unwrap_err();
    assert!(matches!(err, NetworkError::UnknownLayer { id: 2, count: 2 }));
}

#[test]
fn layer_checks_pass_for_every_layer() {
    let net = Network::from_lines(CONFIG.lines());
    for (id, desc) in net.layers().iter().enumerate() {
        let check = check_layer(desc, id, desc.padding, desc.stride).unwrap();
        assert!(check.passed(), "layer {} failed: {:?}", id, check);
        assert_eq!(check.stats.underrun, 0);
    }
}
