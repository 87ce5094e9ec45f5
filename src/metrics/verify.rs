use tracing::{debug, warn};

use crate::conv::{conv2d_naive, conv_convert, conv_convert_stream, matmul, StreamStats};
use crate::error::ConvertError;
use crate::fifo::Fifo;
use crate::network::LayerDescriptor;
use crate::tensor::Matrix;
use super::{synthetic_input, synthetic_kernel};

/// Outcome of checking one layer.
#[derive(Debug, Clone)]
pub struct LayerCheck {
    pub layer_idx: usize,
    pub padding: usize,
    pub stride: usize,
    pub positions: usize,
    pub patch_len: usize,
    /// Streaming output equals `input_matrix` flattened row-major.
    pub stream_matches: bool,
    /// `input_matrix x kernel_matrix` equals the direct convolution.
    pub product_matches: bool,
    pub stats: StreamStats,
}

impl LayerCheck {
    pub fn passed(&self) -> bool {
        self.stream_matches && self.product_matches
    }
}

/// Runs the batch and streaming conversions of `layer` on synthetic integer
/// data and compares them with each other and with a direct convolution.
pub fn check_layer(
    layer: &LayerDescriptor,
    layer_idx: usize,
    padding: usize,
    stride: usize,
) -> Result<LayerCheck, ConvertError> {
    let input = synthetic_input::<i64>(layer);
    let kernel = synthetic_kernel::<i64>(layer);

    let mut input_matrix = Matrix::empty();
    let mut kernel_matrix = Matrix::empty();
    conv_convert(&input, &kernel, padding, stride, &mut input_matrix, &mut kernel_matrix)?;

    let mut source: Fifo<i64> = input.data.iter().copied().collect();
    let mut streamed = Vec::with_capacity(input_matrix.data.len());
    let stats = conv_convert_stream(layer, padding, stride, &mut source, &mut streamed);
    let stream_matches = streamed == input_matrix.data;

    let product = matmul(&input_matrix, &kernel_matrix);
    let direct = conv2d_naive(&input, &kernel, padding, stride)?;
    let product_matches = product == direct;

    let check = LayerCheck {
        layer_idx,
        padding,
        stride,
        positions: input_matrix.rows,
        patch_len: input_matrix.cols,
        stream_matches,
        product_matches,
        stats,
    };
    if check.passed() {
        debug!(layer = layer_idx, positions = check.positions, "layer check passed");
    } else {
        warn!(
            layer = layer_idx,
            stream_matches,
            product_matches,
            "layer check failed"
        );
    }
    Ok(check)
}
