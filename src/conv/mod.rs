/// Convolution unrolling.
///
/// Batch im2col over materialised tensors, a bounded-memory streaming variant
/// that emits the same patches, plus a direct reference convolution and a
/// tiled GEMM for checking that the unrolled product equals the convolution.

mod shape;
mod im2col;
mod stream;
mod naive;
mod gemm;

use std::ops::Mul;

use num_traits::Zero;

pub use shape::{output_extent, positive_extent};
pub use im2col::{conv_convert, conv_convert_with_order, validate, ConvGeometry, PatchOrder, PATCH_ORDER};
pub use stream::{conv_convert_stream, window_len, StreamStats};
pub use naive::conv2d_naive;
pub use gemm::matmul;

use crate::error::ConvertError;
use crate::tensor::{Matrix, Tensor3, Tensor4};

/// Im2col conversion followed by GEMM.
///
/// Output is `positions x filters`, identical to [`conv2d_naive`].
pub fn conv2d_im2col<T>(
    input: &Tensor3<T>,
    kernel: &Tensor4<T>,
    padding: usize,
    stride: usize,
) -> Result<Matrix<T>, ConvertError>
where
    T: Copy + Zero + Mul<Output = T>,
{
    let mut input_matrix = Matrix::empty();
    let mut kernel_matrix = Matrix::empty();
    conv_convert(input, kernel, padding, stride, &mut input_matrix, &mut kernel_matrix)?;
    Ok(matmul(&input_matrix, &kernel_matrix))
}
