use std::ops::Mul;

use num_traits::Zero;

use crate::error::ConvertError;
use crate::tensor::{Matrix, Tensor3, Tensor4};
use super::im2col::validate;

/// Direct convolution over HWC tensors (reference implementation).
///
/// Output is laid out as `positions x filters`, matching the product of the
/// im2col matrices.
pub fn conv2d_naive<T>(
    input: &Tensor3<T>,
    kernel: &Tensor4<T>,
    padding: usize,
    stride: usize,
) -> Result<Matrix<T>, ConvertError>
where
    T: Copy + Zero + Mul<Output = T>,
{
    let geom = validate(input, kernel, padding, stride)?;
    let padded = input.padded(padding);
    let k = geom.kernel_size;
    let mut output = Matrix::new(geom.positions(), geom.filters);

    for oh in 0..geom.out_h {
        for ow in 0..geom.out_w {
            for f in 0..geom.filters {
                let mut sum = T::zero();
                for kr in 0..k {
                    for kc in 0..k {
                        for ch in 0..geom.channels {
                            let ih = oh * stride + kr;
                            let iw = ow * stride + kc;
                            sum = sum + padded.get(ih, iw, ch) * kernel.get(f, kr, kc, ch);
                        }
                    }
                }
                output.set(oh * geom.out_w + ow, f, sum);
            }
        }
    }
    Ok(output)
}
