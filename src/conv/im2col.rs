/// Batch im2col conversion.
///
/// Unfolds every receptive field of a zero-padded HWC input into one row of
/// `input_matrix` and every filter into one column of `kernel_matrix`, so that
/// `input_matrix x kernel_matrix` is the convolution output laid out as
/// `positions x filters`.

use num_traits::Zero;
use tracing::{debug, error};

use crate::error::ConvertError;
use crate::tensor::{Matrix, Tensor3, Tensor4};
use super::shape::output_extent;

/// Order in which a receptive field is flattened into a patch vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOrder {
    /// kernel-row, kernel-col, channel (channel innermost).
    RowColChannel,
    /// channel, kernel-row, kernel-col (column innermost).
    ChannelRowCol,
}

impl PatchOrder {
    /// Position of element `(kr, kc, ch)` inside a flattened patch.
    #[inline]
    pub fn index(self, kr: usize, kc: usize, ch: usize, kernel_size: usize, channels: usize) -> usize {
        match self {
            PatchOrder::RowColChannel => (kr * kernel_size + kc) * channels + ch,
            PatchOrder::ChannelRowCol => ch * kernel_size * kernel_size + kr * kernel_size + kc,
        }
    }
}

/// Patch order used by [`conv_convert`] and emitted by the streaming conversion.
///
/// Patches run along the columns of `input_matrix` (one row per output
/// position, row index `oh * out_w + ow`) and along the rows of
/// `kernel_matrix` (one column per filter).
pub const PATCH_ORDER: PatchOrder = PatchOrder::RowColChannel;

/// Geometry of a validated conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvGeometry {
    pub kernel_size: usize,
    pub channels: usize,
    pub filters: usize,
    pub out_h: usize,
    pub out_w: usize,
}

impl ConvGeometry {
    pub fn patch_len(&self) -> usize {
        self.kernel_size * self.kernel_size * self.channels
    }

    pub fn positions(&self) -> usize {
        self.out_h * self.out_w
    }
}

/// Runs every precondition of a conversion without touching any buffer.
pub fn validate<T>(
    input: &Tensor3<T>,
    kernel: &Tensor4<T>,
    padding: usize,
    stride: usize,
) -> Result<ConvGeometry, ConvertError> {
    if kernel.c != input.c {
        return Err(ConvertError::ChannelMismatch {
            input: input.c,
            kernel: kernel.c,
        });
    }
    if kernel.h != kernel.w {
        return Err(ConvertError::NonSquareKernel {
            height: kernel.h,
            width: kernel.w,
        });
    }
    let out_h = output_extent(input.h, padding, kernel.h, stride).ok_or(ConvertError::ZeroStride)?;
    let out_w = output_extent(input.w, padding, kernel.w, stride).ok_or(ConvertError::ZeroStride)?;
    if out_h <= 0 || out_w <= 0 {
        return Err(ConvertError::DegenerateOutput {
            height: out_h,
            width: out_w,
        });
    }
    Ok(ConvGeometry {
        kernel_size: kernel.h,
        channels: input.c,
        filters: kernel.f,
        out_h: out_h as usize,
        out_w: out_w as usize,
    })
}

/// Converts a convolution into matrix form using [`PATCH_ORDER`].
///
/// On error nothing is written to either matrix.
pub fn conv_convert<T: Copy + Zero>(
    input: &Tensor3<T>,
    kernel: &Tensor4<T>,
    padding: usize,
    stride: usize,
    input_matrix: &mut Matrix<T>,
    kernel_matrix: &mut Matrix<T>,
) -> Result<(), ConvertError> {
    conv_convert_with_order(input, kernel, padding, stride, PATCH_ORDER, input_matrix, kernel_matrix)
}

/// Same as [`conv_convert`] with an explicit patch order.
pub fn conv_convert_with_order<T: Copy + Zero>(
    input: &Tensor3<T>,
    kernel: &Tensor4<T>,
    padding: usize,
    stride: usize,
    order: PatchOrder,
    input_matrix: &mut Matrix<T>,
    kernel_matrix: &mut Matrix<T>,
) -> Result<(), ConvertError> {
    let geom = validate(input, kernel, padding, stride).map_err(|err| {
        error!(input = %input, kernel = %kernel, padding, stride, "conversion rejected: {err}");
        err
    })?;
    debug!(
        input = %input,
        kernel = %kernel,
        padding,
        stride,
        out_h = geom.out_h,
        out_w = geom.out_w,
        "im2col conversion"
    );

    let padded = input.padded(padding);
    let k = geom.kernel_size;
    let c = geom.channels;

    input_matrix.resize(geom.positions(), geom.patch_len());
    kernel_matrix.resize(geom.patch_len(), geom.filters);

    for oh in 0..geom.out_h {
        for ow in 0..geom.out_w {
            let row = oh * geom.out_w + ow;
            for kr in 0..k {
                for kc in 0..k {
                    let ih = oh * stride + kr;
                    let iw = ow * stride + kc;
                    for ch in 0..c {
                        input_matrix.set(row, order.index(kr, kc, ch, k, c), padded.get(ih, iw, ch));
                    }
                }
            }
        }
    }

    for f in 0..geom.filters {
        for kr in 0..k {
            for kc in 0..k {
                for ch in 0..c {
                    kernel_matrix.set(order.index(kr, kc, ch, k, c), f, kernel.get(f, kr, kc, ch));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_orders_are_permutations() {
        let (k, c) = (3, 2);
        for order in [PatchOrder::RowColChannel, PatchOrder::ChannelRowCol] {
            let mut seen = vec![false; k * k * c];
            for kr in 0..k {
                for kc in 0..k {
                    for ch in 0..c {
                        let i = order.index(kr, kc, ch, k, c);
                        assert!(!seen[i], "{:?} maps two elements to {}", order, i);
                        seen[i] = true;
                    }
                }
            }
        }
    }
}
