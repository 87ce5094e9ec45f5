/// Batch vs streaming timing and working-set comparison.
pub mod benchmark;
/// Per-layer agreement checks between the conversion paths.
pub mod verify;

use num_traits::FromPrimitive;
use num_traits::Zero;

use crate::network::LayerDescriptor;
use crate::tensor::{Tensor3, Tensor4};

/// Small repeating integer pattern, exact in every numeric type.
fn pattern<T: FromPrimitive + Zero>(i: usize, salt: usize) -> T {
    let v = ((i * 7 + salt * 3) % 17) as i64 - 8;
    T::from_i64(v).unwrap_or_else(T::zero)
}

/// Deterministic input feature map matching `layer`'s input shape.
pub fn synthetic_input<T: Copy + Zero + FromPrimitive>(layer: &LayerDescriptor) -> Tensor3<T> {
    let (h, w, c) = (layer.input_height, layer.input_width, layer.input_channels);
    let data = (0..h * w * c).map(|i| pattern(i, 1)).collect();
    Tensor3::from_vec(h, w, c, data)
}

/// Deterministic filter bank matching `layer`'s kernel shape.
pub fn synthetic_kernel<T: Copy + Zero + FromPrimitive>(layer: &LayerDescriptor) -> Tensor4<T> {
    let (f, k, c) = (layer.filters, layer.kernel_size, layer.kernel_channels);
    let data = (0..f * k * k * c).map(|i| pattern(i, 2)).collect();
    Tensor4::from_vec(f, k, k, c, data)
}
