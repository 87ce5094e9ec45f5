//! Shape inference for darknet-style network descriptions and im2col
//! unrolling of convolutions.
//!
//! A [`network::Network`] parses `[net]` / `[convolutional]` / `[maxpool]`
//! sections into per-layer dimensions. Convolutions can then be unrolled
//! into matrix form either in one shot over materialised tensors
//! ([`conv::conv_convert`]) or through FIFOs with a window of only
//! `kernel_size` rows ([`conv::conv_convert_stream`]). Both paths emit
//! patches in [`conv::PATCH_ORDER`].
//!
//! # Example
//!
//! ```
//! use convunroll::network::Network;
//!
//! let net = Network::from_lines([
//!     "[net]", "height=8", "width=8", "channels=3",
//!     "[convolutional]", "filters=4", "size=3", "stride=1", "pad=1",
//! ]);
//! assert_eq!(net.parameters(), "1\n8 8 3 4 3 3 8 8 4 \n");
//! ```

/// HWC / FHWC tensors and resizable matrices.
pub mod tensor;
/// FIFO channels for the streaming conversion.
pub mod fifo;
/// Error types.
pub mod error;
/// Network config parsing and per-layer descriptors.
pub mod network;
/// Batch and streaming im2col, reference convolution and GEMM.
pub mod conv;
/// Layer checks and benchmarking utilities.
pub mod metrics;

pub use error::{ConvertError, NetworkError};
