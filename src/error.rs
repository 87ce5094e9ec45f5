use std::io;
use std::path::PathBuf;

/// Reasons a batch conversion rejects its inputs.
///
/// All checks run before any output is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("kernel channels ({kernel}) do not match input channels ({input})")]
    ChannelMismatch { input: usize, kernel: usize },

    #[error("kernel is {height}x{width}; only square kernels are supported")]
    NonSquareKernel { height: usize, width: usize },

    #[error("stride must be at least 1")]
    ZeroStride,

    #[error("output would be {height}x{width}; both extents must be positive")]
    DegenerateOutput { height: i64, width: i64 },
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to read network config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("layer {id} does not exist (network has {count} convolutional layers)")]
    UnknownLayer { id: usize, count: usize },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}
