/// Layer descriptor records and the diagnostics a parse can produce.
mod store;
/// Section/key state machine over darknet-style config lines.
mod parser;

pub use store::{FeatureShape, LayerDescriptor, LayerStore, ParseDiagnostic};
pub use parser::ConfigParser;

use std::fs;
use std::path::{Path, PathBuf};

use num_traits::Zero;
use tracing::info;

use crate::conv::{conv_convert_stream, StreamStats};
use crate::error::NetworkError;
use crate::fifo::{StreamSink, StreamSource};

/// A parsed network description.
///
/// Holds the per-layer shapes inferred from the config and drives the
/// streaming conversion for individual layers.
#[derive(Debug, Clone)]
pub struct Network {
    source: Option<PathBuf>,
    store: LayerStore,
}

impl Network {
    /// Reads and parses the config file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = ConfigParser::parse(text.lines());
        info!(
            path = %path.display(),
            layers = store.len(),
            diagnostics = store.diagnostics().len(),
            "loaded network config"
        );
        Ok(Network {
            source: Some(path.to_path_buf()),
            store,
        })
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Network {
            source: None,
            store: ConfigParser::parse(lines),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Number of convolutional layers recorded.
    pub fn layer_number(&self) -> usize {
        self.store.len()
    }

    pub fn layers(&self) -> &[LayerDescriptor] {
        self.store.layers()
    }

    pub fn layer(&self, id: usize) -> Result<&LayerDescriptor, NetworkError> {
        self.store.get(id).ok_or(NetworkError::UnknownLayer {
            id,
            count: self.store.len(),
        })
    }

    /// Parameter report: the layer count, then one line per layer with input
    /// H W C, kernel count/size/channels and output H W C.
    pub fn parameters(&self) -> String {
        let mut report = format!("{}\n", self.layer_number());
        for layer in self.layers() {
            for value in layer.fields() {
                report.push_str(&format!("{value} "));
            }
            report.push('\n');
        }
        report
    }

    /// Streams the im2col unrolling of layer `layer_id`. See
    /// [`conv_convert_stream`](crate::conv::conv_convert_stream).
    pub fn conv_convert_stream<T, S, O>(
        &self,
        layer_id: usize,
        padding: usize,
        stride: usize,
        input: &mut S,
        output: &mut O,
    ) -> Result<StreamStats, NetworkError>
    where
        T: Copy + Zero,
        S: StreamSource<T> + ?Sized,
        O: StreamSink<T> + ?Sized,
    {
        let layer = self.layer(layer_id)?;
        Ok(conv_convert_stream(layer, padding, stride, input, output))
    }
}
