use std::fmt;

/// Spatial and channel extent of a feature map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// Dimensions of one convolutional layer, recorded in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDescriptor {
    pub input_height: usize,
    pub input_width: usize,
    pub input_channels: usize,
    /// Number of filters.
    pub filters: usize,
    /// Side of the square kernel.
    pub kernel_size: usize,
    pub kernel_channels: usize,
    pub output_height: usize,
    pub output_width: usize,
    pub output_channels: usize,
    /// Effective padding applied on each spatial side.
    pub padding: usize,
    pub stride: usize,
}

impl LayerDescriptor {
    pub fn input_shape(&self) -> FeatureShape {
        FeatureShape {
            height: self.input_height,
            width: self.input_width,
            channels: self.input_channels,
        }
    }

    pub fn output_shape(&self) -> FeatureShape {
        FeatureShape {
            height: self.output_height,
            width: self.output_width,
            channels: self.output_channels,
        }
    }

    /// Fields in parameter-report order.
    pub fn fields(&self) -> [usize; 9] {
        [
            self.input_height,
            self.input_width,
            self.input_channels,
            self.filters,
            self.kernel_size,
            self.kernel_channels,
            self.output_height,
            self.output_width,
            self.output_channels,
        ]
    }
}

/// Non-fatal issues found while parsing a network description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDiagnostic {
    #[error("line {line}: data before any [net], [convolutional] or [maxpool] section")]
    NoSection { line: usize },

    #[error("line {line}: `{key}` has non-integer value `{value}`")]
    InvalidValue { line: usize, key: String, value: String },

    #[error("layer {layer}: output extent {height}x{width} is not positive")]
    DegenerateLayer { layer: usize, height: i64, width: i64 },

    #[error("line {line}: maxpool output extent {height}x{width} is not positive")]
    DegeneratePool { line: usize, height: i64, width: i64 },

    #[error("line {line}: stride 0 in {section} section")]
    ZeroStride { line: usize, section: &'static str },

    #[error("convolutional section starting at line {line} never set all of filters, size, stride and pad")]
    IncompleteLayer { line: usize },
}

/// Ordered per-layer records produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerStore {
    pub(crate) layers: Vec<LayerDescriptor>,
    pub(crate) diagnostics: Vec<ParseDiagnostic>,
    pub(crate) output: FeatureShape,
}

impl LayerStore {
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn get(&self, id: usize) -> Option<&LayerDescriptor> {
        self.layers.get(id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// Running shape after the last section, pooling included.
    pub fn output_shape(&self) -> FeatureShape {
        self.output
    }
}
